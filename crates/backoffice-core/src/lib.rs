//! Session and admin-orchestration layer between `backoffice-api` and the CLI.
//!
//! This crate owns the client-side authentication flow and the admin CRUD
//! state machine:
//!
//! - **[`SessionStore`]**: the persisted token, mirrored into two
//!   [`TokenStorage`] scopes (long-lived and process-lived). `read()` checks
//!   the primary scope first, then the secondary.
//!
//! - **[`AuthState`]**: constructed once, resolved synchronously from the
//!   session store, and handed to consumers explicitly. Readers hold an
//!   [`AuthView`]; only the owner can `login` / `logout`.
//!
//! - **[`RouteGuard`]**: gates admin [`Route`]s: loading placeholder while
//!   auth resolves, redirect to `/login` when unauthenticated, mounts the
//!   protected content otherwise.
//!
//! - **[`AdminController`]**: reducer-driven list / fetch-one / create /
//!   delete over any [`ResourceService`]. Every visible change is confirmed by
//!   a round-trip; results are surfaced as [`Notice`]s.
//!
//! - **[`Backoffice`]**: facade wiring one API client and one auth state
//!   into guards and per-family controllers.
//!
//! Config files are never read here; the CLI builds a [`ClientConfig`] and a
//! [`SessionStore`] and hands them in.

pub mod admin;
pub mod auth;
pub mod backoffice;
pub mod config;
pub mod error;
pub mod guard;
pub mod route;
pub mod service;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use admin::{AdminController, AdminListState, Notice, Transition, reduce};
pub use auth::{AuthSnapshot, AuthState, AuthView};
pub use backoffice::{Backoffice, Managed};
pub use config::{ClientConfig, TlsVerification};
pub use error::CoreError;
pub use guard::{GuardDecision, Guarded, RouteGuard};
pub use route::{AdminSection, Route};
pub use service::ResourceService;
pub use session::{FileStorage, MemoryStorage, SessionStore, TOKEN_KEY, TokenStorage};

// Re-export the API types consumers touch directly.
pub use backoffice_api::{
    AdminUser, Blog, BlogDraft, BusinessEvent, BusinessEventDraft, Credentials, Education,
    EducationDraft, Envelope, Job, JobDraft, ListFilter, Page, Resource, ResourceClient,
    ResourceId,
};
