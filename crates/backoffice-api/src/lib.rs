// backoffice-api: Async client for the site backend's envelope-wrapped REST API

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod resource;
pub mod resources;
pub mod transport;

pub use auth::{AdminUser, AuthToken, Credentials};
pub use client::ApiClient;
pub use envelope::{Envelope, ListFilter, Page};
pub use error::Error;
pub use resource::{Resource, ResourceClient, ResourceId};
pub use resources::{
    Blog, BlogClient, BlogDraft, BusinessEvent, BusinessEventClient, BusinessEventDraft,
    Education, EducationClient, EducationDraft, Job, JobClient, JobDraft,
};
pub use transport::{TlsMode, TransportConfig};
