// ── Route guard ──
//
// Decides whether a route's content may mount. The decision is driven only
// by the auth view; the guard never consults session storage itself.

use tracing::debug;

use crate::auth::AuthView;
use crate::route::Route;

/// What the guard decided for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth is still resolving; show a placeholder.
    Loading,
    /// Navigate elsewhere, replacing the current history entry.
    Redirect(Route),
    Allow,
}

/// Outcome of mounting guarded content.
#[derive(Debug)]
pub enum Guarded<T> {
    Loading,
    Redirect(Route),
    Mounted(T),
}

impl<T> Guarded<T> {
    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted(_))
    }

    pub fn mounted(self) -> Option<T> {
        match self {
            Self::Mounted(content) => Some(content),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Guarded<U> {
        match self {
            Self::Loading => Guarded::Loading,
            Self::Redirect(route) => Guarded::Redirect(route),
            Self::Mounted(content) => Guarded::Mounted(f(content)),
        }
    }
}

/// Gate for protected routes.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    auth: AuthView,
}

impl RouteGuard {
    pub fn new(auth: AuthView) -> Self {
        Self { auth }
    }

    /// Public routes are always allowed. Protected routes wait for auth
    /// to resolve, then require a token.
    pub fn decide(&self, route: Route) -> GuardDecision {
        if !route.is_protected() {
            return GuardDecision::Allow;
        }
        let snapshot = self.auth.snapshot();
        if snapshot.is_loading() {
            GuardDecision::Loading
        } else if snapshot.is_authenticated() {
            GuardDecision::Allow
        } else {
            debug!(route = %route, "unauthenticated, redirecting to login");
            GuardDecision::Redirect(Route::Login)
        }
    }

    /// Mount `content` for `route` if allowed. `content` is not invoked
    /// otherwise.
    pub fn mount<T>(&self, route: Route, content: impl FnOnce() -> T) -> Guarded<T> {
        match self.decide(route) {
            GuardDecision::Loading => Guarded::Loading,
            GuardDecision::Redirect(to) => Guarded::Redirect(to),
            GuardDecision::Allow => Guarded::Mounted(content()),
        }
    }

    /// Like [`mount`](Self::mount), but waits out the loading phase first.
    pub async fn wait<T>(&self, route: Route, content: impl FnOnce() -> T) -> Guarded<T> {
        if route.is_protected() {
            self.auth.resolved().await;
        }
        self.mount(route, content)
    }
}
