// ── Backoffice facade ──
//
// One API client and one auth state, shared by every guard and controller
// this hands out.

use std::sync::Arc;

use backoffice_api::{
    ApiClient, Blog, BlogClient, BusinessEvent, BusinessEventClient, Credentials, Education,
    EducationClient, Envelope, Job, JobClient, Resource, ResourceClient,
};
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::admin::{AdminController, Notice};
use crate::auth::{AuthState, AuthView};
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::guard::{Guarded, RouteGuard};
use crate::route::{AdminSection, Route};
use crate::session::SessionStore;

/// A resource family with its own admin section.
pub trait Managed: Resource {
    const SECTION: AdminSection;
}

impl Managed for Blog {
    const SECTION: AdminSection = AdminSection::Blogs;
}

impl Managed for Education {
    const SECTION: AdminSection = AdminSection::Educations;
}

impl Managed for Job {
    const SECTION: AdminSection = AdminSection::Jobs;
}

impl Managed for BusinessEvent {
    const SECTION: AdminSection = AdminSection::Events;
}

/// Entry point for admin consumers.
pub struct Backoffice {
    api: Arc<ApiClient>,
    auth: AuthState,
}

impl Backoffice {
    /// Build the HTTP client and resolve the session from `store`.
    pub fn new(config: &ClientConfig, store: SessionStore) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.api_url.clone(), &config.transport())?;
        Ok(Self::with_api(Arc::new(api), store))
    }

    /// Use an existing API client.
    pub fn with_api(api: Arc<ApiClient>, store: SessionStore) -> Self {
        let auth = AuthState::load(store);
        if let Some(token) = auth.snapshot().token() {
            debug!("restoring persisted session");
            api.set_token(token.clone());
        }
        Self { api, auth }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn auth(&self) -> AuthView {
        self.auth.view()
    }

    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.auth.view())
    }

    // ── Session ──────────────────────────────────────────────────

    /// Exchange credentials for a session.
    ///
    /// Rejected credentials come back as an error [`Notice`] with the
    /// session unchanged. `Err` means the backend could not be reached or
    /// the token could not be stored.
    pub async fn login(&self, credentials: &Credentials) -> Result<Notice, CoreError> {
        let envelope = self.api.login(credentials).await?;

        match envelope {
            Envelope {
                success: true,
                data: Some(issued),
                success_message,
                ..
            } if !issued.token.expose_secret().is_empty() => {
                self.auth.login(issued.token.clone())?;
                self.api.set_token(issued.token);
                info!(email = %credentials.email, "logged in");

                let greeting = issued
                    .user
                    .as_ref()
                    .and_then(|user| user.name.as_deref().or(user.email.as_deref()))
                    .map_or_else(|| "Logged in".to_owned(), |who| format!("Logged in as {who}"));
                Ok(Notice::success(success_message.unwrap_or(greeting)))
            }
            Envelope { success: true, .. } => {
                Ok(Notice::error("Login response did not include a token"))
            }
            Envelope { error_message, .. } => Ok(Notice::error(
                error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Login failed".into()),
            )),
        }
    }

    /// End the session. Returns where to navigate next.
    pub fn logout(&self) -> Result<Route, CoreError> {
        self.api.clear_token();
        self.auth.logout()?;
        Ok(Route::AFTER_LOGOUT)
    }

    // ── Guarded pages ────────────────────────────────────────────

    /// Resolve `route` through the guard.
    pub fn enter(&self, route: Route) -> Guarded<Route> {
        self.guard().mount(route, || route)
    }

    /// Admin controller for `R`, mounted only for an authenticated session.
    pub fn admin<R: Managed>(&self) -> Guarded<AdminController<ResourceClient<R>>> {
        self.guard().mount(Route::Admin(R::SECTION), || {
            AdminController::new(ResourceClient::new(Arc::clone(&self.api)))
        })
    }

    pub fn blogs(&self) -> Guarded<AdminController<BlogClient>> {
        self.admin::<Blog>()
    }

    pub fn educations(&self) -> Guarded<AdminController<EducationClient>> {
        self.admin::<Education>()
    }

    pub fn jobs(&self) -> Guarded<AdminController<JobClient>> {
        self.admin::<Job>()
    }

    pub fn events(&self) -> Guarded<AdminController<BusinessEventClient>> {
        self.admin::<BusinessEvent>()
    }
}

impl std::fmt::Debug for Backoffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backoffice")
            .field("api_url", &self.api.base_url().as_str())
            .field("auth", &self.auth)
            .finish()
    }
}
