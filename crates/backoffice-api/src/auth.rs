// Admin login
//
// `POST /auth/login` with `{ email, password }`. The envelope's `data`
// carries the bearer token (and, on most deployments, the admin profile).
// Logout is purely client-side: the backend keeps no session to revoke.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::resource::ResourceId;

/// Admin login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Profile of the authenticated admin, when the backend returns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A session token issued by the login endpoint.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token: SecretString,
    pub user: Option<AdminUser>,
}

#[derive(Deserialize)]
struct LoginPayload {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
    #[serde(default)]
    user: Option<AdminUser>,
}

impl ApiClient {
    /// Exchange credentials for a session token.
    ///
    /// Wrong credentials are an expected failure: `Ok` with `success: false`.
    /// Does not install the token -- the caller decides when the session
    /// becomes active.
    pub async fn login(&self, credentials: &Credentials) -> Result<Envelope<AuthToken>, Error> {
        debug!(email = %credentials.email, "logging in");

        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });

        let envelope: Envelope<LoginPayload> = self.post(&["auth", "login"], &body).await?;
        Ok(envelope.map(|payload| AuthToken {
            token: SecretString::from(payload.token),
            user: payload.user,
        }))
    }
}
