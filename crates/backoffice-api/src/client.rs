// Backend HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining, bearer-token
// injection, and envelope decoding. Resource endpoints are layered on top
// in `resource.rs`; login lives in `auth.rs`.

use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::envelope::Envelope;
use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the backend API.
///
/// All methods return the decoded [`Envelope`]. Whatever the HTTP status, a
/// body that decodes as an envelope comes back as `Ok` (a non-2xx status
/// forces `success` to `false`). Bodies that aren't envelopes, and
/// successful payloads that don't fit the expected type, are
/// [`Error::Deserialization`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token sent on every request once a session exists.
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a new client from a base URL and a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `https://api.example.com/api/v1`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token management ─────────────────────────────────────────────

    /// Install the bearer token used for subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        debug!("installing session token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drop the bearer token; subsequent requests are anonymous.
    pub fn clear_token(&self) {
        debug!("clearing session token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append escaped path segments to the base URL.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let Ok(mut path) = url.path_segments_mut() else {
                return Err(Error::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                });
            };
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(String, String)],
    ) -> Result<Envelope<T>, Error> {
        let url = self.url(segments)?;
        debug!("GET {url} params={params:?}");

        let mut builder = self.http.get(url);
        if !params.is_empty() {
            builder = builder.query(params);
        }
        let resp = self.apply_auth(builder).send().await?;
        Self::decode(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Envelope<T>, Error> {
        let url = self.url(segments)?;
        debug!("POST {url}");

        let resp = self
            .apply_auth(self.http.post(url).json(body))
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Envelope<T>, Error> {
        let url = self.url(segments)?;
        debug!("DELETE {url}");

        let resp = self.apply_auth(self.http.delete(url)).send().await?;
        Self::decode(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Decode the envelope regardless of HTTP status.
    ///
    /// An empty 2xx body (e.g. `204 No Content`) is a successful envelope
    /// without data. A failed envelope drops its `data`, whatever its shape;
    /// only successful payloads are decoded into `T`.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Envelope<T>, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, bytes = body.len(), "response received");

        if body.trim().is_empty() && status.is_success() {
            return Ok(Envelope {
                success: true,
                data: None,
                success_message: None,
                error_message: None,
            });
        }

        let raw: Envelope<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| malformed(&e, status, &body))?;

        if !raw.success {
            return Ok(Envelope {
                success: false,
                data: None,
                success_message: raw.success_message,
                error_message: raw.error_message,
            });
        }

        if !status.is_success() {
            debug!(%status, "envelope claims success on an error status");
            return Ok(Envelope {
                success: false,
                data: None,
                success_message: None,
                error_message: raw.error_message.or_else(|| Some(format!("HTTP {status}"))),
            });
        }

        let data = raw
            .data
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| malformed(&e, status, &body))?;
        Ok(Envelope {
            success: true,
            data,
            success_message: raw.success_message,
            error_message: raw.error_message,
        })
    }
}

fn malformed(err: &serde_json::Error, status: reqwest::StatusCode, body: &str) -> Error {
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        status: status.as_u16(),
        body: body.to_owned(),
    }
}
