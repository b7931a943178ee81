// Generic resource plumbing
//
// Every backend resource family (blogs, educations, jobs, business events)
// speaks the same four verbs against `/{collection}` and `/{collection}/{id}`.
// `ResourceClient<R>` implements those once; the families only describe
// their payloads through the `Resource` trait.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::client::ApiClient;
use crate::envelope::{Envelope, ListFilter, Page};
use crate::error::Error;

// ── ResourceId ───────────────────────────────────────────────────────

/// Opaque backend identifier.
///
/// Never assumed numeric or sequential. Numeric ids on the wire are
/// accepted and kept in their decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Unsigned(n) => Self(n.to_string()),
            Raw::Signed(n) => Self(n.to_string()),
        })
    }
}

// ── Resource ─────────────────────────────────────────────────────────

/// A backend resource family.
pub trait Resource:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    /// The create payload.
    type Draft: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;

    /// Path segment of the collection endpoint, e.g. `"blogs"`.
    const COLLECTION: &'static str;
    /// Singular human label, e.g. `"blog"`.
    const LABEL: &'static str;
    /// Plural human label, e.g. `"blogs"`.
    const PLURAL: &'static str;

    fn id(&self) -> &ResourceId;
}

// ── ResourceClient ───────────────────────────────────────────────────

/// Request wrapper for one resource family.
///
/// Expected failures (not found, validation) come back as
/// `Ok(Envelope { success: false, .. })`; only transport and malformed
/// responses are `Err`.
pub struct ResourceClient<R> {
    api: Arc<ApiClient>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    /// The shared API client.
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// `GET /{collection}?{filter}`
    pub async fn list(&self, filter: &ListFilter) -> Result<Envelope<Page<R>>, Error> {
        debug!(resource = R::PLURAL, ?filter, "listing");
        self.api
            .get(&[R::COLLECTION], &filter.to_query())
            .await
    }

    /// `GET /{collection}/{id}`
    pub async fn get_by_id(&self, id: &ResourceId) -> Result<Envelope<R>, Error> {
        debug!(resource = R::LABEL, %id, "fetching");
        self.api.get(&[R::COLLECTION, id.as_str()], &[]).await
    }

    /// `POST /{collection}` with the draft as JSON body.
    pub async fn create(&self, draft: &R::Draft) -> Result<Envelope<R>, Error> {
        debug!(resource = R::LABEL, "creating");
        self.api.post(&[R::COLLECTION], draft).await
    }

    /// `DELETE /{collection}/{id}`
    ///
    /// Whatever the backend echoes back in `data` is discarded.
    pub async fn delete(&self, id: &ResourceId) -> Result<Envelope<()>, Error> {
        debug!(resource = R::LABEL, %id, "deleting");
        let envelope: Envelope<serde_json::Value> =
            self.api.delete(&[R::COLLECTION, id.as_str()]).await?;
        Ok(envelope.map(|_| ()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_id_accepts_strings_and_numbers() {
        let text: ResourceId = serde_json::from_value(json!("65f1c0ab")).unwrap();
        let num: ResourceId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(text.as_str(), "65f1c0ab");
        assert_eq!(num.as_str(), "42");
    }

    #[test]
    fn resource_id_serializes_as_plain_string() {
        let id = ResourceId::from("abc");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("abc"));
        assert_eq!(id.to_string(), "abc");
    }
}
