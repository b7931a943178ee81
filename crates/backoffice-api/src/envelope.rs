// Response envelope, list pages, and list filters
//
// Every backend endpoint wraps its payload the same way:
//   { "success": true, "data": ..., "successMessage": "...", "errorMessage": "..." }
// List endpoints put either a bare array or a paged object in `data`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// Uniform success/data/message wrapper returned by every backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            success_message: None,
            error_message: None,
        }
    }

    /// A failed envelope carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            success_message: None,
            error_message: Some(message.into()),
        }
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Transform the payload, keeping flags and messages.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            success_message: self.success_message,
            error_message: self.error_message,
        }
    }
}

// ── Page ─────────────────────────────────────────────────────────────

/// One page of a list response.
///
/// Decodes from either a bare JSON array or an object carrying the items
/// under `items`, `data`, or `results` plus optional paging counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total: None,
            page: None,
            limit: None,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Bare(Vec<T>),
    Paged {
        #[serde(alias = "data", alias = "results")]
        items: Vec<T>,
        #[serde(default, alias = "totalCount", alias = "count")]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        limit: Option<u32>,
    },
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Bare(items) => Self::new(items),
            PageRepr::Paged {
                items,
                total,
                page,
                limit,
            } => Self {
                items,
                total,
                page,
                limit,
            },
        })
    }
}

// ── ListFilter ───────────────────────────────────────────────────────

/// Query parameters for a `list` call. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    /// Endpoint-specific parameters, sent verbatim.
    pub extra: BTreeMap<String, String>,
}

impl ListFilter {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Flatten into `(key, value)` query pairs.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_owned(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        if let Some(ref search) = self.search {
            params.push(("search".to_owned(), search.clone()));
        }
        if let Some(ref category) = self.category {
            params.push(("category".to_owned(), category.clone()));
        }
        params.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_missing_optionals_decode_as_none() {
        let env: Envelope<String> = serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
        assert!(env.error_message.is_none());
    }

    #[test]
    fn envelope_failure_carries_message() {
        let env: Envelope<String> = serde_json::from_value(json!({
            "success": false,
            "errorMessage": "Validation failed"
        }))
        .unwrap();
        assert!(!env.success);
        assert_eq!(env.error_message.as_deref(), Some("Validation failed"));
    }

    #[test]
    fn page_from_bare_array() {
        let page: Page<u32> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total, None);
    }

    #[test]
    fn page_from_paged_object_with_aliases() {
        let page: Page<u32> =
            serde_json::from_value(json!({ "data": [4, 5], "totalCount": 12, "page": 2 }))
                .unwrap();
        assert_eq!(page.items, vec![4, 5]);
        assert_eq!(page.total, Some(12));
        assert_eq!(page.page, Some(2));
        assert_eq!(page.limit, None);
    }

    #[test]
    fn filter_query_omits_absent_fields() {
        let filter = ListFilter::default()
            .limit(10)
            .category("visa")
            .param("sort", "-createdAt");
        assert_eq!(
            filter.to_query(),
            vec![
                ("limit".to_owned(), "10".to_owned()),
                ("category".to_owned(), "visa".to_owned()),
                ("sort".to_owned(), "-createdAt".to_owned()),
            ]
        );
        assert!(ListFilter::default().to_query().is_empty());
    }
}
