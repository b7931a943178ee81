use std::fmt;

use crate::error::CoreError;

/// Transient feedback from an admin operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    /// `cause` is set when the failure was a transport or decoding error
    /// rather than a backend-reported one.
    Error {
        message: String,
        cause: Option<CoreError>,
    },
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            cause: None,
        }
    }

    pub(crate) fn failed(message: impl Into<String>, cause: CoreError) -> Self {
        Self::Error {
            message: message.into(),
            cause: Some(cause),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error { message, .. } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// `"business event"` -> `"Business event"`.
pub(crate) fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_labels() {
        assert_eq!(capitalize("business event"), "Business event");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn message_accessor() {
        assert_eq!(Notice::success("Saved").message(), "Saved");
        let err = Notice::error("Nope");
        assert!(err.is_error());
        assert_eq!(err.to_string(), "Nope");
    }
}
