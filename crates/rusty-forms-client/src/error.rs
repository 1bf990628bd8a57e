// File: rusty-forms-client/src/error.rs
// Purpose: Error types for form collection, validator setup and transport

use crate::dom::ElementId;
use thiserror::Error;

/// Errors raised by the form controller
#[derive(Debug, Error)]
pub enum FormError {
    /// A collected field has no `name` attribute. The markup must be fixed.
    #[error("Some fields don't have attribute [name] (element {element:?})")]
    MissingName { element: ElementId },

    /// A validator override failed to compile
    #[error("invalid validator pattern for '{key}': {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure reported by the HTTP collaborator
///
/// Network failures that never produced a status use status `0`
/// and status text `"error"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error: {status} {status_text}")]
pub struct TransportError {
    pub status: u16,
    pub status_text: String,
}

impl TransportError {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
        }
    }

    /// A failure with no HTTP status (connection refused, aborted, ...)
    pub fn network() -> Self {
        Self::new(0, "error")
    }

    /// Text shown to the user in the blocking alert
    pub fn alert_text(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_text_contains_status() {
        let err = TransportError::new(500, "Server Error");
        assert_eq!(err.alert_text(), "Error: 500 Server Error");
    }

    #[test]
    fn test_network_error() {
        let err = TransportError::network();
        assert_eq!(err.status, 0);
        assert_eq!(err.alert_text(), "Error: 0 error");
    }

    #[test]
    fn test_missing_name_message() {
        let err = FormError::MissingName {
            element: ElementId(4),
        };
        assert!(err.to_string().starts_with("Some fields don't have attribute [name]"));
    }
}
