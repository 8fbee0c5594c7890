//! Structured error types for the balancer.
//!
//! Measurement failures are per-element: the session logs them and moves on
//! to the next element in the batch. The remaining variants come from the
//! reference host and the CLI.

use crate::host::ElementId;

/// The unified error type returned by the public balancing API.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// The width oracle could not report a size (detached node, no layout).
    #[error("Measurement unavailable: {reason}")]
    MeasurementUnavailable { reason: String },

    /// A target id no longer resolves to an element in the host.
    #[error("Unknown element: {0:?}")]
    UnknownElement(ElementId),

    /// A font could not be decoded or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// Page input JSON failed to parse.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    Input {
        source: serde_json::Error,
        hint: String,
    },

    /// The result document could not be serialized.
    #[error("Failed to write output: {0}")]
    Output(serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BalanceError {
    pub fn measurement(reason: impl Into<String>) -> Self {
        BalanceError::MeasurementUnavailable {
            reason: reason.into(),
        }
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for BalanceError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the page schema. Check field names and types."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        BalanceError::Input { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_carries_hint() {
        let err: BalanceError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse input"), "got: {msg}");
        assert!(msg.contains("trailing commas"), "got: {msg}");
    }

    #[test]
    fn test_output_error_has_no_input_hint() {
        let mut bad = std::collections::BTreeMap::new();
        bad.insert(vec![1u8], 1u8);
        let err = BalanceError::Output(serde_json::to_string(&bad).unwrap_err());
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to write output"), "got: {msg}");
        assert!(!msg.contains("Hint"), "got: {msg}");
    }

    #[test]
    fn test_measurement_message() {
        let err = BalanceError::measurement("node is detached");
        assert_eq!(err.to_string(), "Measurement unavailable: node is detached");
    }
}
