//! Structured error types for the Quire engine.
//!
//! Two variants cover the real failure sources: input parsing and a
//! measurement pass losing its backing container. Everything else in the
//! pipeline degrades per-node instead of failing: an unknown node type or a
//! missing binding path renders nothing, and an oversized unit is handled by
//! the packer's escape valve.

use thiserror::Error;

/// The unified error type returned by public Quire API functions.
#[derive(Debug, Error)]
pub enum QuireError {
    /// Template or data JSON failed to parse. `hint` is pre-rendered (empty,
    /// or a `\n  Hint: ...` suffix) so Display can append it verbatim.
    #[error("failed to parse {what}: {source}{hint}")]
    Parse {
        what: &'static str,
        source: serde_json::Error,
        hint: String,
    },

    /// The layout provider lost its backing container mid-pass. The pass is
    /// abandoned silently; nothing is published.
    #[error("measurement container was torn down mid-pass")]
    MeasurementRace,
}

impl QuireError {
    /// Wrap a serde_json error with a hint about the likely cause.
    pub fn parse(what: &'static str, source: serde_json::Error) -> Self {
        let hint = match source.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected shape. Check field names and types."
            }
            serde_json::error::Category::Eof => "Unexpected end of input, is the JSON truncated?",
            serde_json::error::Category::Io => "",
        };
        let hint = if hint.is_empty() {
            String::new()
        } else {
            format!("\n  Hint: {hint}")
        };
        QuireError::Parse { what, source, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_hint() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let wrapped = QuireError::parse("template", err);
        let msg = wrapped.to_string();
        assert!(msg.contains("failed to parse template"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn measurement_race_message() {
        assert_eq!(
            QuireError::MeasurementRace.to_string(),
            "measurement container was torn down mid-pass"
        );
    }
}
