//! Error types for the equirank workspace
//!
//! Only genuinely exceptional conditions live here. Validation violations
//! and correction-gate rejections are domain values carried on the result
//! types, never errors: a batch must continue past any single instrument.

use thiserror::Error;

/// Result type alias for equirank operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ranking operations
#[derive(Error, Debug)]
pub enum Error {
    /// Requested data could not be fetched (partial or empty response).
    /// Downstream scoring treats the affected sub-score as absent.
    #[error("Data not available for {instrument}: {reason}")]
    DataUnavailable { instrument: String, reason: String },

    /// An external provider did not answer within the configured deadline.
    /// Treated exactly like provider-unavailable by the caller.
    #[error("Provider timed out: {provider}")]
    ProviderTimeout { provider: String },

    /// Structurally invalid input (unordered bars, empty statements, ...)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Instruction template failed to render
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DataUnavailable {
            instrument: "ACME".to_string(),
            reason: "empty price history".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for ACME: empty price history"
        );

        let err = Error::ProviderTimeout {
            provider: "catalyst".to_string(),
        };
        assert_eq!(err.to_string(), "Provider timed out: catalyst");
    }
}
