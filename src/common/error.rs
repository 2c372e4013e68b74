//! Error types for the checkout test CLI
//!
//! The runner separates assertion failures (the flow under test misbehaved)
//! from infrastructure failures (the test environment broke), so error
//! variants carry enough context for that split.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the checkout test CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Missing credential '{field}': value is empty or still the placeholder. Set the environment variable or config file entry to a real value")]
    MissingCredential { field: &'static str },

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // === Provider API Errors ===
    #[error("API request {method} {url} failed with HTTP {status}: {body}")]
    ApiRequest {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("No access_token in auth response: {0}")]
    TokenMissing(String),

    #[error("Transaction response has no id: {0}")]
    TransactionIdMissing(String),

    #[error("Transaction response has no checkout URL: {0}")]
    CheckoutUrlMissing(String),

    // === Browser Driver Errors ===
    #[error("Failed to start browser session at {endpoint}: {cause}")]
    SessionStart { endpoint: String, cause: String },

    #[error("WebDriver protocol error: {0}")]
    DriverProtocol(String),

    #[error("WebDriver command '{command}' failed: {message}")]
    DriverCommand { command: String, message: String },

    #[error("No element matched '{what}'")]
    ElementNotFound { what: String },

    // === Timeout Errors ===
    #[error("Timed out after {elapsed_secs}s waiting for {what}")]
    WaitTimeout { what: String, elapsed_secs: u64 },

    #[error("Step '{step}' timed out after {elapsed_secs}s")]
    StepTimeout { step: String, elapsed_secs: u64 },

    // === Assertion Errors ===
    #[error("Assertion failed at '{step}': expected {expected}, got {actual}")]
    Assertion {
        step: String,
        expected: String,
        actual: String,
    },

    // === Transport Errors ===
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an assertion error for a verification that did not hold
    pub fn assertion(
        step: impl std::fmt::Display,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Assertion {
            step: step.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a driver command error
    pub fn driver_command(command: &str, message: &str) -> Self {
        Self::DriverCommand {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// True if this error means a verification did not hold (product defect),
    /// as opposed to the test environment breaking
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::Assertion { .. })
    }

    /// True if this error was raised before any network or browser action
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::MissingCredential { .. }
                | Error::ConfigParse(_)
                | Error::FileRead { .. }
                | Error::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertion_errors_classify_as_failures() {
        let err = Error::assertion(
            "navigate-to-checkout",
            "url containing '/checkout'",
            "about:blank",
        );
        assert!(err.is_assertion());
        assert!(!err.is_config());
    }

    #[test]
    fn timeout_errors_are_infrastructure() {
        let err = Error::WaitTimeout {
            what: "selector '#card-number'".to_string(),
            elapsed_secs: 20,
        };
        assert!(!err.is_assertion());
        assert!(!err.is_config());
    }

    #[test]
    fn missing_credential_names_the_field() {
        let err = Error::MissingCredential {
            field: "client_secret",
        };
        assert!(err.to_string().contains("client_secret"));
        assert!(err.is_config());
    }
}
