//! Unified error type for the line-rating workspace
//!
//! Only data-unavailability conditions are hard errors. Per-line numeric problems
//! (zero ratings, NaN inputs) are clamped where they occur and never reach this
//! type, and per-record import problems are collected as diagnostics instead.
//!
//! # Example
//!
//! ```ignore
//! use dlr_core::{DlrError, DlrResult};
//!
//! fn run(provider: &dyn TopologyProvider) -> DlrResult<()> {
//!     let network = provider.load()?;
//!     engine.contingencies(&network, &env);
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all dlr operations.
#[derive(Error, Debug)]
pub enum DlrError {
    /// I/O errors (file access, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Topology could not be loaded; analysis results would be meaningless
    #[error("Topology unavailable: {0}")]
    TopologyUnavailable(String),

    /// Weather could not be fetched or parsed
    #[error("Weather unavailable: {0}")]
    WeatherUnavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network structure errors (unknown ids, dangling references)
    #[error("Network error: {0}")]
    Network(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

impl DlrError {
    /// True when the error means "the engine could not run", as opposed to a
    /// malformed request.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DlrError::TopologyUnavailable(_) | DlrError::WeatherUnavailable(_) | DlrError::Io(_)
        )
    }
}

/// Convenience type alias for Results using DlrError.
pub type DlrResult<T> = Result<T, DlrError>;

impl From<anyhow::Error> for DlrError {
    fn from(err: anyhow::Error) -> Self {
        DlrError::Other(err.to_string())
    }
}

impl From<String> for DlrError {
    fn from(s: String) -> Self {
        DlrError::Other(s)
    }
}

impl From<&str> for DlrError {
    fn from(s: &str) -> Self {
        DlrError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for DlrError {
    fn from(err: serde_json::Error) -> Self {
        DlrError::Parse(err.to_string())
    }
}
