//! Error types for the WebAdvisor session engine.

use std::fmt;

pub type Result<T, E = WebAdvisorError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum WebAdvisorError {
    /// Network, TLS or timeout failure from the underlying HTTP exchange.
    #[error("portal request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The bootstrap handshake never produced a usable token.
    #[error("portal connectivity problem: {0}")]
    Connectivity(String),
    /// An expected link, element or query parameter is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// The page markup no longer has the shape the engine expects.
    #[error("unexpected page structure: {0}")]
    StructureMismatch(String),
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl WebAdvisorError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn mismatch(what: impl Into<String>) -> Self {
        Self::StructureMismatch(what.into())
    }

    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }
}
