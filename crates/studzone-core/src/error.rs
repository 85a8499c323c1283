//! Error types for the studzone scraper
//!
//! Fatal errors (configuration, token, authentication, transport) propagate to
//! the caller. `StructureNotFound` and `RowParse` are produced by the parsers
//! and recovered locally: the parser logs them and degrades to an empty
//! collection or a skipped row.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for studzone scraping operations
#[derive(Error, Debug)]
pub enum PortalError {
    /// Credentials missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The login page carried no anti-forgery token
    #[error("Anti-forgery token not found on login page")]
    TokenNotFound,

    /// The portal rejected the credentials, or the outcome was ambiguous
    #[error("Authentication failed (landed on {url})")]
    AuthenticationFailed { url: String },

    /// Expected table/card container absent from the page
    #[error("Structure not found: {0}")]
    StructureNotFound(String),

    /// A single row could not be turned into a record
    #[error("Row parse error: {0}")]
    RowParse(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Serialize PortalError as its display string
impl Serialize for PortalError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for studzone operations
pub type Result<T> = std::result::Result<T, PortalError>;
