//! Error types for keyword requests.

use thiserror::Error;

/// Why a keyword request produced no keywords.
#[derive(Error, Debug)]
pub enum KeywordError {
    /// The service answered with a non-success status.
    #[error("API returned status {status}")]
    Status { status: u16, body: String },

    /// The request never got a response (connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body could not be read.
    #[error("Failed to read response: {0}")]
    Io(#[from] std::io::Error),

    /// The response had no text content block.
    #[error("Response contained no text content")]
    MissingText,

    /// The text contained no JSON object.
    #[error("No JSON object found in response text")]
    NoJsonObject,

    /// JSON was found but could not be decoded.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
