//! Keyword service client.
//!
//! Sends slide text to a message-generation endpoint with a fixed
//! instruction, pulls a `{"keywords": [...]}` object out of the free-form
//! answer, and keeps only keywords that really occur in the slide.

pub mod client;
pub mod error;
pub mod json;
pub mod prompt;
pub mod validate;

pub use client::{AnthropicClient, ClientConfig};
pub use error::KeywordError;
pub use json::first_json_object;
pub use prompt::build_prompt;
pub use validate::validate_keywords;
