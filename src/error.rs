//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Every failure ends the request; the HTTP mapping lives in [`crate::server`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No image provided")]
    MissingInput,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// Gemini answered with a non-success status. `body` is relayed to the caller.
    #[error("Gemini API error: {body}")]
    UpstreamService { status: u16, body: String },

    #[error("No response from Gemini")]
    EmptyModelResponse,

    #[error("Failed to parse product info")]
    MalformedModelOutput { raw: String },

    #[error("Could not find an Amazon URL in the model response")]
    NotAnAmazonUrl { raw: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Raw model text attached to parse failures, for diagnostics.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Error::MalformedModelOutput { raw } | Error::NotAnAmazonUrl { raw } => {
                Some(raw.as_str())
            }
            _ => None,
        }
    }

    /// True for failures caused by the caller's request rather than by us or upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingInput
                | Error::InvalidUpload(_)
                | Error::PayloadTooLarge(_)
                | Error::NotAnAmazonUrl { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
