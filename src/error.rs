//! Error types for the slidegen library.

use std::io;
use thiserror::Error;

/// Result type alias for slidegen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or writing a deck.
///
/// Only [`Error::Configuration`] is fatal to a deck build. Generation and
/// download failures are absorbed per slide by the document builder and
/// surface to callers only from the generation client itself.
#[derive(Error, Debug)]
pub enum Error {
    /// The generative-text or generative-image service failed after retries.
    #[error("Generation failed{}: {reason}", slide_suffix(.slide_index))]
    GenerationFailed {
        /// Slide the prompt belonged to, if any (topic generation has none)
        slide_index: Option<usize>,
        /// The prompt that was sent
        prompt: String,
        /// Transport or service error description
        reason: String,
    },

    /// An image URL returned by the image service could not be fetched.
    #[error("Download failed ({status}): {url}")]
    DownloadFailed {
        /// The URL that was requested
        url: String,
        /// HTTP status code (0 when no response was received)
        status: u16,
    },

    /// Invalid deck plan, options, or service configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP transport or response decoding error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing the ZIP package.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error producing XML content.
    #[error("XML error: {0}")]
    Xml(String),

    /// Error encoding or decoding JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn slide_suffix(slide_index: &Option<usize>) -> String {
    match slide_index {
        Some(index) => format!(" for slide {}", index + 1),
        None => String::new(),
    }
}

impl Error {
    /// Build a configuration error from any displayable message.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Whether this error aborts a deck build.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
