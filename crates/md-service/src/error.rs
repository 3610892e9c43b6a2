//! Error types for the Markdown facade.

use std::path::PathBuf;

use md_parser::ParserError;

/// Error loading or parsing Markdown.
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    /// Local Markdown file does not exist.
    #[error("Markdown file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Remote Markdown answered with a status outside `200..400`.
    #[error("Markdown URL does not exist: {url} (HTTP {status})")]
    RemoteContentNotFound {
        /// Absolute URL that was requested.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// URL is relative and no base URL is configured, or it cannot be parsed.
    #[error("Invalid Markdown URL: {0}")]
    InvalidUrl(String),

    /// Parser resolution or parsing failed.
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// I/O error reading a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),
}
