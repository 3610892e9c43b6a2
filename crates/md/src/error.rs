//! CLI error types.

use md_config::ConfigError;
use md_parser::ParserError;
use md_service::MarkdownError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Markdown(#[from] MarkdownError),

    #[error("{0}")]
    Parser(#[from] ParserError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
