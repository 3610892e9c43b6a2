//! Parser and extension error types.

/// Error resolving, configuring or running a Markdown parser plugin.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// No parser is registered under the requested id.
    #[error("Unknown Markdown parser: {0}")]
    UnknownParser(String),

    /// No registered parser is installed in this build.
    #[error("No Markdown parser is available")]
    NoParserAvailable,

    /// No extension is registered under the requested id.
    #[error("Unknown Markdown extension: {0}")]
    UnknownExtension(String),

    /// Plugin configuration is malformed.
    #[error("Invalid configuration for {plugin}: {message}")]
    InvalidConfiguration {
        /// Parser or extension id.
        plugin: String,
        /// What is wrong with the configuration.
        message: String,
    },
}
