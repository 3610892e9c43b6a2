//! Pluggable Markdown parsers and extensions.
//!
//! Parsers and extensions are plugins described by definitions held in two
//! registries:
//!
//! - [`ParserRegistry`]: parser definitions; creates parser instances bound
//!   to a configuration
//! - [`ExtensionRegistry`]: extension definitions, each optionally owned by
//!   a parser
//!
//! The built-in parsers are [`ExtensibleParser`]s on top of pulldown-cmark.
//! Their syntax is assembled from enabled extensions, and their
//! [`Guidelines`] are contributed to and altered by those extensions.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use md_parser::{ExtensionRegistry, ParserRegistry, Settings};
//!
//! let extensions = Arc::new(ExtensionRegistry::with_builtin());
//! let parsers = ParserRegistry::with_builtin(extensions);
//!
//! let parser = parsers.create_instance("commonmark", Settings::new()).unwrap();
//! let parsed = parser.parse("# Hello", None).unwrap();
//! assert_eq!(parsed.html(), "<h1>Hello</h1>\n");
//! ```

mod builtin;
mod error;
mod extensible;
mod extension;
mod guidelines;
mod parsed;
mod parser;
mod settings;

pub use builtin::commonmark_sections;
pub use error::ParserError;
pub use extensible::ExtensibleParser;
pub use extension::{
    AltersGuidelines, ExtensionDefinition, ExtensionFactory, ExtensionInstance,
    ExtensionRegistry, MarkdownExtension, ProvidesGuidelines,
};
pub use guidelines::{GuideSection, Guidelines};
pub use parsed::ParsedMarkdown;
pub use parser::{MarkdownParser, ParserContext, ParserDefinition, ParserFactory, ParserRegistry};
pub use settings::{Settings, merge_deep, merged};

pub use md_cache::Expire;
pub use pulldown_cmark::Options;
