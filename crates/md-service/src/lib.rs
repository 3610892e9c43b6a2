//! Markdown facade.
//!
//! [`Markdown`] loads Markdown from strings, local files and URLs, hands it
//! to a parser plugin from [`md_parser`], and caches the resulting
//! [`ParsedMarkdown`](md_parser::ParsedMarkdown) in an [`md_cache`] bucket.
//!
//! I/O sits behind two traits so the facade can be tested without touching
//! disk or network:
//!
//! - [`FileSystem`] with [`LocalFileSystem`] for local files
//! - [`HttpClient`] with [`UreqClient`] for remote files, and
//!   [`MockHttpClient`] for tests (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use md_config::{CliSettings, Config};
//! use md_service::Markdown;
//!
//! let config = Config::load(None, Some(&CliSettings::default()))?;
//! let markdown = Markdown::from_config(&config);
//! let parsed = markdown.load_path("README.md", None, None)?;
//! println!("{}", parsed.html());
//! ```

mod error;
mod fs;
mod http;
mod markdown;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use error::MarkdownError;
pub use fs::{FileSystem, LocalFileSystem};
pub use http::{DEFAULT_TIMEOUT, HttpClient, HttpResponse, UreqClient};
pub use markdown::{Markdown, MarkdownSettings};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockHttpClient;
