//! `md render` command implementation.

use std::path::Path;

use clap::Args;
use md_parser::ParsedMarkdown;
use md_service::{Markdown, MarkdownError};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file path or http(s) URL.
    source: String,

    /// Treat SOURCE as a URL, resolving relative ones against the base URL.
    #[arg(short, long)]
    url: bool,

    /// Parser id (overrides config).
    #[arg(short, long)]
    pub(crate) parser: Option<String>,

    /// Cache identity (default: derived from the source).
    #[arg(long)]
    id: Option<String>,

    /// Language code stored with the parsed result.
    #[arg(short, long)]
    language: Option<String>,
}

/// Where the Markdown comes from.
#[derive(Debug, PartialEq, Eq)]
enum Source<'a> {
    Path(&'a Path),
    Url(&'a str),
}

impl<'a> Source<'a> {
    fn detect(source: &'a str, url: bool) -> Self {
        if url || source.starts_with("http://") || source.starts_with("https://") {
            Self::Url(source)
        } else {
            Self::Path(Path::new(source))
        }
    }
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or parsed.
    pub(crate) fn execute(self, markdown: &Markdown) -> Result<(), CliError> {
        let parsed = self.load(markdown)?;
        tracing::info!(
            source = %self.source,
            parser = parsed.parser(),
            size = parsed.size(),
            "rendered markdown"
        );
        Output::new().document(parsed.html())?;
        Ok(())
    }

    fn load(&self, markdown: &Markdown) -> Result<ParsedMarkdown, MarkdownError> {
        let id = self.id.as_deref();
        let language = self.language.as_deref();

        match Source::detect(&self.source, self.url) {
            Source::Url(url) => markdown.load_url(url, id, language),
            Source::Path(path) => markdown.load_path(path, id, language),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use md_cache::MemoryCache;
    use md_parser::{ExtensionRegistry, ParserRegistry};
    use md_service::{MarkdownSettings, MockHttpClient};
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(source: &str, url: bool) -> RenderArgs {
        RenderArgs {
            source: source.to_owned(),
            url,
            parser: None,
            id: None,
            language: None,
        }
    }

    #[test]
    fn test_detect_url() {
        assert_eq!(
            Source::detect("https://example.com/README.md", false),
            Source::Url("https://example.com/README.md")
        );
        assert_eq!(
            Source::detect("http://localhost:8080/a.md", false),
            Source::Url("http://localhost:8080/a.md")
        );
        assert_eq!(
            Source::detect("guide/intro.md", true),
            Source::Url("guide/intro.md")
        );
    }

    #[test]
    fn test_detect_path() {
        assert_eq!(
            Source::detect("docs/README.md", false),
            Source::Path(Path::new("docs/README.md"))
        );
        assert_eq!(
            Source::detect("httpdocs.md", false),
            Source::Path(Path::new("httpdocs.md"))
        );
    }

    #[test]
    fn test_relative_url_source_uses_base_url() {
        let http = Arc::new(MockHttpClient::new().with_response(
            "https://docs.example.com/guide/intro.md",
            200,
            "# Intro",
        ));
        let parsers = ParserRegistry::with_builtin(Arc::new(ExtensionRegistry::with_builtin()));
        let markdown = Markdown::new(&MemoryCache::new(), Arc::new(parsers))
            .with_http_client(Arc::clone(&http))
            .with_settings(MarkdownSettings {
                base_url: Some("https://docs.example.com".to_owned()),
                ..MarkdownSettings::default()
            });

        let parsed = args("guide/intro.md", true).load(&markdown).unwrap();

        assert_eq!(parsed.html(), "<h1>Intro</h1>\n");
        assert_eq!(http.requests(), vec!["https://docs.example.com/guide/intro.md"]);
    }
}
