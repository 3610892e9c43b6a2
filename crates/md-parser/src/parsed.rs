//! Result of parsing Markdown.

use md_cache::Expire;
use serde::{Deserialize, Serialize};

/// Rendered Markdown together with its cache and provenance metadata.
///
/// Values are produced by a parser and never mutated afterwards; the
/// `with_*` builders return modified copies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMarkdown {
    html: String,
    markdown: String,
    parser: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    expire: Expire,
}

impl ParsedMarkdown {
    /// Wrap rendered output produced by parser `parser`.
    #[must_use]
    pub fn new(
        html: impl Into<String>,
        markdown: impl Into<String>,
        parser: impl Into<String>,
    ) -> Self {
        Self {
            html: html.into(),
            markdown: markdown.into(),
            parser: parser.into(),
            id: None,
            language: None,
            expire: Expire::Permanent,
        }
    }

    /// Copy with the cache / source identity set.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Copy with the language code set.
    #[must_use]
    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.map(str::to_owned);
        self
    }

    /// Copy with a different expiration.
    #[must_use]
    pub fn with_expire(mut self, expire: Expire) -> Self {
        self.expire = expire;
        self
    }

    /// Rendered HTML.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Markdown source the HTML was rendered from.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Id of the parser that produced this value.
    pub fn parser(&self) -> &str {
        &self.parser
    }

    /// Cache / source identity, when loaded from a file or URL.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Language code the Markdown was parsed for.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// When cached copies of this value expire.
    pub fn expire(&self) -> Expire {
        self.expire
    }

    /// Whether the value is expired at Unix time `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expire.is_expired_at(now)
    }

    /// Size of the rendered HTML in bytes.
    pub fn size(&self) -> usize {
        self.html.len()
    }
}

impl std::fmt::Display for ParsedMarkdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_keep_content() {
        let parsed = ParsedMarkdown::new("<p>hi</p>\n", "hi", "commonmark")
            .with_id("readme:1")
            .with_language(Some("en"))
            .with_expire(Expire::At(10));

        assert_eq!(parsed.html(), "<p>hi</p>\n");
        assert_eq!(parsed.markdown(), "hi");
        assert_eq!(parsed.parser(), "commonmark");
        assert_eq!(parsed.id(), Some("readme:1"));
        assert_eq!(parsed.language(), Some("en"));
        assert_eq!(parsed.expire(), Expire::At(10));
        assert_eq!(parsed.size(), 10);
        assert!(!parsed.is_expired(10));
        assert!(parsed.is_expired(11));
        assert_eq!(parsed.to_string(), "<p>hi</p>\n");
    }

    #[test]
    fn test_defaults_to_permanent() {
        let parsed = ParsedMarkdown::new("", "", "gfm");
        assert_eq!(parsed.expire(), Expire::Permanent);
        assert_eq!(parsed.id(), None);
        assert!(!parsed.is_expired(u64::MAX));
    }
}
