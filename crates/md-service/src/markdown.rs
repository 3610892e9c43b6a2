//! The Markdown facade.
//!
//! [`Markdown`] resolves a parser, loads Markdown from strings, files or URLs,
//! and caches the parsed result under a cache identity:
//!
//! - files: `{basename}{sha256(realpath)}:{mtime}` (or `{id}:{mtime}`), so a
//!   modified file gets a new identity and is re-parsed
//! - URLs: the absolute URL itself (or the caller's id), with no freshness
//!   component; expiration comes from `remote.expire`

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use md_cache::{Cache, CacheBucket, CacheBucketExt, Expire, FileCache, NullCache};
use md_config::Config;
use md_parser::{
    ExtensionRegistry, Guidelines, MarkdownParser, ParsedMarkdown, ParserRegistry, Settings,
    merged,
};
use sha2::{Digest, Sha256};
use ureq::http::Uri;

use crate::error::MarkdownError;
use crate::fs::{FileSystem, LocalFileSystem};
use crate::http::{HttpClient, UreqClient};

/// Cache bucket holding parsed Markdown.
const CACHE_BUCKET: &str = "markdown";

/// Global settings of the facade.
#[derive(Debug, Default, Clone)]
pub struct MarkdownSettings {
    /// Default parser id; the first installed parser is used when unset.
    pub parser_id: Option<String>,
    /// Global parser settings, merged under caller configuration.
    pub parser: Settings,
    /// Base URL relative URLs are resolved against.
    pub base_url: Option<String>,
    /// Lifetime of cached remote Markdown in seconds.
    pub remote_expire: Option<i64>,
}

impl MarkdownSettings {
    /// Settings taken from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            parser_id: config.parser.id.clone(),
            parser: config.parser.settings.clone(),
            base_url: config.remote.base_url.clone(),
            remote_expire: config.remote.expire,
        }
    }
}

/// Loads, parses and caches Markdown.
pub struct Markdown {
    cache: Box<dyn CacheBucket>,
    files: Box<dyn FileSystem>,
    http: Box<dyn HttpClient>,
    parsers: Arc<ParserRegistry>,
    settings: MarkdownSettings,
}

impl Markdown {
    /// Create a facade over `cache` and `parsers`.
    ///
    /// Uses the local file system, a ureq client with the default timeout and
    /// empty settings; see the `with_*` builders.
    #[must_use]
    pub fn new(cache: &dyn Cache, parsers: Arc<ParserRegistry>) -> Self {
        Self {
            cache: cache.bucket(CACHE_BUCKET),
            files: Box::new(LocalFileSystem),
            http: Box::new(UreqClient::default()),
            parsers,
            settings: MarkdownSettings::default(),
        }
    }

    /// Build a facade from configuration, with the built-in plugins.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let extensions = Arc::new(ExtensionRegistry::with_builtin());
        let parsers = Arc::new(ParserRegistry::with_builtin(extensions));

        let cache: Box<dyn Cache> = if config.cache_resolved.enabled {
            Box::new(FileCache::new(
                config.cache_resolved.dir.clone(),
                env!("CARGO_PKG_VERSION"),
            ))
        } else {
            Box::new(NullCache)
        };

        Self::new(cache.as_ref(), parsers)
            .with_http_client(UreqClient::new(config.remote.timeout()))
            .with_settings(MarkdownSettings::from_config(config))
    }

    /// Replace the file system.
    #[must_use]
    pub fn with_file_system(mut self, files: impl FileSystem + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    /// Replace the HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http: impl HttpClient + 'static) -> Self {
        self.http = Box::new(http);
        self
    }

    /// Replace the global settings.
    #[must_use]
    pub fn with_settings(mut self, settings: MarkdownSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Parser registry.
    pub fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    /// Global settings.
    pub fn settings(&self) -> &MarkdownSettings {
        &self.settings
    }

    /// Cached value for `id`.
    ///
    /// Misses, expired entries and entries that are not parsed Markdown all
    /// return `None`.
    pub fn load(&self, id: &str) -> Option<ParsedMarkdown> {
        if id.is_empty() {
            return None;
        }
        let parsed = self.cache.get_json::<ParsedMarkdown>(id);
        tracing::debug!(id, hit = parsed.is_some(), "markdown cache lookup");
        parsed
    }

    /// Load and parse a local file, caching the result.
    ///
    /// The cache identity includes the file's modification time; see
    /// [`path_cache_id`](Self::path_cache_id).
    pub fn load_path(
        &self,
        path: impl AsRef<Path>,
        id: Option<&str>,
        language: Option<&str>,
    ) -> Result<ParsedMarkdown, MarkdownError> {
        let path = path.as_ref();
        let realpath = self
            .files
            .realpath(path)
            .unwrap_or_else(|| path.to_path_buf());
        let id = self.cache_id_for(&realpath, id)?;

        if let Some(parsed) = self.load(&id) {
            return Ok(parsed);
        }

        tracing::info!(path = %realpath.display(), "parsing markdown file");
        let markdown = self.files.read_to_string(&realpath)?;
        let parsed = self.parse(&markdown, language)?.with_id(id.as_str());
        Ok(self.save(&id, parsed))
    }

    /// Cache identity [`load_path`](Self::load_path) uses for `path`.
    pub fn path_cache_id(
        &self,
        path: impl AsRef<Path>,
        id: Option<&str>,
    ) -> Result<String, MarkdownError> {
        let path = path.as_ref();
        let realpath = self
            .files
            .realpath(path)
            .unwrap_or_else(|| path.to_path_buf());
        self.cache_id_for(&realpath, id)
    }

    fn cache_id_for(&self, realpath: &Path, id: Option<&str>) -> Result<String, MarkdownError> {
        if !self.files.exists(realpath) {
            return Err(MarkdownError::FileNotFound(realpath.to_path_buf()));
        }

        let id = match id {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => {
                let digest = Sha256::digest(realpath.to_string_lossy().as_bytes());
                format!(
                    "{}{}",
                    self.files.basename(realpath),
                    URL_SAFE_NO_PAD.encode(digest)
                )
            }
        };

        // The modification time makes the identity change with the file
        let mtime = self.files.modified(realpath)?;
        Ok(format!("{id}:{mtime}"))
    }

    /// Fetch and parse remote Markdown, caching the result.
    ///
    /// An explicit `id` is looked up before the URL is normalized, so a
    /// cached entry is served even when the URL cannot be resolved.
    /// Responses with a status outside `200..400` fail with
    /// [`MarkdownError::RemoteContentNotFound`].
    pub fn load_url(
        &self,
        url: &str,
        id: Option<&str>,
        language: Option<&str>,
    ) -> Result<ParsedMarkdown, MarkdownError> {
        let explicit = id.filter(|id| !id.is_empty());
        if let Some(parsed) = explicit.and_then(|id| self.load(id)) {
            return Ok(parsed);
        }

        let url = self.absolute_url(url)?;
        let id = match explicit {
            Some(id) => id.to_owned(),
            None => {
                if let Some(parsed) = self.load(&url) {
                    return Ok(parsed);
                }
                url.clone()
            }
        };

        let response = self.http.get(&url)?;
        if !(200..400).contains(&response.status) {
            tracing::warn!(url, status = response.status, "remote markdown not found");
            return Err(MarkdownError::RemoteContentNotFound {
                url,
                status: response.status,
            });
        }

        let mut parsed = self.parse(&response.body, language)?.with_id(id.as_str());
        if let Some(secs) = self.settings.remote_expire {
            parsed = parsed.with_expire(Expire::from_ttl_secs(secs));
        }
        Ok(self.save(&id, parsed))
    }

    /// Normalize `url` to an absolute URL string.
    ///
    /// Relative URLs are appended to the configured base URL with a single
    /// `/` between them; dot segments such as `..` are kept as written.
    pub fn absolute_url(&self, url: &str) -> Result<String, MarkdownError> {
        if is_absolute(url) {
            return Ok(url.to_owned());
        }

        let Some(base) = &self.settings.base_url else {
            return Err(MarkdownError::InvalidUrl(url.to_owned()));
        };
        let joined = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        );
        if is_absolute(&joined) {
            Ok(joined)
        } else {
            Err(MarkdownError::InvalidUrl(url.to_owned()))
        }
    }

    /// Parse `markdown` with the default parser.
    pub fn parse(
        &self,
        markdown: &str,
        language: Option<&str>,
    ) -> Result<ParsedMarkdown, MarkdownError> {
        let parser = self.parser(None, Settings::new())?;
        Ok(parser.parse(markdown, language)?)
    }

    /// Resolve a parser instance.
    ///
    /// With an explicit `id` the registry creates that parser with
    /// `configuration` as given. Without one, the configured parser id is
    /// used, falling back to the first installed parser, and `configuration`
    /// is merged over the global parser settings.
    pub fn parser(
        &self,
        id: Option<&str>,
        configuration: Settings,
    ) -> Result<Box<dyn MarkdownParser>, MarkdownError> {
        if let Some(id) = id {
            return Ok(self.parsers.create_instance(id, configuration)?);
        }

        let id = match self.settings.parser_id.as_deref() {
            Some(id) => id,
            None => self.parsers.first_installed_plugin_id()?,
        };
        tracing::debug!(parser = id, "using default parser");
        let configuration = merged(&self.settings.parser, &configuration);
        Ok(self.parsers.create_instance(id, configuration)?)
    }

    /// Store `parsed` under `id` with its own expiration and return it.
    pub fn save(&self, id: &str, parsed: ParsedMarkdown) -> ParsedMarkdown {
        self.cache.set_json(id, &parsed, parsed.expire());
        parsed
    }

    /// Guidelines of a parser (the default one when `id` is `None`), after
    /// its extensions have altered them.
    pub fn guidelines(&self, id: Option<&str>) -> Result<Guidelines, MarkdownError> {
        let parser = self.parser(id, Settings::new())?;
        let mut guides = parser.guidelines()?;
        parser.alter_guidelines(&mut guides)?;
        Ok(guides)
    }
}

/// Whether `url` has a scheme and an authority.
fn is_absolute(url: &str) -> bool {
    url.parse::<Uri>()
        .is_ok_and(|uri| uri.scheme().is_some() && uri.authority().is_some())
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, SystemTime};

    use md_cache::MemoryCache;
    use md_parser::{ParserDefinition, ParserError};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::MockHttpClient;

    /// Local file system that counts reads.
    #[derive(Default)]
    struct CountingFileSystem {
        reads: AtomicUsize,
    }

    impl CountingFileSystem {
        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl FileSystem for CountingFileSystem {
        fn realpath(&self, path: &Path) -> Option<PathBuf> {
            LocalFileSystem.realpath(path)
        }

        fn exists(&self, path: &Path) -> bool {
            LocalFileSystem.exists(path)
        }

        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            LocalFileSystem.read_to_string(path)
        }

        fn modified(&self, path: &Path) -> io::Result<u64> {
            LocalFileSystem.modified(path)
        }
    }

    fn builtin_parsers() -> Arc<ParserRegistry> {
        Arc::new(ParserRegistry::with_builtin(Arc::new(
            ExtensionRegistry::with_builtin(),
        )))
    }

    fn markdown() -> Markdown {
        Markdown::new(&MemoryCache::new(), builtin_parsers())
            .with_http_client(MockHttpClient::new())
    }

    fn set_mtime(path: &Path, secs: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    fn write_file(dir: &TempDir, name: &str, content: &str, mtime: u64) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        set_mtime(&path, mtime);
        path
    }

    #[test]
    fn test_save_then_load() {
        let markdown = markdown();
        let parsed = markdown.parse("# Title", None).unwrap();

        let saved = markdown.save("page", parsed.clone());

        assert_eq!(saved, parsed);
        assert_eq!(markdown.load("page"), Some(parsed));
    }

    #[test]
    fn test_load_miss_and_empty_id() {
        let markdown = markdown();
        assert_eq!(markdown.load("missing"), None);
        assert_eq!(markdown.load(""), None);
    }

    #[test]
    fn test_load_discards_foreign_cache_entries() {
        let cache = MemoryCache::new();
        let markdown = Markdown::new(&cache, builtin_parsers());

        cache
            .bucket(CACHE_BUCKET)
            .set("page", b"{\"not\":\"parsed\"}", Expire::Permanent);

        assert_eq!(markdown.load("page"), None);
    }

    #[test]
    fn test_load_ignores_expired_entries() {
        let markdown = markdown();
        let parsed = markdown
            .parse("hi", None)
            .unwrap()
            .with_expire(Expire::At(1));

        markdown.save("old", parsed);

        assert_eq!(markdown.load("old"), None);
    }

    #[test]
    fn test_parse_uses_first_installed_parser() {
        let parsed = markdown().parse("~~x~~", Some("de")).unwrap();

        assert_eq!(parsed.parser(), "commonmark");
        assert_eq!(parsed.language(), Some("de"));
        assert_eq!(parsed.html(), "<p>~~x~~</p>\n");
    }

    #[test]
    fn test_parser_uses_configured_default_and_global_settings() {
        let markdown = markdown().with_settings(MarkdownSettings {
            parser_id: Some("commonmark".to_owned()),
            parser: json!({"expire": 60, "footnotes": {"enabled": true}})
                .as_object()
                .cloned()
                .unwrap(),
            ..MarkdownSettings::default()
        });

        let overrides = json!({"footnotes": {"label": "notes"}})
            .as_object()
            .cloned()
            .unwrap();
        let parser = markdown.parser(None, overrides).unwrap();

        assert_eq!(parser.id(), "commonmark");
        assert_eq!(
            serde_json::Value::Object(parser.settings().clone()),
            json!({"expire": 60, "footnotes": {"enabled": true, "label": "notes"}})
        );
    }

    #[test]
    fn test_parser_with_explicit_id_ignores_global_settings() {
        let markdown = markdown().with_settings(MarkdownSettings {
            parser: json!({"expire": 60}).as_object().cloned().unwrap(),
            ..MarkdownSettings::default()
        });

        let parser = markdown.parser(Some("commonmark"), Settings::new()).unwrap();

        assert!(parser.settings().is_empty());
    }

    #[test]
    fn test_parser_unknown_id() {
        let result = markdown().parser(Some("markdown-it"), Settings::new());
        assert!(matches!(
            result,
            Err(MarkdownError::Parser(ParserError::UnknownParser(id))) if id == "markdown-it"
        ));
    }

    #[test]
    fn test_no_parser_available() {
        let mut registry = ParserRegistry::new(Arc::new(ExtensionRegistry::new()));
        registry.register(
            ParserDefinition::new("missing", "Missing", |_| Err(ParserError::NoParserAvailable))
                .installed(false),
        );
        let markdown = Markdown::new(&MemoryCache::new(), Arc::new(registry));

        let result = markdown.parse("text", None);

        assert!(matches!(
            result,
            Err(MarkdownError::Parser(ParserError::NoParserAvailable))
        ));
    }

    #[test]
    fn test_load_path_caches_until_modified() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "README.md", "# One", 1_700_000_000);
        let files = Arc::new(CountingFileSystem::default());
        let markdown = markdown().with_file_system(Arc::clone(&files));

        let id = markdown.path_cache_id(&path, None).unwrap();
        let first = markdown.load_path(&path, None, None).unwrap();
        let second = markdown.load_path(&path, None, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(files.reads(), 1);
        assert_eq!(markdown.path_cache_id(&path, None).unwrap(), id);
        assert_eq!(first.id(), Some(id.as_str()));
        assert!(id.starts_with("README.md"));
        assert!(id.ends_with(":1700000000"));

        // New content with a new mtime gets a new identity
        std::fs::write(&path, "# Two").unwrap();
        set_mtime(&path, 1_700_000_100);

        let changed_id = markdown.path_cache_id(&path, None).unwrap();
        let third = markdown.load_path(&path, None, None).unwrap();

        assert_ne!(changed_id, id);
        assert_eq!(files.reads(), 2);
        assert_eq!(third.html(), "<h1>Two</h1>\n");
    }

    #[test]
    fn test_load_path_with_explicit_id() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "guide.md", "text", 42);
        let markdown = markdown();

        let parsed = markdown.load_path(&path, Some("guide"), None).unwrap();

        assert_eq!(parsed.id(), Some("guide:42"));
        assert_eq!(markdown.load("guide:42"), Some(parsed));
    }

    #[test]
    fn test_load_path_relative_and_canonical_share_id() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "a.md", "text", 1);
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let indirect = tmp.path().join("sub").join("..").join("a.md");
        let markdown = markdown();

        assert_eq!(
            markdown.path_cache_id(&path, None).unwrap(),
            markdown.path_cache_id(&indirect, None).unwrap()
        );
    }

    #[test]
    fn test_load_path_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.md");

        let result = markdown().load_path(&path, None, None);

        assert!(matches!(result, Err(MarkdownError::FileNotFound(p)) if p == path));
    }

    #[test]
    fn test_load_url_status_range() {
        let http = Arc::new(
            MockHttpClient::new()
                .with_response("https://example.com/ok.md", 200, "# Ok")
                .with_response("https://example.com/redirect.md", 399, "# Edge")
                .with_response("https://example.com/bad.md", 400, "bad request"),
        );
        let markdown = markdown().with_http_client(Arc::clone(&http));

        let ok = markdown.load_url("https://example.com/ok.md", None, None).unwrap();
        assert_eq!(ok.html(), "<h1>Ok</h1>\n");
        assert_eq!(ok.id(), Some("https://example.com/ok.md"));

        assert!(markdown.load_url("https://example.com/redirect.md", None, None).is_ok());

        let bad = markdown.load_url("https://example.com/bad.md", None, None);
        assert!(matches!(
            bad,
            Err(MarkdownError::RemoteContentNotFound { status: 400, .. })
        ));

        let missing = markdown.load_url("https://example.com/missing.md", None, None);
        assert!(matches!(
            missing,
            Err(MarkdownError::RemoteContentNotFound { url, status: 404 })
                if url == "https://example.com/missing.md"
        ));
    }

    #[test]
    fn test_load_url_served_from_cache() {
        let http = Arc::new(MockHttpClient::new().with_response(
            "https://example.com/a.md",
            200,
            "text",
        ));
        let markdown = markdown().with_http_client(Arc::clone(&http));

        let first = markdown.load_url("https://example.com/a.md", None, None).unwrap();
        let second = markdown.load_url("https://example.com/a.md", None, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(http.requests().len(), 1);
        assert_eq!(markdown.load("https://example.com/a.md"), Some(first));
    }

    #[test]
    fn test_load_url_relative_uses_base_url() {
        let http = Arc::new(MockHttpClient::new().with_response(
            "https://docs.example.com/guide/intro.md",
            200,
            "intro",
        ));
        let markdown = markdown()
            .with_http_client(Arc::clone(&http))
            .with_settings(MarkdownSettings {
                base_url: Some("https://docs.example.com/".to_owned()),
                remote_expire: Some(600),
                ..MarkdownSettings::default()
            });

        let parsed = markdown.load_url("/guide/intro.md", Some("intro"), None).unwrap();

        assert_eq!(http.requests(), vec!["https://docs.example.com/guide/intro.md"]);
        assert_eq!(parsed.id(), Some("intro"));
        assert!(matches!(parsed.expire(), Expire::At(_)));
        assert_eq!(markdown.load("intro"), Some(parsed));
    }

    #[test]
    fn test_zero_expire_survives_save_then_load() {
        let markdown = markdown().with_settings(MarkdownSettings {
            parser: json!({"expire": 0}).as_object().cloned().unwrap(),
            ..MarkdownSettings::default()
        });
        let parsed = markdown.parse("hi", None).unwrap();
        assert!(matches!(parsed.expire(), Expire::At(_)));

        markdown.save("page", parsed.clone());

        assert_eq!(markdown.load("page"), Some(parsed));
    }

    #[test]
    fn test_load_url_zero_remote_expire_served_from_cache() {
        let http = Arc::new(MockHttpClient::new().with_response(
            "https://example.com/a.md",
            200,
            "text",
        ));
        let markdown = markdown()
            .with_http_client(Arc::clone(&http))
            .with_settings(MarkdownSettings {
                remote_expire: Some(0),
                ..MarkdownSettings::default()
            });

        markdown.load_url("https://example.com/a.md", None, None).unwrap();
        markdown.load_url("https://example.com/a.md", None, None).unwrap();

        assert_eq!(http.requests().len(), 1);
    }

    #[test]
    fn test_load_url_explicit_id_served_before_url_resolution() {
        let markdown = markdown();
        let parsed = markdown.parse("intro", None).unwrap().with_id("intro");
        markdown.save("intro", parsed.clone());

        let loaded = markdown.load_url("guide/intro.md", Some("intro"), None).unwrap();

        assert_eq!(loaded, parsed);
    }

    #[test]
    fn test_load_url_relative_without_base_url() {
        let result = markdown().load_url("guide/intro.md", None, None);
        assert!(matches!(result, Err(MarkdownError::InvalidUrl(_))));
    }

    #[test]
    fn test_guidelines_are_altered() {
        let markdown = markdown().with_settings(MarkdownSettings {
            parser: json!({"smart_punctuation": {"enabled": true}})
                .as_object()
                .cloned()
                .unwrap(),
            ..MarkdownSettings::default()
        });

        let guides = markdown.guidelines(None).unwrap();

        assert_eq!(guides.parser, "commonmark");
        assert!(
            guides
                .section("typography")
                .unwrap()
                .description
                .contains("curly")
        );
    }
}
