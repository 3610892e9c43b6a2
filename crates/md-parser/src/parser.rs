//! Parser plugins and their registry.

use std::sync::Arc;

use crate::error::ParserError;
use crate::extension::{ExtensionInstance, ExtensionRegistry};
use crate::guidelines::Guidelines;
use crate::parsed::ParsedMarkdown;
use crate::settings::Settings;

/// A Markdown parser plugin.
pub trait MarkdownParser: Send + Sync {
    /// Parser id.
    fn id(&self) -> &str;

    /// Human-readable label.
    fn label(&self) -> &str;

    /// Effective settings of this instance.
    fn settings(&self) -> &Settings;

    /// Render `markdown`, optionally for a language code.
    fn parse(&self, markdown: &str, language: Option<&str>)
    -> Result<ParsedMarkdown, ParserError>;

    /// Guidelines describing the syntax this parser supports.
    ///
    /// Extension fragments come from enabled extensions only; a disabled
    /// extension's syntax is not available, so it is not described. Hosts
    /// that list every configured extension regardless of its state can
    /// walk [`extensions(None)`](Self::extensions) themselves.
    fn guidelines(&self) -> Result<Guidelines, ParserError>;

    /// Let the parser's plugins alter an existing guide in place.
    ///
    /// Like [`guidelines`](Self::guidelines), only enabled extensions take part.
    fn alter_guidelines(&self, _guides: &mut Guidelines) -> Result<(), ParserError> {
        Ok(())
    }

    /// Extensions resolved for this instance, with its settings applied.
    ///
    /// `enabled` filters the result: `None` returns all of them, `Some(flag)`
    /// only those whose enabled state equals `flag`. Parsers without
    /// extension support return none.
    fn extensions(
        &self,
        _enabled: Option<bool>,
    ) -> Result<Vec<Arc<ExtensionInstance>>, ParserError> {
        Ok(Vec::new())
    }
}

/// Everything a parser factory receives.
pub struct ParserContext {
    /// Definition the parser is created from.
    pub definition: Arc<ParserDefinition>,
    /// Caller configuration, passed through unmodified.
    pub configuration: Settings,
    /// Extension registry the parser resolves its extensions from.
    pub extensions: Arc<ExtensionRegistry>,
}

/// Constructor of a parser plugin.
pub type ParserFactory = fn(ParserContext) -> Result<Box<dyn MarkdownParser>, ParserError>;

/// Descriptor of a registered parser.
#[derive(Clone)]
pub struct ParserDefinition {
    /// Unique id.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Default settings (may contain `extensions` and `parser` keys).
    pub settings: Settings,
    /// Whether the underlying implementation is available in this build.
    pub installed: bool,
    /// Instance constructor.
    pub factory: ParserFactory,
}

impl ParserDefinition {
    /// Create an installed definition with empty settings.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, factory: ParserFactory) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            settings: Settings::new(),
            installed: true,
            factory,
        }
    }

    /// Set the installed flag.
    #[must_use]
    pub fn installed(mut self, installed: bool) -> Self {
        self.installed = installed;
        self
    }

    /// Set the default settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

impl std::fmt::Debug for ParserDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("settings", &self.settings)
            .field("installed", &self.installed)
            .finish_non_exhaustive()
    }
}

/// Registry of parser definitions, in registration order.
///
/// Instances are never cached; every [`create_instance`](Self::create_instance)
/// builds a fresh parser bound to the given configuration.
#[derive(Debug)]
pub struct ParserRegistry {
    definitions: Vec<Arc<ParserDefinition>>,
    extensions: Arc<ExtensionRegistry>,
}

impl ParserRegistry {
    /// Create an empty registry whose parsers use `extensions`.
    #[must_use]
    pub fn new(extensions: Arc<ExtensionRegistry>) -> Self {
        Self {
            definitions: Vec::new(),
            extensions,
        }
    }

    /// Registry populated with the built-in parsers.
    #[must_use]
    pub fn with_builtin(extensions: Arc<ExtensionRegistry>) -> Self {
        let mut registry = Self::new(extensions);
        for definition in crate::builtin::parser_definitions() {
            registry.register(definition);
        }
        registry
    }

    /// Register a definition, replacing one with the same id in place.
    pub fn register(&mut self, definition: ParserDefinition) {
        let definition = Arc::new(definition);
        if let Some(existing) = self
            .definitions
            .iter_mut()
            .find(|d| d.id == definition.id)
        {
            tracing::debug!(id = %definition.id, "replacing parser definition");
            *existing = definition;
        } else {
            self.definitions.push(definition);
        }
    }

    /// Extension registry handed to parsers.
    pub fn extension_registry(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ParserDefinition> {
        self.definitions.iter().map(|d| &**d)
    }

    /// Definition by id.
    pub fn definition(&self, id: &str) -> Option<&ParserDefinition> {
        self.definitions().find(|d| d.id == id)
    }

    /// Whether a parser is registered under `id`.
    pub fn has_definition(&self, id: &str) -> bool {
        self.definition(id).is_some()
    }

    /// Instantiate parser `id` with `configuration`.
    pub fn create_instance(
        &self,
        id: &str,
        configuration: Settings,
    ) -> Result<Box<dyn MarkdownParser>, ParserError> {
        let definition = self
            .definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ParserError::UnknownParser(id.to_owned()))?;

        tracing::debug!(parser = id, "creating parser instance");
        (definition.factory)(ParserContext {
            definition: Arc::clone(definition),
            configuration,
            extensions: Arc::clone(&self.extensions),
        })
    }

    /// Id of the first installed parser, in registration order.
    pub fn first_installed_plugin_id(&self) -> Result<&str, ParserError> {
        self.definitions()
            .find(|d| d.installed)
            .map(|d| d.id.as_str())
            .ok_or(ParserError::NoParserAvailable)
    }
}
