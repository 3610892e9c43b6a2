//! Extension plugins and their registry.
//!
//! An extension adds syntax to a parser (as pulldown-cmark [`Options`]) and may
//! take part in guideline generation. Guideline participation is an optional
//! capability: [`MarkdownExtension::guidelines_provider`] and
//! [`MarkdownExtension::guidelines_alterer`] return `None` for extensions
//! that do not take part, and such extensions are skipped.

use std::sync::{Arc, PoisonError, RwLock};

use pulldown_cmark::Options;
use serde_json::Value;

use crate::error::ParserError;
use crate::guidelines::{GuideSection, Guidelines};
use crate::settings::{Settings, merged};

/// Extension that supplies its own guideline fragment.
pub trait ProvidesGuidelines {
    /// Fragment describing the extension's syntax, if it has one.
    fn guidelines(&self, settings: &Settings) -> Option<GuideSection>;
}

/// Extension that alters the guidelines of its parser.
pub trait AltersGuidelines {
    /// Mutate `guides` in place.
    fn alter_guidelines(&self, settings: &Settings, guides: &mut Guidelines);
}

/// Behaviour of an extension plugin.
///
/// Implementations are stateless; the settings of the owning
/// [`ExtensionInstance`] are passed to every call.
pub trait MarkdownExtension: Send + Sync {
    /// Parser options this extension enables.
    fn options(&self, _settings: &Settings) -> Options {
        Options::empty()
    }

    /// Guideline fragment capability.
    fn guidelines_provider(&self) -> Option<&dyn ProvidesGuidelines> {
        None
    }

    /// Guideline altering capability.
    fn guidelines_alterer(&self) -> Option<&dyn AltersGuidelines> {
        None
    }
}

/// Constructor of an extension plugin.
pub type ExtensionFactory =
    fn(&ExtensionDefinition) -> Result<Box<dyn MarkdownExtension>, ParserError>;

/// Descriptor of a registered extension.
#[derive(Clone)]
pub struct ExtensionDefinition {
    /// Unique id.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Parser this extension belongs to. `None` for unowned extensions,
    /// which are only listed by unfiltered lookups.
    pub parser: Option<String>,
    /// Default settings.
    pub settings: Settings,
    /// Whether the extension is enabled unless settings say otherwise.
    pub enabled: bool,
    /// Instance constructor.
    pub factory: ExtensionFactory,
}

impl ExtensionDefinition {
    /// Create a definition with empty settings, disabled by default.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, factory: ExtensionFactory) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parser: None,
            settings: Settings::new(),
            enabled: false,
            factory,
        }
    }

    /// Set the owning parser.
    #[must_use]
    pub fn for_parser(mut self, parser: impl Into<String>) -> Self {
        self.parser = Some(parser.into());
        self
    }

    /// Set the default enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the default settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

impl std::fmt::Debug for ExtensionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("parser", &self.parser)
            .field("settings", &self.settings)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// A constructed extension bound to its definition and current settings.
///
/// Settings use interior mutability so instances can be shared by a parser's
/// memoized extension lists and still receive the parser's settings.
pub struct ExtensionInstance {
    definition: Arc<ExtensionDefinition>,
    plugin: Box<dyn MarkdownExtension>,
    settings: RwLock<Settings>,
}

impl ExtensionInstance {
    fn new(definition: Arc<ExtensionDefinition>, plugin: Box<dyn MarkdownExtension>) -> Self {
        let settings = RwLock::new(definition.settings.clone());
        Self {
            definition,
            plugin,
            settings,
        }
    }

    /// Extension id.
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// Definition this instance was created from.
    pub fn definition(&self) -> &ExtensionDefinition {
        &self.definition
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the settings, layered over the definition defaults.
    pub fn set_settings(&self, settings: &Settings) {
        let value = merged(&self.definition.settings, settings);
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Whether the extension is enabled.
    ///
    /// An `enabled` setting wins over the definition default.
    pub fn is_enabled(&self) -> bool {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(self.definition.enabled)
    }

    /// Parser options contributed by this extension.
    pub fn options(&self) -> Options {
        self.plugin.options(&self.settings())
    }

    /// Guideline fragment, if the extension provides one.
    pub fn guidelines(&self) -> Option<GuideSection> {
        self.plugin
            .guidelines_provider()
            .and_then(|provider| provider.guidelines(&self.settings()))
    }

    /// Let the extension alter `guides`. Returns whether it has the capability.
    pub fn alter_guidelines(&self, guides: &mut Guidelines) -> bool {
        match self.plugin.guidelines_alterer() {
            Some(alterer) => {
                alterer.alter_guidelines(&self.settings(), guides);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ExtensionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionInstance")
            .field("id", &self.definition.id)
            .field("settings", &self.settings())
            .finish_non_exhaustive()
    }
}

/// Registry of extension definitions, in registration order.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    definitions: Vec<Arc<ExtensionDefinition>>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the built-in extensions.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for definition in crate::builtin::extension_definitions() {
            registry.register(definition);
        }
        registry
    }

    /// Register a definition, replacing one with the same id in place.
    pub fn register(&mut self, definition: ExtensionDefinition) {
        let definition = Arc::new(definition);
        if let Some(existing) = self
            .definitions
            .iter_mut()
            .find(|d| d.id == definition.id)
        {
            tracing::debug!(id = %definition.id, "replacing extension definition");
            *existing = definition;
        } else {
            self.definitions.push(definition);
        }
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ExtensionDefinition> {
        self.definitions.iter().map(|d| &**d)
    }

    /// Definition by id.
    pub fn definition(&self, id: &str) -> Option<&ExtensionDefinition> {
        self.definitions().find(|d| d.id == id)
    }

    /// Instantiate the extension registered under `id`.
    pub fn create_instance(&self, id: &str) -> Result<ExtensionInstance, ParserError> {
        let definition = self
            .definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ParserError::UnknownExtension(id.to_owned()))?;
        Self::instantiate(definition)
    }

    /// Instantiate extensions, optionally only those owned by `parser`.
    ///
    /// With `Some(parser)`, definitions owned by another parser and unowned
    /// definitions are skipped. With `None` every definition is returned.
    /// The first instantiation failure aborts the whole lookup.
    pub fn extensions(&self, parser: Option<&str>) -> Result<Vec<ExtensionInstance>, ParserError> {
        self.definitions
            .iter()
            .filter(|d| parser.is_none_or(|parser| d.parser.as_deref() == Some(parser)))
            .map(Self::instantiate)
            .collect()
    }

    fn instantiate(definition: &Arc<ExtensionDefinition>) -> Result<ExtensionInstance, ParserError> {
        let plugin = (definition.factory)(definition)?;
        Ok(ExtensionInstance::new(Arc::clone(definition), plugin))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Plain;

    impl MarkdownExtension for Plain {}

    fn plain(_: &ExtensionDefinition) -> Result<Box<dyn MarkdownExtension>, ParserError> {
        Ok(Box::new(Plain))
    }

    fn broken(definition: &ExtensionDefinition) -> Result<Box<dyn MarkdownExtension>, ParserError> {
        Err(ParserError::InvalidConfiguration {
            plugin: definition.id.clone(),
            message: "missing dependency".to_owned(),
        })
    }

    fn registry() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        registry.register(ExtensionDefinition::new("a", "A", plain).for_parser("x"));
        registry.register(ExtensionDefinition::new("b", "B", plain).for_parser("y"));
        registry.register(ExtensionDefinition::new("c", "C", plain));
        registry.register(ExtensionDefinition::new("d", "D", plain).for_parser("x"));
        registry
    }

    fn ids(extensions: &[ExtensionInstance]) -> Vec<&str> {
        extensions.iter().map(ExtensionInstance::id).collect()
    }

    #[test]
    fn test_filter_by_parser() {
        let registry = registry();
        let extensions = registry.extensions(Some("x")).unwrap();
        assert_eq!(ids(&extensions), vec!["a", "d"]);
    }

    #[test]
    fn test_unfiltered_returns_everything() {
        let registry = registry();
        let extensions = registry.extensions(None).unwrap();
        assert_eq!(ids(&extensions), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_unowned_excluded_when_parser_given() {
        let registry = registry();
        let extensions = registry.extensions(Some("y")).unwrap();
        assert_eq!(ids(&extensions), vec!["b"]);
        assert!(registry.extensions(Some("z")).unwrap().is_empty());
    }

    #[test]
    fn test_instantiation_failure_propagates() {
        let mut registry = registry();
        registry.register(ExtensionDefinition::new("e", "E", broken).for_parser("x"));

        let result = registry.extensions(Some("x"));
        assert!(matches!(
            result,
            Err(ParserError::InvalidConfiguration { plugin, .. }) if plugin == "e"
        ));
        assert!(registry.extensions(Some("y")).is_ok());
    }

    #[test]
    fn test_create_unknown_extension() {
        let result = registry().create_instance("missing");
        assert!(matches!(result, Err(ParserError::UnknownExtension(id)) if id == "missing"));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = registry();
        registry.register(ExtensionDefinition::new("a", "A2", plain).for_parser("y"));

        let labels: Vec<_> = registry.definitions().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["A2", "B", "C", "D"]);
    }

    #[test]
    fn test_settings_layer_over_defaults() {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            ExtensionDefinition::new("a", "A", plain)
                .with_settings(json!({"level": 1, "style": "plain"}).as_object().cloned().unwrap()),
        );
        let instance = registry.create_instance("a").unwrap();
        assert!(!instance.is_enabled());

        instance.set_settings(json!({"level": 2, "enabled": true}).as_object().unwrap());

        assert_eq!(
            Value::Object(instance.settings()),
            json!({"level": 2, "style": "plain", "enabled": true})
        );
        assert!(instance.is_enabled());
    }

    #[test]
    fn test_missing_capabilities_are_skipped() {
        let registry = registry();
        let instance = registry.create_instance("a").unwrap();
        let mut guides = Guidelines::default();

        assert!(instance.guidelines().is_none());
        assert!(!instance.alter_guidelines(&mut guides));
        assert_eq!(guides, Guidelines::default());
    }
}
