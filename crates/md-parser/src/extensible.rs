//! Parser whose syntax and guidelines are driven by extension plugins.
//!
//! Settings are layered in this order, later layers winning:
//!
//! 1. parser definition defaults
//! 2. caller configuration
//! 3. entries of the configuration's `extensions` list, stored under their
//!    `id` with `enabled = true`
//!
//! Extensions read their own settings from the entry keyed by their id.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use md_cache::Expire;
use pulldown_cmark::{Options, Parser, html};
use serde_json::Value;

use crate::error::ParserError;
use crate::extension::{ExtensionInstance, ExtensionRegistry};
use crate::guidelines::{GuideSection, Guidelines};
use crate::parsed::ParsedMarkdown;
use crate::parser::{MarkdownParser, ParserContext, ParserDefinition};
use crate::settings::{Settings, merge_deep, merged, section};

/// Memo key: enabled filter and parser id.
type ExtensionKey = (Option<bool>, String);

/// Extensible pulldown-cmark parser.
pub struct ExtensibleParser {
    definition: Arc<ParserDefinition>,
    settings: Settings,
    base_options: Options,
    base_sections: fn() -> Vec<GuideSection>,
    registry: Arc<ExtensionRegistry>,
    extensions: RwLock<HashMap<ExtensionKey, Vec<Arc<ExtensionInstance>>>>,
}

impl ExtensibleParser {
    /// Build a parser from a factory context.
    ///
    /// `base_options` are always enabled; `base_sections` make up the guide
    /// before extensions contribute to it.
    pub fn new(
        context: ParserContext,
        base_options: Options,
        base_sections: fn() -> Vec<GuideSection>,
    ) -> Result<Self, ParserError> {
        let ParserContext {
            definition,
            configuration,
            extensions,
        } = context;

        let mut settings = merged(&definition.settings, &configuration);
        if let Some(entries) = extension_entries(&definition.id, &configuration)? {
            merge_deep(&mut settings, entries);
        }

        Ok(Self {
            definition,
            settings,
            base_options,
            base_sections,
            registry: extensions,
            extensions: RwLock::new(HashMap::new()),
        })
    }

    /// Extensions of this parser, applying this parser's settings to them.
    ///
    /// `enabled` filters the result: `None` returns every extension owned by
    /// this parser, `Some(flag)` only those whose enabled state equals `flag`.
    /// The registry lookup happens once per filter value; settings are
    /// re-applied on every call.
    pub fn extensions(
        &self,
        enabled: Option<bool>,
    ) -> Result<Vec<Arc<ExtensionInstance>>, ParserError> {
        let key = (enabled, self.definition.id.clone());

        let cached = self
            .extensions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        let extensions = match cached {
            Some(extensions) => extensions,
            None => {
                let resolved: Vec<_> = self
                    .registry
                    .extensions(Some(&self.definition.id))?
                    .into_iter()
                    .map(Arc::new)
                    .collect();
                for extension in &resolved {
                    self.apply_settings(extension);
                }
                let filtered: Vec<_> = resolved
                    .into_iter()
                    .filter(|e| enabled.is_none_or(|flag| e.is_enabled() == flag))
                    .collect();

                tracing::debug!(
                    parser = %self.definition.id,
                    ?enabled,
                    count = filtered.len(),
                    "resolved extensions"
                );
                self.extensions
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, filtered.clone());
                filtered
            }
        };

        for extension in &extensions {
            self.apply_settings(extension);
        }
        Ok(extensions)
    }

    /// Parser options: base options plus those of enabled extensions.
    pub fn options(&self) -> Result<Options, ParserError> {
        let options = self
            .extensions(Some(true))?
            .iter()
            .fold(self.base_options, |options, e| options | e.options());
        Ok(options)
    }

    fn apply_settings(&self, extension: &ExtensionInstance) {
        if let Some(settings) = section(&self.settings, extension.id()) {
            extension.set_settings(settings);
        }
    }

    fn expire(&self) -> Expire {
        self.settings
            .get("expire")
            .and_then(Value::as_i64)
            .map_or(Expire::Permanent, Expire::from_ttl_secs)
    }
}

impl MarkdownParser for ExtensibleParser {
    fn id(&self) -> &str {
        &self.definition.id
    }

    fn label(&self) -> &str {
        &self.definition.label
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn parse(
        &self,
        markdown: &str,
        language: Option<&str>,
    ) -> Result<ParsedMarkdown, ParserError> {
        let parser = Parser::new_ext(markdown, self.options()?);
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);

        Ok(ParsedMarkdown::new(output, markdown, self.id())
            .with_language(language)
            .with_expire(self.expire()))
    }

    fn guidelines(&self) -> Result<Guidelines, ParserError> {
        let mut guides = Guidelines {
            parser: self.definition.id.clone(),
            title: self.definition.label.clone(),
            sections: (self.base_sections)(),
            extensions: Vec::new(),
        };

        for extension in self.extensions(Some(true))? {
            if let Some(fragment) = extension.guidelines() {
                guides.insert_extension(extension.id(), fragment);
            }
        }

        Ok(guides)
    }

    fn alter_guidelines(&self, guides: &mut Guidelines) -> Result<(), ParserError> {
        for extension in self.extensions(Some(true))? {
            extension.alter_guidelines(guides);
        }
        Ok(())
    }

    fn extensions(
        &self,
        enabled: Option<bool>,
    ) -> Result<Vec<Arc<ExtensionInstance>>, ParserError> {
        ExtensibleParser::extensions(self, enabled)
    }
}

impl std::fmt::Debug for ExtensibleParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensibleParser")
            .field("id", &self.definition.id)
            .field("settings", &self.settings)
            .field("base_options", &self.base_options)
            .finish_non_exhaustive()
    }
}

/// Collect the configuration's `extensions` list into settings keyed by id.
fn extension_entries(
    parser: &str,
    configuration: &Settings,
) -> Result<Option<Settings>, ParserError> {
    let Some(Value::Array(list)) = configuration.get("extensions") else {
        return Ok(None);
    };
    if list.is_empty() {
        return Ok(None);
    }

    let invalid = |message: String| ParserError::InvalidConfiguration {
        plugin: parser.to_owned(),
        message,
    };

    let mut entries = Settings::new();
    for (index, entry) in list.iter().enumerate() {
        let mut entry = entry
            .as_object()
            .cloned()
            .ok_or_else(|| invalid(format!("extensions[{index}] must be a table")))?;
        let id = entry
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| invalid(format!("extensions[{index}] requires a string id")))?;
        entry.insert("enabled".to_owned(), Value::Bool(true));
        entries.insert(id, Value::Object(entry));
    }
    Ok(Some(entries))
}
