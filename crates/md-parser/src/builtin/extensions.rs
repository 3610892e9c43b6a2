//! Built-in extensions mapping onto pulldown-cmark options.

use pulldown_cmark::Options;

use super::parsers::{COMMONMARK, GFM};
use crate::error::ParserError;
use crate::extension::{
    AltersGuidelines, ExtensionDefinition, MarkdownExtension, ProvidesGuidelines,
};
use crate::guidelines::{GuideSection, Guidelines};
use crate::settings::Settings;

/// Definitions of the built-in extensions.
pub(crate) fn extension_definitions() -> Vec<ExtensionDefinition> {
    vec![
        ExtensionDefinition::new("smart_punctuation", "Smart punctuation", smart_punctuation)
            .for_parser(COMMONMARK),
        ExtensionDefinition::new("heading_attributes", "Heading attributes", syntax)
            .for_parser(COMMONMARK),
        ExtensionDefinition::new("footnotes", "Footnotes", syntax).for_parser(COMMONMARK),
        ExtensionDefinition::new("tables", "Tables", syntax)
            .for_parser(GFM)
            .enabled(true),
        ExtensionDefinition::new("strikethrough", "Strikethrough", syntax)
            .for_parser(GFM)
            .enabled(true),
        ExtensionDefinition::new("tasklists", "Task lists", syntax)
            .for_parser(GFM)
            .enabled(true),
        ExtensionDefinition::new("alerts", "Alerts", syntax)
            .for_parser(GFM)
            .enabled(true),
        ExtensionDefinition::new("definition_lists", "Definition lists", syntax).for_parser(GFM),
        ExtensionDefinition::new("math", "Math", syntax).for_parser(GFM),
    ]
}

/// Extension that switches on one pulldown-cmark option and documents it.
struct Syntax {
    options: Options,
    guide: GuideSection,
}

impl ProvidesGuidelines for Syntax {
    fn guidelines(&self, _settings: &Settings) -> Option<GuideSection> {
        Some(self.guide.clone())
    }
}

impl MarkdownExtension for Syntax {
    fn options(&self, _settings: &Settings) -> Options {
        self.options
    }

    fn guidelines_provider(&self) -> Option<&dyn ProvidesGuidelines> {
        Some(self)
    }
}

fn syntax(definition: &ExtensionDefinition) -> Result<Box<dyn MarkdownExtension>, ParserError> {
    let (options, description, example) = match definition.id.as_str() {
        "heading_attributes" => (
            Options::ENABLE_HEADING_ATTRIBUTES,
            "Add an id and classes to a heading with a trailing `{#id .class}` block.",
            "## Installation {#install .important}",
        ),
        "footnotes" => (
            Options::ENABLE_FOOTNOTES,
            "Reference a footnote with `[^label]` and define it on its own line.",
            "Text with a note.[^1]\n\n[^1]: The note.",
        ),
        "tables" => (
            Options::ENABLE_TABLES,
            "Separate cells with `|` and put a `---` delimiter row under the header.",
            "| Name | Value |\n|------|-------|\n| a    | 1     |",
        ),
        "strikethrough" => (
            Options::ENABLE_STRIKETHROUGH,
            "Wrap text in `~~` to strike it through.",
            "~~obsolete~~",
        ),
        "tasklists" => (
            Options::ENABLE_TASKLISTS,
            "Start list items with `[ ]` or `[x]` to render checkboxes.",
            "- [x] done\n- [ ] todo",
        ),
        "alerts" => (
            Options::ENABLE_GFM,
            "Start a block quote with `[!NOTE]`, `[!TIP]`, `[!IMPORTANT]`, `[!WARNING]` or `[!CAUTION]`.",
            "> [!NOTE]\n> Worth knowing.",
        ),
        "definition_lists" => (
            Options::ENABLE_DEFINITION_LIST,
            "Put a term on its own line and its definition on the next line after `: `.",
            "Term\n: Definition",
        ),
        "math" => (
            Options::ENABLE_MATH,
            "Wrap inline math in `$` and display math in `$$`.",
            "$e^{i\\pi} + 1 = 0$",
        ),
        other => return Err(ParserError::UnknownExtension(other.to_owned())),
    };

    Ok(Box::new(Syntax {
        options,
        guide: GuideSection::new(&definition.id, &definition.label, description)
            .with_example(example),
    }))
}

/// Curly quotes and typographic dashes; rewrites the typography guide.
struct SmartPunctuation;

impl AltersGuidelines for SmartPunctuation {
    fn alter_guidelines(&self, _settings: &Settings, guides: &mut Guidelines) {
        if let Some(section) = guides.section_mut("typography") {
            "Straight quotes become curly quotes, `--` an en dash, `---` an em dash and `...` an ellipsis."
                .clone_into(&mut section.description);
            section.examples = vec!["\"Quoted\" -- and --- then...".to_owned()];
        }
    }
}

impl MarkdownExtension for SmartPunctuation {
    fn options(&self, _settings: &Settings) -> Options {
        Options::ENABLE_SMART_PUNCTUATION
    }

    fn guidelines_alterer(&self) -> Option<&dyn AltersGuidelines> {
        Some(self)
    }
}

fn smart_punctuation(
    _definition: &ExtensionDefinition,
) -> Result<Box<dyn MarkdownExtension>, ParserError> {
    Ok(Box::new(SmartPunctuation))
}
