//! `md parsers` command implementation.

use clap::Args;
use md_service::Markdown;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the parsers command.
#[derive(Args)]
pub(crate) struct ParsersArgs {
    /// Also list the extensions of each parser.
    #[arg(short, long)]
    extensions: bool,
}

impl ParsersArgs {
    /// Execute the parsers command.
    pub(crate) fn execute(self, markdown: &Markdown) -> Result<(), CliError> {
        let output = Output::new();
        for line in listing(markdown, self.extensions)? {
            match line {
                Line::Parser { text, installed } if installed => output.highlight(&text),
                Line::Parser { text, .. } => output.muted(&text),
                Line::Extension { text, enabled } if enabled => output.success(&text),
                Line::Extension { text, .. } => output.info(&text),
            }
        }
        Ok(())
    }
}

/// One line of the listing.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Parser { text: String, installed: bool },
    Extension { text: String, enabled: bool },
}

/// Parsers in registration order, each optionally followed by its extensions
/// as resolved from the configured parser settings.
fn listing(markdown: &Markdown, extensions: bool) -> Result<Vec<Line>, CliError> {
    let mut lines = Vec::new();
    for definition in markdown.parsers().definitions() {
        let status = if definition.installed {
            ""
        } else {
            " (not installed)"
        };
        lines.push(Line::Parser {
            text: format!("{} - {}{status}", definition.id, definition.label),
            installed: definition.installed,
        });

        if !extensions {
            continue;
        }
        let parser = markdown.parser(Some(&definition.id), markdown.settings().parser.clone())?;
        for extension in parser.extensions(None)? {
            let enabled = extension.is_enabled();
            let mark = if enabled { "x" } else { " " };
            lines.push(Line::Extension {
                text: format!("  [{mark}] {} - {}", extension.id(), extension.definition().label),
                enabled,
            });
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use md_cache::MemoryCache;
    use md_parser::{ExtensionRegistry, ParserRegistry};
    use md_service::MarkdownSettings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn markdown(parser: serde_json::Value) -> Markdown {
        let parsers = ParserRegistry::with_builtin(Arc::new(ExtensionRegistry::with_builtin()));
        Markdown::new(&MemoryCache::new(), Arc::new(parsers)).with_settings(MarkdownSettings {
            parser: parser.as_object().cloned().unwrap(),
            ..MarkdownSettings::default()
        })
    }

    #[test]
    fn test_listing_parsers_only() {
        let markdown = markdown(json!({}));
        let gfm_installed = markdown
            .parsers()
            .definition("gfm")
            .is_some_and(|d| d.installed);

        let lines = listing(&markdown, false).unwrap();

        let gfm = if gfm_installed {
            "gfm - GitHub Flavored Markdown"
        } else {
            "gfm - GitHub Flavored Markdown (not installed)"
        };
        assert_eq!(
            lines,
            vec![
                Line::Parser {
                    text: "commonmark - CommonMark".to_owned(),
                    installed: true,
                },
                Line::Parser {
                    text: gfm.to_owned(),
                    installed: gfm_installed,
                },
            ]
        );
    }

    #[test]
    fn test_listing_with_extensions() {
        let lines = listing(&markdown(json!({})), true).unwrap();

        assert!(lines.contains(&Line::Extension {
            text: "  [x] tables - Tables".to_owned(),
            enabled: true,
        }));
        assert!(lines.contains(&Line::Extension {
            text: "  [ ] footnotes - Footnotes".to_owned(),
            enabled: false,
        }));
    }

    #[test]
    fn test_listing_reflects_configured_extensions() {
        let lines = listing(&markdown(json!({"extensions": [{"id": "footnotes"}]})), true).unwrap();

        assert!(lines.contains(&Line::Extension {
            text: "  [x] footnotes - Footnotes".to_owned(),
            enabled: true,
        }));
    }
}
