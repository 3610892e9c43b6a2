//! Built-in pulldown-cmark parsers.

use pulldown_cmark::Options;

use crate::error::ParserError;
use crate::extensible::ExtensibleParser;
use crate::guidelines::GuideSection;
use crate::parser::{MarkdownParser, ParserContext, ParserDefinition};

pub(crate) const COMMONMARK: &str = "commonmark";
pub(crate) const GFM: &str = "gfm";

/// Definitions of the built-in parsers, in preference order.
pub(crate) fn parser_definitions() -> Vec<ParserDefinition> {
    vec![
        ParserDefinition::new(COMMONMARK, "CommonMark", create),
        ParserDefinition::new(GFM, "GitHub Flavored Markdown", create)
            .installed(cfg!(feature = "gfm")),
    ]
}

fn create(context: ParserContext) -> Result<Box<dyn MarkdownParser>, ParserError> {
    let parser = ExtensibleParser::new(context, Options::empty(), commonmark_sections)?;
    Ok(Box::new(parser))
}

/// Guide sections for the CommonMark core syntax.
pub fn commonmark_sections() -> Vec<GuideSection> {
    vec![
        GuideSection::new(
            "paragraphs",
            "Paragraphs",
            "Separate paragraphs with a blank line. A single line break is joined into the paragraph.",
        )
        .with_example("First paragraph.\n\nSecond paragraph."),
        GuideSection::new(
            "headings",
            "Headings",
            "Start a line with one to six `#` characters followed by a space.",
        )
        .with_example("# Title\n\n## Section"),
        GuideSection::new(
            "emphasis",
            "Emphasis",
            "Wrap text in `*` or `_` for emphasis and in `**` or `__` for strong emphasis.",
        )
        .with_example("*emphasis* and **strong**"),
        GuideSection::new(
            "links",
            "Links and images",
            "Links use `[text](url)`; images add a leading `!`.",
        )
        .with_example("[Rust](https://www.rust-lang.org)")
        .with_example("![Logo](logo.png)"),
        GuideSection::new(
            "lists",
            "Lists",
            "Start items with `-`, `*` or `+` for bullet lists and `1.` for ordered lists.",
        )
        .with_example("- one\n- two\n\n1. first\n2. second"),
        GuideSection::new(
            "code",
            "Code",
            "Use backticks for inline code and fences of three backticks for code blocks.",
        )
        .with_example("`inline`")
        .with_example("```rust\nfn main() {}\n```"),
        GuideSection::new(
            "blockquotes",
            "Block quotes",
            "Prefix lines with `>` to quote them.",
        )
        .with_example("> Quoted text"),
        GuideSection::new(
            "typography",
            "Typography",
            "Quotes, dashes and ellipses are rendered exactly as typed.",
        ),
    ]
}
