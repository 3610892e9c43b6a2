//! Parsers and extensions shipped with the crate.
//!
//! | parser       | extensions (enabled by default in bold)                        |
//! |--------------|----------------------------------------------------------------|
//! | `commonmark` | `smart_punctuation`, `heading_attributes`, `footnotes`         |
//! | `gfm`        | **`tables`**, **`strikethrough`**, **`tasklists`**, **`alerts`**, `definition_lists`, `math` |

mod extensions;
mod parsers;

pub(crate) use extensions::extension_definitions;
pub(crate) use parsers::parser_definitions;
pub use parsers::commonmark_sections;
