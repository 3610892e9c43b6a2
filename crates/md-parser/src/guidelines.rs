//! Human-readable documentation of the syntax a parser supports.

use serde::Serialize;

/// A single documented syntax feature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GuideSection {
    /// Stable identifier (e.g. `"headings"`, or the extension id).
    pub id: String,
    /// Section heading.
    pub title: String,
    /// Prose description of the syntax.
    pub description: String,
    /// Markdown snippets illustrating the syntax.
    pub examples: Vec<String>,
}

impl GuideSection {
    /// Create a section without examples.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            examples: Vec::new(),
        }
    }

    /// Add an example snippet.
    #[must_use]
    pub fn with_example(mut self, markdown: impl Into<String>) -> Self {
        self.examples.push(markdown.into());
        self
    }
}

/// Guidelines of a parser plus the fragments contributed by its extensions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Guidelines {
    /// Parser id.
    pub parser: String,
    /// Parser label.
    pub title: String,
    /// Base syntax sections.
    pub sections: Vec<GuideSection>,
    /// Extension fragments, keyed by extension id, in registry order.
    pub extensions: Vec<GuideSection>,
}

impl Guidelines {
    /// Base section by id.
    pub fn section(&self, id: &str) -> Option<&GuideSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Mutable base section by id.
    pub fn section_mut(&mut self, id: &str) -> Option<&mut GuideSection> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    /// Fragment contributed by extension `id`.
    pub fn extension(&self, id: &str) -> Option<&GuideSection> {
        self.extensions.iter().find(|s| s.id == id)
    }

    /// Store a fragment under extension `id`, replacing an earlier one.
    pub fn insert_extension(&mut self, id: &str, mut fragment: GuideSection) {
        id.clone_into(&mut fragment.id);
        if let Some(existing) = self.extensions.iter_mut().find(|s| s.id == id) {
            *existing = fragment;
        } else {
            self.extensions.push(fragment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_extension_keys_by_id() {
        let mut guides = Guidelines::default();
        guides.insert_extension("tables", GuideSection::new("ignored", "Tables", "first"));
        guides.insert_extension("footnotes", GuideSection::new("", "Footnotes", ""));
        guides.insert_extension("tables", GuideSection::new("", "Tables", "second"));

        assert_eq!(guides.extensions.len(), 2);
        assert_eq!(guides.extensions[0].id, "tables");
        assert_eq!(guides.extension("tables").unwrap().description, "second");
        assert!(guides.extension("math").is_none());
    }
}
