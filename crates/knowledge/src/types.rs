//! Type definitions for the knowledge corpus.

use serde::{Deserialize, Serialize};

/// A short, static reference text about a yoga topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgePassage {
    /// Identifier, unique within a corpus
    pub id: String,

    /// Article title
    pub title: String,

    /// Passage body
    pub content: String,

    /// Grouping such as "general", "beginner", "restorative", "safety"
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

impl KnowledgePassage {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            category: category.into(),
        }
    }

    /// Text fed to the embedding providers.
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }

    /// First `max_chars` characters of the content, with `...` when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &self.content[..byte_idx]),
            None => self.content.clone(),
        }
    }
}

/// A passage with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMatch {
    pub passage: KnowledgePassage,

    /// Cosine similarity clamped to [0, 1]
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text() {
        let passage = KnowledgePassage::new("p1", "Mountain Pose", "Stand tall.", "beginner");
        assert_eq!(passage.embedding_text(), "Mountain Pose\nStand tall.");
    }

    #[test]
    fn test_preview_truncates() {
        let passage = KnowledgePassage::new("p1", "t", "abcdefghij", "general");
        assert_eq!(passage.preview(4), "abcd...");
        assert_eq!(passage.preview(10), "abcdefghij");
        assert_eq!(passage.preview(50), "abcdefghij");
    }

    #[test]
    fn test_preview_char_boundary() {
        let passage = KnowledgePassage::new("p1", "t", "Ásana é ótimo", "general");
        assert_eq!(passage.preview(3), "Ása...");
    }

    #[test]
    fn test_category_defaults_to_general() {
        let passage: KnowledgePassage =
            serde_yaml::from_str("id: a\ntitle: T\ncontent: C\n").unwrap();
        assert_eq!(passage.category, "general");
    }
}
