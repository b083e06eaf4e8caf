//! Corpus sources.
//!
//! A [`CorpusSource`] hands the retriever its passages once, at
//! initialization. Sources validate ids: an empty id is an error and a
//! duplicate id keeps the first occurrence.

use crate::types::KnowledgePassage;
use asana_core::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supplies the ordered passage list for a retriever.
#[async_trait]
pub trait CorpusSource: Send + Sync + std::fmt::Debug {
    /// Short label used in logs.
    fn describe(&self) -> String;

    /// Load every passage, in corpus order.
    async fn load(&self) -> AppResult<Vec<KnowledgePassage>>;
}

/// The built-in six-passage yoga corpus.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCorpus;

impl BundledCorpus {
    pub fn passages() -> Vec<KnowledgePassage> {
        vec![
            KnowledgePassage::new(
                "chunk_001",
                "Introduction to Yoga",
                "Yoga is a 5,000-year-old practice from India that combines physical postures (asanas), breathing exercises (pranayama), and meditation to promote physical and mental wellbeing.",
                "general",
            ),
            KnowledgePassage::new(
                "chunk_002",
                "Benefits of Regular Practice",
                "Regular yoga practice improves flexibility, strength, posture, and balance. It reduces stress, anxiety, and helps with sleep quality. Yoga also enhances mental clarity and focus.",
                "general",
            ),
            KnowledgePassage::new(
                "chunk_003",
                "Downward Dog (Adho Mukha Svanasana)",
                "Start on hands and knees. Lift hips up and back, forming an inverted V shape. Hands shoulder-width, feet hip-width. Lengthen spine and press heels toward floor. Great for stretching hamstrings and strengthening arms.",
                "beginner",
            ),
            KnowledgePassage::new(
                "chunk_004",
                "Mountain Pose (Tadasana)",
                "Stand tall with feet together or hip-width apart. Weight evenly distributed. Engage thighs, lengthen spine, relax shoulders. Arms can be at sides or overhead. Focus on grounding and alignment.",
                "beginner",
            ),
            KnowledgePassage::new(
                "chunk_005",
                "Childs Pose (Balasana)",
                "Restorative pose. Kneel on floor, sit back on heels, fold forward resting forehead on ground. Arms can be extended forward or alongside body. Excellent for relaxation and stress relief.",
                "restorative",
            ),
            KnowledgePassage::new(
                "chunk_006",
                "Safety Precautions",
                "Always listen to your body. Never push into pain. If you have medical conditions (hernia, glaucoma, high blood pressure, pregnancy) consult a doctor before practicing. Use props for support when needed.",
                "safety",
            ),
        ]
    }
}

#[async_trait]
impl CorpusSource for BundledCorpus {
    fn describe(&self) -> String {
        "bundled".to_string()
    }

    async fn load(&self) -> AppResult<Vec<KnowledgePassage>> {
        Ok(Self::passages())
    }
}

/// An in-memory passage list.
#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    passages: Vec<KnowledgePassage>,
}

impl StaticCorpus {
    pub fn new(passages: Vec<KnowledgePassage>) -> Self {
        Self { passages }
    }
}

#[async_trait]
impl CorpusSource for StaticCorpus {
    fn describe(&self) -> String {
        format!("static ({} passages)", self.passages.len())
    }

    async fn load(&self) -> AppResult<Vec<KnowledgePassage>> {
        dedupe(self.passages.clone())
    }
}

/// Passages read from a YAML/JSON file or a directory of them.
#[derive(Debug, Clone)]
pub struct FileCorpus {
    path: PathBuf,
}

/// Accepted file layouts: a bare list or `{ passages: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    List(Vec<KnowledgePassage>),
    Wrapped { passages: Vec<KnowledgePassage> },
}

impl CorpusFile {
    fn into_passages(self) -> Vec<KnowledgePassage> {
        match self {
            CorpusFile::List(passages) => passages,
            CorpusFile::Wrapped { passages } => passages,
        }
    }
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> AppResult<Vec<KnowledgePassage>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Corpus(format!("Failed to read {:?}: {}", path, e)))?;

        let parsed: CorpusFile = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| AppError::Corpus(format!("Failed to parse {:?}: {}", path, e)))?,
            _ => serde_yaml::from_str(&contents)
                .map_err(|e| AppError::Corpus(format!("Failed to parse {:?}: {}", path, e)))?,
        };

        let passages = parsed.into_passages();
        tracing::debug!("Read {} passages from {:?}", passages.len(), path);
        Ok(passages)
    }

    fn read_all(&self) -> AppResult<Vec<KnowledgePassage>> {
        if self.path.is_file() {
            return Self::read_file(&self.path);
        }

        if !self.path.is_dir() {
            return Err(AppError::Corpus(format!(
                "Corpus path does not exist: {:?}",
                self.path
            )));
        }

        let mut passages = Vec::new();
        for entry in WalkDir::new(&self.path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && is_corpus_file(entry_path) {
                passages.extend(Self::read_file(entry_path)?);
            }
        }

        Ok(passages)
    }
}

#[async_trait]
impl CorpusSource for FileCorpus {
    fn describe(&self) -> String {
        format!("file {:?}", self.path)
    }

    async fn load(&self) -> AppResult<Vec<KnowledgePassage>> {
        let corpus = self.clone();
        let passages = tokio::task::spawn_blocking(move || corpus.read_all())
            .await
            .map_err(|e| AppError::Corpus(format!("Corpus loader task failed: {}", e)))??;
        dedupe(passages)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn is_corpus_file(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("yaml" | "yml" | "json"))
}

/// Reject empty ids and drop later duplicates, keeping corpus order.
pub fn dedupe(passages: Vec<KnowledgePassage>) -> AppResult<Vec<KnowledgePassage>> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(passages.len());

    for (position, passage) in passages.into_iter().enumerate() {
        if passage.id.trim().is_empty() {
            return Err(AppError::Corpus(format!(
                "Passage at position {} has an empty id",
                position
            )));
        }

        if !seen.insert(passage.id.clone()) {
            tracing::warn!("Duplicate passage id '{}', keeping first occurrence", passage.id);
            continue;
        }

        unique.push(passage);
    }

    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_bundled_corpus() {
        let passages = BundledCorpus.load().await.unwrap();
        assert_eq!(passages.len(), 6);
        assert_eq!(passages[0].id, "chunk_001");
        assert_eq!(passages[1].title, "Benefits of Regular Practice");
        assert_eq!(passages[5].category, "safety");

        let ids: HashSet<_> = passages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 6);
    }

    #[tokio::test]
    async fn test_static_corpus_dedupes() {
        let corpus = StaticCorpus::new(vec![
            KnowledgePassage::new("a", "First", "one", "general"),
            KnowledgePassage::new("b", "Second", "two", "general"),
            KnowledgePassage::new("a", "Shadow", "three", "general"),
        ]);

        let passages = corpus.load().await.unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].title, "First");
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let corpus = StaticCorpus::new(vec![KnowledgePassage::new(" ", "T", "C", "general")]);
        let result = corpus.load().await;
        assert!(matches!(result, Err(AppError::Corpus(_))));
    }

    #[tokio::test]
    async fn test_file_corpus_yaml_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corpus.yaml");
        std::fs::write(
            &path,
            "- id: warrior\n  title: Warrior II\n  content: Step wide and bend the front knee.\n  category: standing\n",
        )
        .unwrap();

        let passages = FileCorpus::new(&path).load().await.unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].id, "warrior");
        assert_eq!(passages[0].category, "standing");
    }

    #[tokio::test]
    async fn test_file_corpus_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("b.json"),
            r#"{"passages": [{"id": "tree", "title": "Tree Pose", "content": "Balance on one leg."}]}"#,
        )
        .unwrap();
        std::fs::write(
            temp.path().join("a.yml"),
            "passages:\n  - id: cobra\n    title: Cobra\n    content: Lift the chest.\n",
        )
        .unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let passages = FileCorpus::new(temp.path()).load().await.unwrap();
        let ids: Vec<_> = passages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["cobra", "tree"]);
    }

    #[tokio::test]
    async fn test_file_corpus_missing_path() {
        let temp = TempDir::new().unwrap();
        let result = FileCorpus::new(temp.path().join("missing")).load().await;
        assert!(matches!(result, Err(AppError::Corpus(_))));
    }

    #[tokio::test]
    async fn test_file_corpus_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{\"passages\": 42}").unwrap();
        assert!(FileCorpus::new(&path).load().await.is_err());
    }
}
