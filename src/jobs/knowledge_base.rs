//! # Knowledge Base Update
//!
//! Placeholder job: collects the titles of the local blog posts and the
//! configured service pages and reports fixed statistics. No embedding or AI
//! service is called; the payload is flagged `"mock": true`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::JobName;
use crate::error::Result;
use crate::jobs::{JobContext, MaintenanceJob};

const MOCK_AVERAGE_CHUNKS_PER_DOCUMENT: u32 = 12;
const MOCK_AVERAGE_EMBEDDING_DIMENSIONS: u32 = 1536;
const MOCK_AVERAGE_RELEVANCE_SCORE: f64 = 0.87;

/// Title and file of one blog post found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogEntry {
    pub title: String,
    pub file: String,
}

pub struct KnowledgeBaseJob {
    blog_directory: PathBuf,
    service_pages: Vec<String>,
}

impl KnowledgeBaseJob {
    pub fn new(blog_directory: impl Into<PathBuf>, service_pages: Vec<String>) -> Self {
        Self {
            blog_directory: blog_directory.into(),
            service_pages,
        }
    }
}

/// Blog posts in `dir`, sorted by file name. A missing directory has none.
pub async fn read_blog_entries(dir: &Path) -> Result<Vec<BlogEntry>> {
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Blog directory not found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();
        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "md" || ext == "mdx");
        if !is_markdown {
            continue;
        }

        // Non-UTF-8 bytes are replaced, not rejected
        let bytes = tokio::fs::read(&path).await?;
        let contents = String::from_utf8_lossy(&bytes);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        entries.push(BlogEntry {
            title: front_matter_title(&contents).unwrap_or(stem),
            file,
        });
    }

    entries.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(entries)
}

/// `title:` value from a leading `---` front-matter block
fn front_matter_title(contents: &str) -> Option<String> {
    let mut lines = contents.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }

    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        if let Some(value) = line.strip_prefix("title:") {
            let title = value.trim().trim_matches(|c| c == '"' || c == '\'');
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

#[async_trait]
impl MaintenanceJob for KnowledgeBaseJob {
    fn name(&self) -> JobName {
        JobName::UpdateKnowledgeBase
    }

    async fn execute(&self, _ctx: &JobContext) -> Result<Value> {
        let blog_entries = read_blog_entries(&self.blog_directory).await?;
        let documents = blog_entries.len() + self.service_pages.len();

        info!(
            blog_articles = blog_entries.len(),
            service_pages = self.service_pages.len(),
            "Knowledge base statistics compiled"
        );

        Ok(json!({
            "mock": true,
            "stats": {
                "blogArticles": blog_entries.len(),
                "servicePages": self.service_pages.len(),
                "totalDocuments": documents,
                "averageChunksPerDocument": MOCK_AVERAGE_CHUNKS_PER_DOCUMENT,
                "averageEmbeddingDimensions": MOCK_AVERAGE_EMBEDDING_DIMENSIONS,
                "averageRelevanceScore": MOCK_AVERAGE_RELEVANCE_SCORE,
            },
            "sources": {
                "blog": blog_entries.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(),
                "services": self.service_pages,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use std::sync::Arc;
    use uuid::Uuid;

    fn context() -> JobContext {
        JobContext {
            job_execution_id: Uuid::new_v4(),
            orchestration_id: None,
            store: Arc::new(InMemoryStore::new()),
        }
    }

    #[test]
    fn test_front_matter_title() {
        assert_eq!(
            front_matter_title("---\ndate: 2025-01-01\ntitle: \"Zero-Knowledge Proofs\"\n---\nBody"),
            Some("Zero-Knowledge Proofs".to_string())
        );
        assert_eq!(front_matter_title("# Heading\ntitle: nope"), None);
        assert_eq!(front_matter_title("---\nauthor: x\n---\ntitle: late"), None);
    }

    #[tokio::test]
    async fn test_reads_markdown_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b-post.md"), "---\ntitle: Smart Contracts\n---\n").unwrap();
        std::fs::write(dir.path().join("a-intro.mdx"), "No front matter").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let entries = read_blog_entries(dir.path()).await.unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a-intro", "Smart Contracts"]);
    }

    #[tokio::test]
    async fn test_non_utf8_file_does_not_fail_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.md"), "---\ntitle: Good Post\n---\n").unwrap();
        std::fs::write(dir.path().join("latin1.md"), b"---\ntitle: Caf\xe9 notes\n---\ncaf\xe9").unwrap();
        std::fs::write(dir.path().join("raw.md"), b"caf\xe9 notes").unwrap();

        let entries = read_blog_entries(dir.path()).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "Good Post");
        assert_eq!(entries[1].title, "Caf\u{FFFD} notes");
        assert_eq!(entries[2].title, "raw");
    }

    #[tokio::test]
    async fn test_missing_directory_yields_zero_articles() {
        let job = KnowledgeBaseJob::new(
            "/definitely/not/here",
            vec!["AI Strategy".to_string(), "Blockchain Development".to_string()],
        );
        let result = job.execute(&context()).await.unwrap();

        assert_eq!(result["mock"], true);
        assert_eq!(result["stats"]["blogArticles"], 0);
        assert_eq!(result["stats"]["servicePages"], 2);
        assert_eq!(result["stats"]["totalDocuments"], 2);
    }
}
