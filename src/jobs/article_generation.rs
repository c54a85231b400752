//! # Automated Article Generation
//!
//! Picks the topic of the day, has the content generator draft an article and
//! stores it as a generated blog post.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::JobName;
use crate::error::{MaintenanceError, Result};
use crate::jobs::content::ContentGenerator;
use crate::jobs::{JobContext, MaintenanceJob};
use crate::models::generated_article::slugify;
use crate::models::GeneratedArticle;

/// Slugs tried per article before giving up
const MAX_SLUG_ATTEMPTS: u32 = 20;

/// Candidate slug for attempt `n`: `base`, `base-YYYYMMDD`, `base-YYYYMMDD-2`, ...
fn slug_candidate(base: &str, date: &str, attempt: u32) -> String {
    match attempt {
        0 => base.to_string(),
        1 => format!("{base}-{date}"),
        n => format!("{base}-{date}-{n}"),
    }
}

pub struct ArticleGenerationJob {
    topics: Vec<String>,
    generator: Arc<dyn ContentGenerator>,
}

impl ArticleGenerationJob {
    pub fn new(topics: Vec<String>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { topics, generator }
    }

    /// Topic for a given day; rotates through the list by day of year
    pub fn topic_for_day(&self, ordinal: u32) -> Option<&str> {
        if self.topics.is_empty() {
            return None;
        }
        let index = ordinal as usize % self.topics.len();
        Some(self.topics[index].as_str())
    }
}

#[async_trait]
impl MaintenanceJob for ArticleGenerationJob {
    fn name(&self) -> JobName {
        JobName::AutomatedArticleGeneration
    }

    async fn execute(&self, ctx: &JobContext) -> Result<Value> {
        let now = Utc::now();
        let topic = self
            .topic_for_day(now.ordinal())
            .ok_or_else(|| {
                MaintenanceError::Configuration("No article topics configured".to_string())
            })?
            .to_string();

        let draft = self.generator.generate_article(&topic).await?;

        let mut base = slugify(&draft.title);
        if base.is_empty() {
            base = slugify(&topic);
        }
        let date = now.format("%Y%m%d").to_string();

        let mut stored = None;
        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = slug_candidate(&base, &date, attempt);
            if ctx.store.article_slug_exists(&slug).await? {
                continue;
            }

            let candidate = GeneratedArticle {
                id: Uuid::new_v4(),
                slug,
                title: draft.title.clone(),
                excerpt: draft.excerpt.clone(),
                content: draft.content.clone(),
                tags: json!(draft.tags),
                job_execution_id: Some(ctx.job_execution_id),
                created_at: now,
            };
            match ctx.store.save_article(candidate).await {
                Ok(article) => {
                    stored = Some(article);
                    break;
                }
                // Taken between the check and the insert by a concurrent run
                Err(e) if e.is_conflict() => {
                    debug!(error = %e, "Slug taken concurrently, trying next candidate");
                }
                Err(e) => return Err(e),
            }
        }

        let article = stored.ok_or_else(|| {
            MaintenanceError::Conflict(format!(
                "No free slug for '{base}' after {MAX_SLUG_ATTEMPTS} attempts"
            ))
        })?;

        info!(slug = %article.slug, topic = %topic, "Generated article stored");

        Ok(json!({
            "topic": topic,
            "article": {
                "id": article.id,
                "slug": article.slug,
                "title": article.title,
                "wordCount": article.word_count(),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{InMemoryStore, MaintenanceStore};
    use crate::jobs::content::ArticleDraft;
    use crate::models::{
        AnalysisResult, JobExecution, JobExecutionOutcome, OrchestrationRun, RunFinalization,
    };

    struct FixedGenerator;

    #[async_trait]
    impl ContentGenerator for FixedGenerator {
        async fn generate_article(&self, topic: &str) -> Result<ArticleDraft> {
            Ok(ArticleDraft {
                title: format!("Guide: {topic}"),
                excerpt: "Short".to_string(),
                content: "one two three four".to_string(),
                tags: vec!["ai".to_string()],
            })
        }
    }

    struct SameTitleGenerator;

    #[async_trait]
    impl ContentGenerator for SameTitleGenerator {
        async fn generate_article(&self, _topic: &str) -> Result<ArticleDraft> {
            Ok(ArticleDraft {
                title: "Same Title".to_string(),
                excerpt: "Short".to_string(),
                content: "body".to_string(),
                tags: vec![],
            })
        }
    }

    /// Reports every slug as free, so only the insert sees the collision
    struct StaleSlugCheckStore(InMemoryStore);

    #[async_trait]
    impl MaintenanceStore for StaleSlugCheckStore {
        async fn create_orchestration_run(&self, total_jobs: i32) -> Result<OrchestrationRun> {
            self.0.create_orchestration_run(total_jobs).await
        }

        async fn finalize_orchestration_run(
            &self,
            id: Uuid,
            finalization: RunFinalization,
        ) -> Result<OrchestrationRun> {
            self.0.finalize_orchestration_run(id, finalization).await
        }

        async fn get_orchestration_run(&self, id: Uuid) -> Result<Option<OrchestrationRun>> {
            self.0.get_orchestration_run(id).await
        }

        async fn list_orchestration_runs(&self, limit: i64) -> Result<Vec<OrchestrationRun>> {
            self.0.list_orchestration_runs(limit).await
        }

        async fn create_job_execution(
            &self,
            orchestration_id: Option<Uuid>,
            job: JobName,
        ) -> Result<JobExecution> {
            self.0.create_job_execution(orchestration_id, job).await
        }

        async fn finish_job_execution(
            &self,
            id: Uuid,
            outcome: JobExecutionOutcome,
        ) -> Result<JobExecution> {
            self.0.finish_job_execution(id, outcome).await
        }

        async fn list_job_executions(&self, orchestration_id: Uuid) -> Result<Vec<JobExecution>> {
            self.0.list_job_executions(orchestration_id).await
        }

        async fn record_analysis_result(&self, result: AnalysisResult) -> Result<AnalysisResult> {
            self.0.record_analysis_result(result).await
        }

        async fn list_analysis_results(&self, job_execution_id: Uuid) -> Result<Vec<AnalysisResult>> {
            self.0.list_analysis_results(job_execution_id).await
        }

        async fn save_article(&self, article: GeneratedArticle) -> Result<GeneratedArticle> {
            self.0.save_article(article).await
        }

        async fn article_slug_exists(&self, _slug: &str) -> Result<bool> {
            Ok(false)
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    async fn context(store: Arc<InMemoryStore>) -> JobContext {
        let execution = store
            .create_job_execution(None, JobName::AutomatedArticleGeneration)
            .await
            .unwrap();
        JobContext {
            job_execution_id: execution.id,
            orchestration_id: None,
            store,
        }
    }

    #[test]
    fn test_topic_rotation() {
        let job = ArticleGenerationJob::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            Arc::new(FixedGenerator),
        );
        assert_eq!(job.topic_for_day(1), Some("b"));
        assert_eq!(job.topic_for_day(3), Some("a"));

        let empty = ArticleGenerationJob::new(vec![], Arc::new(FixedGenerator));
        assert_eq!(empty.topic_for_day(10), None);
    }

    #[tokio::test]
    async fn test_article_is_stored_and_slug_deduplicated() {
        let store = Arc::new(InMemoryStore::new());
        let job = ArticleGenerationJob::new(vec!["Edge AI".to_string()], Arc::new(FixedGenerator));

        let first = job.execute(&context(store.clone()).await).await.unwrap();
        let second = job.execute(&context(store.clone()).await).await.unwrap();

        assert_eq!(first["article"]["slug"], "guide-edge-ai");
        assert_eq!(first["article"]["wordCount"], 4);
        assert_ne!(first["article"]["slug"], second["article"]["slug"]);
        assert_eq!(store.articles().len(), 2);
    }

    #[test]
    fn test_slug_candidates() {
        assert_eq!(slug_candidate("post", "20260101", 0), "post");
        assert_eq!(slug_candidate("post", "20260101", 1), "post-20260101");
        assert_eq!(slug_candidate("post", "20260101", 2), "post-20260101-2");
        assert_eq!(slug_candidate("post", "20260101", 7), "post-20260101-7");
    }

    #[tokio::test]
    async fn test_repeated_titles_get_distinct_slugs() {
        let store = Arc::new(InMemoryStore::new());
        let job = ArticleGenerationJob::new(vec!["Edge AI".to_string()], Arc::new(SameTitleGenerator));

        let mut slugs = Vec::new();
        for _ in 0..3 {
            let result = job.execute(&context(store.clone()).await).await.unwrap();
            slugs.push(result["article"]["slug"].as_str().unwrap().to_string());
        }

        assert_eq!(slugs[0], "same-title");
        assert!(slugs[1].starts_with("same-title-"));
        assert!(slugs[2].starts_with(&format!("{}-", slugs[1])));
        assert!(slugs[2].ends_with("-2"));
        assert_eq!(store.articles().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_conflict_moves_to_next_slug() {
        let store = Arc::new(StaleSlugCheckStore(InMemoryStore::new()));
        let job = ArticleGenerationJob::new(vec!["Edge AI".to_string()], Arc::new(SameTitleGenerator));

        let mut slugs = Vec::new();
        for _ in 0..2 {
            let execution = store
                .create_job_execution(None, JobName::AutomatedArticleGeneration)
                .await
                .unwrap();
            let ctx = JobContext {
                job_execution_id: execution.id,
                orchestration_id: None,
                store: store.clone(),
            };
            let result = job.execute(&ctx).await.unwrap();
            slugs.push(result["article"]["slug"].as_str().unwrap().to_string());
        }

        assert_eq!(slugs[0], "same-title");
        assert_ne!(slugs[0], slugs[1]);
        assert_eq!(store.0.articles().len(), 2);
    }
}
