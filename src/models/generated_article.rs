//! # Generated Article Model
//!
//! Blog articles written by the article generation job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArticle {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub tags: serde_json::Value,
    pub job_execution_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedArticle {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub async fn insert(pool: &PgPool, article: &GeneratedArticle) -> Result<GeneratedArticle, sqlx::Error> {
        sqlx::query_as::<_, GeneratedArticle>(
            r#"
            INSERT INTO maintenance_generated_articles
                (id, slug, title, excerpt, content, tags, job_execution_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, slug, title, excerpt, content, tags, job_execution_id, created_at
            "#,
        )
        .bind(article.id)
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.excerpt)
        .bind(&article.content)
        .bind(&article.tags)
        .bind(article.job_execution_id)
        .bind(article.created_at)
        .fetch_one(pool)
        .await
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM maintenance_generated_articles WHERE slug = $1)",
        )
        .bind(slug)
        .fetch_one(pool)
        .await?;
        Ok(exists.0)
    }
}

/// Lowercase, hyphen-separated slug built from a title
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(
            slugify("Smart Contract Security: A Checklist!"),
            "smart-contract-security-a-checklist"
        );
        assert_eq!(slugify("  --AI  & ML-- "), "ai-ml");
        assert_eq!(slugify("???"), "");
    }
}
