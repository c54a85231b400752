//! # Content Generation
//!
//! Article drafting is delegated to an external language model. The
//! [`ContentGenerator`] trait is the seam; [`OpenAiContentGenerator`] talks to
//! an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ContentConfig;
use crate::constants::system;
use crate::error::{MaintenanceError, Result};

/// Article as drafted by the model, before it is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ArticleDraft {
    fn validate(self) -> Result<Self> {
        if self.title.trim().is_empty() {
            return Err(MaintenanceError::ContentGeneration(
                "Generated article has an empty title".to_string(),
            ));
        }
        if self.content.trim().is_empty() {
            return Err(MaintenanceError::ContentGeneration(
                "Generated article has no content".to_string(),
            ));
        }
        Ok(self)
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_article(&self, topic: &str) -> Result<ArticleDraft>;
}

#[derive(Debug, Clone)]
pub struct OpenAiContentGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are a senior technical writer for a consultancy specialising in artificial intelligence and blockchain. \
Write practical, accurate articles for business and engineering readers. \
Respond with a JSON object with the keys: title, excerpt, content (markdown, 800-1200 words), tags (array of 3-5 strings).";

impl OpenAiContentGenerator {
    pub fn new(config: &ContentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .user_agent(system::USER_AGENT)
            .build()
            .map_err(|e| {
                MaintenanceError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ContentGenerator for OpenAiContentGenerator {
    async fn generate_article(&self, topic: &str) -> Result<ArticleDraft> {
        if self.api_key.is_empty() {
            return Err(MaintenanceError::Configuration(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }

        debug!(model = %self.model, topic = %topic, "Requesting article draft");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "temperature": 0.7,
                "response_format": { "type": "json_object" },
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": format!("Write a blog article about: {topic}") }
                ]
            }))
            .send()
            .await
            .map_err(|e| MaintenanceError::ContentGeneration(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MaintenanceError::ContentGeneration(format!(
                "Provider returned HTTP {status}: {text}"
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            MaintenanceError::ContentGeneration(format!("Invalid provider response: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                MaintenanceError::ContentGeneration("Provider returned no choices".to_string())
            })?;

        let draft = parse_article_draft(&content)?;
        info!(title = %draft.title, "Article draft generated");
        Ok(draft)
    }
}

/// Parse the model's JSON answer, tolerating a surrounding markdown fence
pub fn parse_article_draft(raw: &str) -> Result<ArticleDraft> {
    let trimmed = raw.trim();
    let json_text = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);

    let draft: ArticleDraft = serde_json::from_str(json_text.trim()).map_err(|e| {
        MaintenanceError::ContentGeneration(format!("Article draft is not valid JSON: {e}"))
    })?;
    draft.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json_draft() {
        let draft = parse_article_draft(
            r#"{"title":"RAG in Practice","excerpt":"How it works","content":"Body text","tags":["ai"]}"#,
        )
        .unwrap();
        assert_eq!(draft.title, "RAG in Practice");
        assert_eq!(draft.tags, vec!["ai"]);
    }

    #[test]
    fn test_parse_fenced_draft_without_tags() {
        let raw = "```json\n{\"title\":\"T\",\"excerpt\":\"E\",\"content\":\"C\"}\n```";
        let draft = parse_article_draft(raw).unwrap();
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let err = parse_article_draft(r#"{"title":"T","excerpt":"E","content":"  "}"#).unwrap_err();
        assert!(matches!(err, MaintenanceError::ContentGeneration(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let generator = OpenAiContentGenerator::new(&ContentConfig::default()).unwrap();
        let err = generator.generate_article("anything").await.unwrap_err();
        assert!(matches!(err, MaintenanceError::Configuration(_)));
    }
}
