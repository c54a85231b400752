//! # Configuration
//!
//! Layered configuration for the maintenance service: built-in defaults, an
//! optional TOML file, `MAINTENANCE_*` environment variables, and finally the
//! well-known deployment variables (`INTERNAL_API_KEY`, `DATABASE_URL`,
//! `VERCEL_URL`, `OPENAI_API_KEY`, ...).

use crate::error::{MaintenanceError, Result};
use crate::orchestration::types::{DispatchMode, FailurePolicy};
use crate::constants::system;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default location of the optional configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/maintenance.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub orchestration: OrchestrationConfig,
    pub crawl: CrawlConfig,
    pub seo: SeoConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Upper bound for any inbound request. A full run sleeps for at least
    /// three inter-job delays, so this must stay well above that.
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_ms: 15 * 60 * 1000,
        }
    }
}

/// Shared-secret authentication for internal endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Empty means no credential is accepted
    pub internal_api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/maintenance_development".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 10,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Explicit base URL for sibling job calls; takes precedence over `vercel_url`
    pub base_url: String,
    /// Deployment host name as exposed by `VERCEL_URL` (no scheme)
    pub vercel_url: String,
    pub dispatch: DispatchMode,
    pub failure_policy: FailurePolicy,
    pub inter_job_delay_ms: u64,
    /// Timeout for a single job call; 0 leaves the HTTP client default in place
    pub job_request_timeout_ms: u64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            vercel_url: String::new(),
            dispatch: DispatchMode::Http,
            failure_policy: FailurePolicy::ContinueAll,
            inter_job_delay_ms: system::DEFAULT_INTER_JOB_DELAY_MS,
            job_request_timeout_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub site_url: String,
    pub target_paths: Vec<String>,
    pub inter_target_delay_ms: u64,
    pub fetch_timeout_ms: u64,
    /// Number of characters of extracted text kept per page in the raw payload
    pub excerpt_length: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:3000".to_string(),
            target_paths: system::DEFAULT_CRAWL_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            inter_target_delay_ms: system::DEFAULT_INTER_TARGET_DELAY_MS,
            fetch_timeout_ms: 30_000,
            excerpt_length: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    pub target_paths: Vec<String>,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            target_paths: vec!["/".to_string(), "/services".to_string(), "/blog".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    pub blog_directory: PathBuf,
    pub service_pages: Vec<String>,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            blog_directory: PathBuf::from("content/blog"),
            service_pages: vec![
                "AI Strategy Consulting".to_string(),
                "Custom AI Development".to_string(),
                "Blockchain Development".to_string(),
                "Smart Contract Audits".to_string(),
                "Web3 Integration".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    /// Accepted for parity with the deployment environment; no job uses it
    pub replicate_api_token: String,
    pub topics: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            replicate_api_token: String::new(),
            topics: vec![
                "How AI agents are changing customer support".to_string(),
                "Choosing between public and private blockchains".to_string(),
                "Retrieval-augmented generation for internal knowledge".to_string(),
                "Smart contract security checklists".to_string(),
                "Measuring ROI of machine learning projects".to_string(),
                "Tokenization of real-world assets".to_string(),
            ],
        }
    }
}

impl MaintenanceConfig {
    /// Load configuration from `MAINTENANCE_CONFIG` or the default file path
    pub fn load() -> Result<Self> {
        let path = std::env::var("MAINTENANCE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(Some(&path))
    }

    /// Load configuration layering defaults, an optional file and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&MaintenanceConfig::default())?);

        if let Some(path) = path {
            debug!(path = %path.display(), "Reading maintenance configuration file");
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let mut config: MaintenanceConfig = builder
            .add_source(
                config::Environment::with_prefix("MAINTENANCE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus the deployment environment variables, without any file
    pub fn from_env() -> Result<Self> {
        Self::load_from(None)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var("INTERNAL_API_KEY") {
            self.auth.internal_api_key = key;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(host) = std::env::var("VERCEL_URL") {
            self.orchestration.vercel_url = host;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.content.openai_api_key = key;
        }
        if let Ok(token) = std::env::var("REPLICATE_API_TOKEN") {
            self.content.replicate_api_token = token;
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Ok(site) = std::env::var("SITE_URL") {
            self.crawl.site_url = site;
        }
        if let Ok(delay) = std::env::var("MAINTENANCE_INTER_JOB_DELAY_MS") {
            self.orchestration.inter_job_delay_ms = delay.parse().map_err(|e| {
                MaintenanceError::Configuration(format!("Invalid inter_job_delay_ms: {e}"))
            })?;
        }
        Ok(())
    }

    /// Check the loaded values for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.crawl.target_paths.is_empty() {
            return Err(MaintenanceError::Configuration(
                "crawl.target_paths must contain at least one path".to_string(),
            ));
        }
        if self.seo.target_paths.is_empty() {
            return Err(MaintenanceError::Configuration(
                "seo.target_paths must contain at least one path".to_string(),
            ));
        }
        Url::parse(&self.crawl.site_url).map_err(|e| {
            MaintenanceError::Configuration(format!(
                "Invalid crawl.site_url '{}': {e}",
                self.crawl.site_url
            ))
        })?;
        self.orchestration_base_url()?;
        Ok(())
    }

    /// Base URL used to reach the sibling job endpoints
    ///
    /// Resolution order: explicit `orchestration.base_url`, then
    /// `https://$VERCEL_URL`, then the local bind address.
    pub fn orchestration_base_url(&self) -> Result<Url> {
        let raw = if !self.orchestration.base_url.is_empty() {
            self.orchestration.base_url.clone()
        } else if !self.orchestration.vercel_url.is_empty() {
            format!("https://{}", self.orchestration.vercel_url)
        } else {
            format!(
                "http://{}",
                self.server.bind_address.replace("0.0.0.0", "127.0.0.1")
            )
        };

        Url::parse(&raw).map_err(|e| {
            MaintenanceError::Configuration(format!("Invalid orchestration base URL '{raw}': {e}"))
        })
    }

    /// Absolute URLs of the crawl targets, in configured order
    pub fn crawl_targets(&self) -> Result<Vec<String>> {
        join_paths(&self.crawl.site_url, &self.crawl.target_paths)
    }

    /// Absolute URLs of the pages inspected by the SEO job
    pub fn seo_targets(&self) -> Result<Vec<String>> {
        join_paths(&self.crawl.site_url, &self.seo.target_paths)
    }

    pub fn inter_job_delay(&self) -> Duration {
        Duration::from_millis(self.orchestration.inter_job_delay_ms)
    }

    pub fn inter_target_delay(&self) -> Duration {
        Duration::from_millis(self.crawl.inter_target_delay_ms)
    }

    /// JSON view of the configuration with secrets masked
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        mask(&mut value, &["auth", "internal_api_key"]);
        mask(&mut value, &["database", "url"]);
        mask(&mut value, &["content", "openai_api_key"]);
        mask(&mut value, &["content", "replicate_api_token"]);
        value
    }
}

fn join_paths(site_url: &str, paths: &[String]) -> Result<Vec<String>> {
    let base = Url::parse(site_url).map_err(|e| {
        MaintenanceError::Configuration(format!("Invalid site URL '{site_url}': {e}"))
    })?;

    paths
        .iter()
        .map(|path| {
            base.join(path).map(|u| u.to_string()).map_err(|e| {
                MaintenanceError::Configuration(format!("Invalid target path '{path}': {e}"))
            })
        })
        .collect()
}

fn mask(value: &mut serde_json::Value, path: &[&str]) {
    let mut current = value;
    for key in &path[..path.len() - 1] {
        match current.get_mut(*key) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(field) = current.get_mut(path[path.len() - 1]) {
        if field.as_str().is_some_and(|s| !s.is_empty()) {
            *field = serde_json::Value::String("***".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = MaintenanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.inter_job_delay(), Duration::from_secs(5));
        assert_eq!(config.inter_target_delay(), Duration::from_secs(2));
        assert_eq!(config.orchestration.failure_policy, FailurePolicy::ContinueAll);
    }

    #[test]
    fn test_base_url_resolution_order() {
        let mut config = MaintenanceConfig::default();
        assert_eq!(
            config.orchestration_base_url().unwrap().as_str(),
            "http://127.0.0.1:3000/"
        );

        config.orchestration.vercel_url = "my-site.vercel.app".to_string();
        assert_eq!(
            config.orchestration_base_url().unwrap().as_str(),
            "https://my-site.vercel.app/"
        );

        config.orchestration.base_url = "http://internal:8080".to_string();
        assert_eq!(
            config.orchestration_base_url().unwrap().as_str(),
            "http://internal:8080/"
        );
    }

    #[test]
    fn test_crawl_targets_keep_configured_order() {
        let mut config = MaintenanceConfig::default();
        config.crawl.site_url = "https://example.com".to_string();
        config.crawl.target_paths = vec!["/blog".to_string(), "/".to_string()];

        let targets = config.crawl_targets().unwrap();
        assert_eq!(targets, vec!["https://example.com/blog", "https://example.com/"]);
    }

    #[test]
    fn test_empty_target_list_is_rejected() {
        let mut config = MaintenanceConfig::default();
        config.crawl.target_paths.clear();
        assert!(matches!(
            config.validate(),
            Err(MaintenanceError::Configuration(_))
        ));
    }

    #[test]
    fn test_sanitized_masks_secrets() {
        let mut config = MaintenanceConfig::default();
        config.auth.internal_api_key = "super-secret".to_string();

        let sanitized = config.sanitized();
        assert_eq!(sanitized["auth"]["internal_api_key"], "***");
        assert_eq!(sanitized["content"]["openai_api_key"], "");
        assert!(!sanitized.to_string().contains("super-secret"));
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[orchestration]
failure_policy = "stop_on_first_failure"
inter_job_delay_ms = 250

[crawl]
site_url = "https://example.org"
target_paths = ["/", "/about"]
"#
        )
        .unwrap();

        let config = MaintenanceConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(
            config.orchestration.failure_policy,
            FailurePolicy::StopOnFirstFailure
        );
        assert_eq!(config.orchestration.inter_job_delay_ms, 250);
        assert_eq!(config.crawl.target_paths.len(), 2);
        // untouched sections keep their defaults
        assert_eq!(config.seo.target_paths.len(), 3);
    }
}
