//! Shared fakes and builders for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use maintenance_core::bootstrap::{build_app_state, SystemComponents};
use maintenance_core::config::MaintenanceConfig;
use maintenance_core::database::InMemoryStore;
use maintenance_core::jobs::content::{ArticleDraft, ContentGenerator};
use maintenance_core::jobs::fetcher::{FetchedPage, PageFetcher};
use maintenance_core::orchestration::{DispatchMode, FailurePolicy, JobCallReply, JobInvoker};
use maintenance_core::web::AppState;
use maintenance_core::{JobName, MaintenanceError, Result};

pub const TEST_API_KEY: &str = "test-internal-key";
pub const TEST_SITE: &str = "https://site.test";

pub const GOOD_PAGE: &str = r#"<html>
  <head>
    <title>AI and Blockchain Consulting</title>
    <meta name="description" content="We help companies design, build and ship AI and blockchain products that last.">
    <link rel="canonical" href="https://site.test/">
  </head>
  <body><h1>Consulting</h1><p>Practical AI for real businesses.</p></body>
</html>"#;

/// What a scripted job call does
#[derive(Debug, Clone)]
pub enum Scripted {
    Succeed,
    ReturnFailure(String),
    Throw(String),
}

/// Job invoker that records call order and replays a script
#[derive(Default)]
pub struct RecordingInvoker {
    calls: Mutex<Vec<JobName>>,
    script: HashMap<JobName, Scripted>,
}

impl RecordingInvoker {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn with(mut self, job: JobName, behaviour: Scripted) -> Self {
        self.script.insert(job, behaviour);
        self
    }

    pub fn calls(&self) -> Vec<JobName> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl JobInvoker for RecordingInvoker {
    async fn invoke(&self, job: JobName, _orchestration_id: Uuid) -> Result<JobCallReply> {
        self.calls.lock().push(job);
        match self.script.get(&job).cloned().unwrap_or(Scripted::Succeed) {
            Scripted::Succeed => Ok(JobCallReply {
                status_code: 200,
                body: json!({ "success": true, "job": job.as_str() }),
            }),
            Scripted::ReturnFailure(error) => Ok(JobCallReply {
                status_code: 500,
                body: json!({ "success": false, "error": error }),
            }),
            Scripted::Throw(message) => Err(MaintenanceError::job_transport(job.as_str(), message)),
        }
    }
}

/// Canned page responses; unknown URLs get [`GOOD_PAGE`]
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, std::result::Result<(u16, String), String>>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Ok((status, body.to_string())));
        self
    }

    pub fn unreachable(mut self, url: &str, error: &str) -> Self {
        self.responses.insert(url.to_string(), Err(error.to_string()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.requested.lock().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok((status_code, body))) => Ok(FetchedPage {
                url: url.to_string(),
                status_code: *status_code,
                body: body.clone(),
            }),
            Some(Err(error)) => Err(MaintenanceError::Crawl(error.clone())),
            None => Ok(FetchedPage {
                url: url.to_string(),
                status_code: 200,
                body: GOOD_PAGE.to_string(),
            }),
        }
    }
}

pub struct FakeGenerator;

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate_article(&self, topic: &str) -> Result<ArticleDraft> {
        Ok(ArticleDraft {
            title: format!("Field Notes: {topic}"),
            excerpt: "What we learned".to_string(),
            content: "A short but complete article body.".to_string(),
            tags: vec!["ai".to_string(), "blockchain".to_string()],
        })
    }
}

/// Defaults with a known key, a fake site and no pacing
pub fn test_config() -> MaintenanceConfig {
    let mut config = MaintenanceConfig::default();
    config.auth.internal_api_key = TEST_API_KEY.to_string();
    config.crawl.site_url = TEST_SITE.to_string();
    config.crawl.inter_target_delay_ms = 0;
    config.orchestration.inter_job_delay_ms = 0;
    config.orchestration.dispatch = DispatchMode::Local;
    config.orchestration.failure_policy = FailurePolicy::ContinueAll;
    config.knowledge_base.blog_directory = "does/not/exist".into();
    config
}

/// App state over an in-memory store and fake collaborators
pub fn test_state(
    config: MaintenanceConfig,
    store: Arc<InMemoryStore>,
    invoker: Option<Arc<dyn JobInvoker>>,
) -> AppState {
    let components = SystemComponents {
        store,
        fetcher: Arc::new(FakeFetcher::new()),
        content_generator: Arc::new(FakeGenerator),
        invoker,
    };
    build_app_state(config, components).expect("test app state")
}
