//! # System Bootstrap
//!
//! Wires configuration and collaborators into the [`AppState`] served by the
//! web layer. The binary uses [`SystemComponents::from_config`]; tests swap in
//! fakes for the fetcher, the content generator or the job invoker.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::MaintenanceConfig;
use crate::database::MaintenanceStore;
use crate::error::Result;
use crate::jobs::article_generation::ArticleGenerationJob;
use crate::jobs::content::{ContentGenerator, OpenAiContentGenerator};
use crate::jobs::fetcher::{HttpPageFetcher, PageFetcher};
use crate::jobs::knowledge_base::KnowledgeBaseJob;
use crate::jobs::seo_optimization::SeoOptimizationJob;
use crate::jobs::website_crawl::WebsiteCrawlJob;
use crate::jobs::{JobRegistry, JobRunner};
use crate::orchestration::{
    DispatchMode, HttpJobInvoker, JobInvoker, LocalJobInvoker, MaintenanceOrchestrator, Pacer,
};
use crate::web::AppState;

/// External collaborators of the service
pub struct SystemComponents {
    pub store: Arc<dyn MaintenanceStore>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub content_generator: Arc<dyn ContentGenerator>,
    /// Overrides the invoker chosen by `orchestration.dispatch`
    pub invoker: Option<Arc<dyn JobInvoker>>,
}

impl SystemComponents {
    /// Production collaborators: reqwest page fetcher and OpenAI generator
    pub fn from_config(config: &MaintenanceConfig, store: Arc<dyn MaintenanceStore>) -> Result<Self> {
        let fetcher = HttpPageFetcher::new(Duration::from_millis(config.crawl.fetch_timeout_ms))?;
        let content_generator = OpenAiContentGenerator::new(&config.content)?;

        Ok(Self {
            store,
            fetcher: Arc::new(fetcher),
            content_generator: Arc::new(content_generator),
            invoker: None,
        })
    }
}

/// Registry holding the four maintenance jobs configured from `config`
pub fn build_job_registry(
    config: &MaintenanceConfig,
    components: &SystemComponents,
) -> Result<JobRegistry> {
    let target_pacer = Pacer::new(config.inter_target_delay());

    Ok(JobRegistry::new()
        .with(Arc::new(ArticleGenerationJob::new(
            config.content.topics.clone(),
            components.content_generator.clone(),
        )))
        .with(Arc::new(WebsiteCrawlJob::new(
            config.crawl.site_url.clone(),
            config.crawl_targets()?,
            components.fetcher.clone(),
            target_pacer,
            config.crawl.excerpt_length,
        )))
        .with(Arc::new(KnowledgeBaseJob::new(
            config.knowledge_base.blog_directory.clone(),
            config.knowledge_base.service_pages.clone(),
        )))
        .with(Arc::new(SeoOptimizationJob::new(
            config.crawl.site_url.clone(),
            config.seo_targets()?,
            components.fetcher.clone(),
            target_pacer,
        ))))
}

pub fn build_app_state(config: MaintenanceConfig, components: SystemComponents) -> Result<AppState> {
    let registry = build_job_registry(&config, &components)?;
    let job_runner = Arc::new(JobRunner::new(components.store.clone(), registry));

    let invoker: Arc<dyn JobInvoker> = match components.invoker {
        Some(invoker) => invoker,
        None => match config.orchestration.dispatch {
            DispatchMode::Http => Arc::new(HttpJobInvoker::new(
                config.orchestration_base_url()?,
                config.auth.internal_api_key.clone(),
                Duration::from_millis(config.orchestration.job_request_timeout_ms),
            )?),
            DispatchMode::Local => Arc::new(LocalJobInvoker::new(job_runner.clone())),
        },
    };

    let orchestrator = MaintenanceOrchestrator::new(
        components.store.clone(),
        invoker,
        config.orchestration.failure_policy,
        Pacer::new(config.inter_job_delay()),
    );

    info!(
        dispatch = ?config.orchestration.dispatch,
        failure_policy = ?config.orchestration.failure_policy,
        inter_job_delay_ms = config.orchestration.inter_job_delay_ms,
        "Maintenance system assembled"
    );

    Ok(AppState {
        config: Arc::new(config),
        store: components.store,
        orchestrator: Arc::new(orchestrator),
        job_runner,
    })
}
