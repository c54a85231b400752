//! # Website Crawling Analysis
//!
//! Fetches the configured site pages one at a time, in order, pausing between
//! targets. Each page's visible text is extracted and summarised; the whole
//! crawl is recorded as a single `website_crawl` analysis result whose score is
//! the share of pages that loaded.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::constants::{analysis_types, system, JobName};
use crate::error::{MaintenanceError, Result};
use crate::jobs::fetcher::PageFetcher;
use crate::jobs::html::{excerpt, extract_visible_text};
use crate::jobs::{JobContext, MaintenanceJob};
use crate::models::{AnalysisResult, NewAnalysisResult};
use crate::orchestration::pacing::Pacer;

/// Percentage of targets fetched successfully, rounded to the nearest integer.
///
/// `round((total - failed) / total * 100)`; an empty crawl scores 0.
pub fn crawl_score(total: usize, failed: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let succeeded = total.saturating_sub(failed);
    (succeeded as f64 / total as f64 * 100.0).round() as i32
}

/// Per-page crawl record stored in the analysis raw data
#[derive(Debug, Clone, PartialEq)]
enum PageReport {
    Loaded {
        url: String,
        status_code: u16,
        word_count: usize,
        excerpt: String,
    },
    Failed {
        url: String,
        status_code: Option<u16>,
        error: String,
    },
}

impl PageReport {
    fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn issue(&self) -> Option<String> {
        match self {
            Self::Failed { url, error, .. } => Some(format!("{url}: {error}")),
            Self::Loaded { .. } => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Loaded {
                url,
                status_code,
                word_count,
                excerpt,
            } => json!({
                "url": url,
                "success": true,
                "statusCode": status_code,
                "wordCount": word_count,
                "excerpt": excerpt,
            }),
            Self::Failed {
                url,
                status_code,
                error,
            } => json!({
                "url": url,
                "success": false,
                "statusCode": status_code,
                "error": error,
            }),
        }
    }
}

pub struct WebsiteCrawlJob {
    site_url: String,
    targets: Vec<String>,
    fetcher: Arc<dyn PageFetcher>,
    pacer: Pacer,
    excerpt_length: usize,
}

impl WebsiteCrawlJob {
    pub fn new(
        site_url: impl Into<String>,
        targets: Vec<String>,
        fetcher: Arc<dyn PageFetcher>,
        pacer: Pacer,
        excerpt_length: usize,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            targets,
            fetcher,
            pacer,
            excerpt_length,
        }
    }

    async fn crawl_page(&self, url: &str) -> Result<PageReport> {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                let error = match e {
                    MaintenanceError::Crawl(message) => message,
                    other => other.to_string(),
                };
                return Ok(PageReport::Failed {
                    url: url.to_string(),
                    status_code: None,
                    error,
                });
            }
        };

        if !page.is_success() {
            return Ok(PageReport::Failed {
                url: url.to_string(),
                status_code: Some(page.status_code),
                error: format!("HTTP {}", page.status_code),
            });
        }

        let text = extract_visible_text(&page.body)?;
        Ok(PageReport::Loaded {
            url: url.to_string(),
            status_code: page.status_code,
            word_count: text.split_whitespace().count(),
            excerpt: excerpt(&text, self.excerpt_length),
        })
    }
}

#[async_trait]
impl MaintenanceJob for WebsiteCrawlJob {
    fn name(&self) -> JobName {
        JobName::WebsiteCrawlingAnalysis
    }

    async fn execute(&self, ctx: &JobContext) -> Result<Value> {
        if self.targets.is_empty() {
            return Err(MaintenanceError::Validation(
                "No crawl targets configured".to_string(),
            ));
        }

        let mut pages = Vec::with_capacity(self.targets.len());
        for (index, url) in self.targets.iter().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }
            let report = self.crawl_page(url).await?;
            match &report {
                PageReport::Loaded { word_count, .. } => {
                    debug!(url = %url, word_count = word_count, "Crawled page")
                }
                PageReport::Failed { error, .. } => {
                    warn!(url = %url, error = %error, "Crawl target failed")
                }
            }
            pages.push(report);
        }

        let total = pages.len();
        let failed = pages.iter().filter(|p| p.is_failure()).count();
        let score = crawl_score(total, failed);
        let issues: Vec<String> = pages.iter().filter_map(PageReport::issue).collect();
        let recommendations = if failed > 0 {
            vec![system::CRAWL_FAILURE_RECOMMENDATION.to_string()]
        } else {
            Vec::new()
        };

        let analysis = ctx
            .store
            .record_analysis_result(AnalysisResult::from_new(
                NewAnalysisResult {
                    url: self.site_url.clone(),
                    analysis_type: analysis_types::WEBSITE_CRAWL.to_string(),
                    score,
                    issues: issues.clone(),
                    recommendations,
                    raw_data: json!({
                        "pagesCrawled": total - failed,
                        "failedPages": failed,
                        "pages": pages.iter().map(PageReport::to_json).collect::<Vec<_>>(),
                    }),
                },
                ctx.job_execution_id,
            ))
            .await?;

        info!(score = score, total = total, failed = failed, "Website crawl analysed");

        if failed == total {
            return Err(MaintenanceError::job_failed(
                JobName::WebsiteCrawlingAnalysis.as_str(),
                format!("All {total} crawl targets failed"),
            ));
        }

        Ok(json!({
            "analysisResultId": analysis.id,
            "score": score,
            "pagesCrawled": total - failed,
            "failedPages": failed,
            "issues": issues,
        }))
    }
}
