//! # SEO Optimization
//!
//! On-page SEO checks over the main site pages. Each fetched page starts at
//! 100 and loses a fixed penalty per issue; the job's score is the mean over
//! the pages that loaded. Findings are stored as one `seo` analysis result.

use async_trait::async_trait;
use scraper::Html;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::constants::{analysis_types, JobName};
use crate::error::{MaintenanceError, Result};
use crate::jobs::fetcher::PageFetcher;
use crate::jobs::html::selector;
use crate::jobs::{JobContext, MaintenanceJob};
use crate::models::{AnalysisResult, NewAnalysisResult};
use crate::orchestration::pacing::Pacer;

const TITLE_LENGTH: (usize, usize) = (10, 60);
const DESCRIPTION_LENGTH: (usize, usize) = (50, 160);
const ISSUE_PENALTY: i32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeoIssue {
    MissingTitle,
    TitleLength(usize),
    MissingMetaDescription,
    MetaDescriptionLength(usize),
    HeadingCount(usize),
    ImagesWithoutAlt(usize),
    MissingCanonical,
}

impl SeoIssue {
    pub fn message(&self) -> String {
        match self {
            Self::MissingTitle => "Missing <title> tag".to_string(),
            Self::TitleLength(len) => format!(
                "Title is {len} characters (expected {}-{})",
                TITLE_LENGTH.0, TITLE_LENGTH.1
            ),
            Self::MissingMetaDescription => "Missing meta description".to_string(),
            Self::MetaDescriptionLength(len) => format!(
                "Meta description is {len} characters (expected {}-{})",
                DESCRIPTION_LENGTH.0, DESCRIPTION_LENGTH.1
            ),
            Self::HeadingCount(count) => format!("Found {count} <h1> elements (expected exactly 1)"),
            Self::ImagesWithoutAlt(count) => format!("{count} image(s) without alt text"),
            Self::MissingCanonical => "Missing canonical link".to_string(),
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::MissingTitle | Self::TitleLength(_) => {
                "Give every page a descriptive title between 10 and 60 characters"
            }
            Self::MissingMetaDescription | Self::MetaDescriptionLength(_) => {
                "Write a meta description between 50 and 160 characters for each page"
            }
            Self::HeadingCount(_) => "Use exactly one <h1> heading per page",
            Self::ImagesWithoutAlt(_) => "Add descriptive alt text to all images",
            Self::MissingCanonical => "Declare a canonical URL with <link rel=\"canonical\">",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSeoReport {
    pub url: String,
    pub issues: Vec<SeoIssue>,
}

impl PageSeoReport {
    pub fn score(&self) -> i32 {
        (100 - ISSUE_PENALTY * self.issues.len() as i32).max(0)
    }
}

fn outside(len: usize, bounds: (usize, usize)) -> bool {
    len < bounds.0 || len > bounds.1
}

/// Run the on-page checks against one HTML document
pub fn analyse_page(url: &str, html: &str) -> Result<PageSeoReport> {
    let document = Html::parse_document(html);
    let mut issues = Vec::new();

    let title = document
        .select(&selector("title")?)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());
    match title {
        None => issues.push(SeoIssue::MissingTitle),
        Some(t) if outside(t.chars().count(), TITLE_LENGTH) => {
            issues.push(SeoIssue::TitleLength(t.chars().count()))
        }
        Some(_) => {}
    }

    let description = document
        .select(&selector(r#"meta[name="description"]"#)?)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|d| !d.is_empty());
    match description {
        None => issues.push(SeoIssue::MissingMetaDescription),
        Some(d) if outside(d.chars().count(), DESCRIPTION_LENGTH) => {
            issues.push(SeoIssue::MetaDescriptionLength(d.chars().count()))
        }
        Some(_) => {}
    }

    let headings = document.select(&selector("h1")?).count();
    if headings != 1 {
        issues.push(SeoIssue::HeadingCount(headings));
    }

    let missing_alt = document
        .select(&selector("img")?)
        .filter(|img| img.value().attr("alt").map_or(true, |alt| alt.trim().is_empty()))
        .count();
    if missing_alt > 0 {
        issues.push(SeoIssue::ImagesWithoutAlt(missing_alt));
    }

    if document
        .select(&selector(r#"link[rel="canonical"]"#)?)
        .next()
        .is_none()
    {
        issues.push(SeoIssue::MissingCanonical);
    }

    Ok(PageSeoReport {
        url: url.to_string(),
        issues,
    })
}

pub struct SeoOptimizationJob {
    site_url: String,
    targets: Vec<String>,
    fetcher: Arc<dyn PageFetcher>,
    pacer: Pacer,
}

impl SeoOptimizationJob {
    pub fn new(
        site_url: impl Into<String>,
        targets: Vec<String>,
        fetcher: Arc<dyn PageFetcher>,
        pacer: Pacer,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            targets,
            fetcher,
            pacer,
        }
    }
}

#[async_trait]
impl MaintenanceJob for SeoOptimizationJob {
    fn name(&self) -> JobName {
        JobName::SeoOptimization
    }

    async fn execute(&self, ctx: &JobContext) -> Result<Value> {
        if self.targets.is_empty() {
            return Err(MaintenanceError::Validation(
                "No SEO target pages configured".to_string(),
            ));
        }

        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for (index, url) in self.targets.iter().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }
            match self.fetcher.fetch(url).await {
                Ok(page) if page.is_success() => {
                    let report = analyse_page(url, &page.body)?;
                    debug!(url = %url, issues = report.issues.len(), "SEO page analysed");
                    reports.push(report);
                }
                Ok(page) => failures.push(format!("{url}: HTTP {}", page.status_code)),
                Err(e) => {
                    warn!(url = %url, error = %e, "SEO target could not be fetched");
                    failures.push(format!("{url}: {e}"));
                }
            }
        }

        let score = if reports.is_empty() {
            0
        } else {
            let total: i32 = reports.iter().map(PageSeoReport::score).sum();
            (total as f64 / reports.len() as f64).round() as i32
        };

        let mut issues = failures.clone();
        let mut recommendations: Vec<String> = Vec::new();
        for report in &reports {
            for issue in &report.issues {
                issues.push(format!("{}: {}", report.url, issue.message()));
                let recommendation = issue.recommendation().to_string();
                if !recommendations.contains(&recommendation) {
                    recommendations.push(recommendation);
                }
            }
        }

        let pages: Vec<Value> = reports
            .iter()
            .map(|r| {
                json!({
                    "url": r.url,
                    "score": r.score(),
                    "issues": r.issues.iter().map(SeoIssue::message).collect::<Vec<_>>(),
                })
            })
            .collect();

        let analysis = ctx
            .store
            .record_analysis_result(AnalysisResult::from_new(
                NewAnalysisResult {
                    url: self.site_url.clone(),
                    analysis_type: analysis_types::SEO.to_string(),
                    score,
                    issues: issues.clone(),
                    recommendations: recommendations.clone(),
                    raw_data: json!({
                        "pagesAnalyzed": reports.len(),
                        "failedPages": failures,
                        "pages": pages,
                    }),
                },
                ctx.job_execution_id,
            ))
            .await?;

        info!(score = score, pages = reports.len(), "SEO analysis recorded");

        if reports.is_empty() {
            return Err(MaintenanceError::job_failed(
                JobName::SeoOptimization.as_str(),
                format!("None of the {} SEO target pages could be fetched", self.targets.len()),
            ));
        }

        Ok(json!({
            "analysisResultId": analysis.id,
            "score": score,
            "pagesAnalyzed": reports.len(),
            "issuesFound": issues.len(),
            "recommendations": recommendations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_PAGE: &str = r#"
        <html>
          <head>
            <title>AI and Blockchain Consulting</title>
            <meta name="description" content="We help companies design, build and ship AI and blockchain products that last.">
            <link rel="canonical" href="https://example.com/">
          </head>
          <body>
            <h1>Consulting</h1>
            <img src="/team.png" alt="Our team">
          </body>
        </html>"#;

    #[test]
    fn test_well_formed_page_has_no_issues() {
        let report = analyse_page("https://example.com/", GOOD_PAGE).unwrap();
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.score(), 100);
    }

    #[test]
    fn test_each_issue_costs_fifteen_points() {
        let html = r#"<html><head><title>Hi</title></head>
            <body><h1>A</h1><h1>B</h1><img src="x.png"><img src="y.png" alt=""></body></html>"#;
        let report = analyse_page("https://example.com/blog", html).unwrap();

        assert_eq!(
            report.issues,
            vec![
                SeoIssue::TitleLength(2),
                SeoIssue::MissingMetaDescription,
                SeoIssue::HeadingCount(2),
                SeoIssue::ImagesWithoutAlt(2),
                SeoIssue::MissingCanonical,
            ]
        );
        assert_eq!(report.score(), 25);
    }

    #[test]
    fn test_score_is_floored_at_zero() {
        let report = PageSeoReport {
            url: "u".to_string(),
            issues: vec![SeoIssue::MissingCanonical; 8],
        };
        assert_eq!(report.score(), 0);
    }
}
