//! Website crawl job: scoring, issue reporting, pacing and persistence.

mod common;

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use common::{FakeFetcher, TEST_SITE};
use maintenance_core::constants::system::CRAWL_FAILURE_RECOMMENDATION;
use maintenance_core::database::InMemoryStore;
use maintenance_core::jobs::website_crawl::{crawl_score, WebsiteCrawlJob};
use maintenance_core::jobs::{JobRegistry, JobRunner};
use maintenance_core::orchestration::Pacer;
use maintenance_core::{ExecutionStatus, JobName};

fn targets(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{TEST_SITE}/page-{i}")).collect()
}

fn runner(store: &Arc<InMemoryStore>, fetcher: FakeFetcher, targets: Vec<String>, pacer: Pacer) -> JobRunner {
    let job = WebsiteCrawlJob::new(TEST_SITE, targets, Arc::new(fetcher), pacer, 500);
    JobRunner::new(store.clone(), JobRegistry::new().with(Arc::new(job)))
}

#[tokio::test]
async fn test_partial_failures_lower_the_score() {
    let store = Arc::new(InMemoryStore::new());
    let urls = targets(5);
    let fetcher = FakeFetcher::new()
        .unreachable(&urls[1], "connection reset by peer")
        .page(&urls[3], 404, "<html><body>Not found</body></html>");

    let outcome = runner(&store, fetcher, urls.clone(), Pacer::none())
        .run(JobName::WebsiteCrawlingAnalysis, None)
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.result["score"], 60);
    assert_eq!(outcome.result["pagesCrawled"], 3);
    assert_eq!(outcome.result["failedPages"], 2);

    let results = store.analysis_results();
    assert_eq!(results.len(), 1);
    let analysis = &results[0];
    assert_eq!(analysis.analysis_type, "website_crawl");
    assert_eq!(analysis.score, 60);
    assert_eq!(analysis.job_execution_id, outcome.job_execution_id);

    let issues: Vec<String> = serde_json::from_value(analysis.issues.clone()).unwrap();
    assert_eq!(
        issues,
        vec![
            format!("{}: connection reset by peer", urls[1]),
            format!("{}: HTTP 404", urls[3]),
        ]
    );
    assert_eq!(
        analysis.recommendations,
        serde_json::json!([CRAWL_FAILURE_RECOMMENDATION])
    );

    let pages = analysis.raw_data["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 5);
    assert_eq!(pages[0]["success"], true);
    assert!(pages[0]["excerpt"]
        .as_str()
        .unwrap()
        .contains("Practical AI for real businesses."));
    assert_eq!(pages[3]["statusCode"], 404);
}

#[tokio::test]
async fn test_clean_crawl_has_no_recommendations() {
    let store = Arc::new(InMemoryStore::new());
    runner(&store, FakeFetcher::new(), targets(3), Pacer::none())
        .run(JobName::WebsiteCrawlingAnalysis, None)
        .await
        .unwrap();

    let analysis = &store.analysis_results()[0];
    assert_eq!(analysis.score, 100);
    assert_eq!(analysis.issues, serde_json::json!([]));
    assert_eq!(analysis.recommendations, serde_json::json!([]));
}

#[tokio::test]
async fn test_all_targets_failing_fails_the_job_but_keeps_the_analysis() {
    let store = Arc::new(InMemoryStore::new());
    let urls = targets(2);
    let fetcher = FakeFetcher::new()
        .unreachable(&urls[0], "dns error")
        .page(&urls[1], 503, "");

    let outcome = runner(&store, fetcher, urls, Pacer::none())
        .run(JobName::WebsiteCrawlingAnalysis, None)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap().contains("All 2 crawl targets failed"));

    let execution = &store.job_executions()[0];
    assert_eq!(execution.status(), Some(ExecutionStatus::Failed));
    assert_eq!(store.analysis_results()[0].score, 0);
}

#[tokio::test(start_paused = true)]
async fn test_targets_are_fetched_in_order_with_pauses() {
    let store = Arc::new(InMemoryStore::new());
    let urls = targets(5);
    let fetcher = Arc::new(FakeFetcher::new());
    let job = WebsiteCrawlJob::new(
        TEST_SITE,
        urls.clone(),
        fetcher.clone(),
        Pacer::new(Duration::from_secs(2)),
        500,
    );
    let runner = JobRunner::new(store.clone(), JobRegistry::new().with(Arc::new(job)));

    let start = tokio::time::Instant::now();
    runner
        .run(JobName::WebsiteCrawlingAnalysis, None)
        .await
        .unwrap();

    assert_eq!(fetcher.requested(), urls);
    assert!(start.elapsed() >= Duration::from_secs(8));
}

proptest! {
    #[test]
    fn prop_crawl_score_is_bounded_and_monotonic(total in 1usize..200, failed_a in 0usize..200, failed_b in 0usize..200) {
        let a = failed_a.min(total);
        let b = failed_b.min(total);
        let (fewer, more) = if a <= b { (a, b) } else { (b, a) };

        let score = crawl_score(total, fewer);
        prop_assert!((0..=100).contains(&score));
        prop_assert!(crawl_score(total, more) <= score);
        prop_assert_eq!(crawl_score(total, 0), 100);
        prop_assert_eq!(crawl_score(total, total), 0);
    }

    #[test]
    fn prop_recorded_score_matches_failure_count(failures in proptest::collection::vec(any::<bool>(), 1..10)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let urls = targets(failures.len());
        let mut fetcher = FakeFetcher::new();
        for (url, failing) in urls.iter().zip(&failures) {
            if *failing {
                fetcher = fetcher.unreachable(url, "unreachable");
            }
        }

        let store = Arc::new(InMemoryStore::new());
        rt.block_on(
            runner(&store, fetcher, urls, Pacer::none()).run(JobName::WebsiteCrawlingAnalysis, None),
        )
        .unwrap();

        let n = failures.len();
        let k = failures.iter().filter(|f| **f).count();
        let expected = ((n - k) as f64 / n as f64 * 100.0).round() as i32;

        let analysis = &store.analysis_results()[0];
        prop_assert_eq!(analysis.score, expected);
        prop_assert_eq!(analysis.issues.as_array().unwrap().len(), k);
    }
}
