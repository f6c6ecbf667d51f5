mod server;

use rivalscope::metrics::{
    FileMetricsProvider, HttpMetricsProvider, InMemoryMetricsProvider, MetricsProvider,
    ProviderError, collect_site_summaries, provider_for_source,
};
use rivalscope::models::{PerformanceMetrics, SiteSummary};
use server::start_metrics_server;
use std::fs;
use tempfile::TempDir;

fn summary_with_load(domain: &str, load: f64) -> SiteSummary {
    SiteSummary {
        performance: Some(PerformanceMetrics {
            load: Some(load),
            ..Default::default()
        }),
        ..SiteSummary::new(domain)
    }
}

#[tokio::test]
async fn test_file_provider_reads_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("client.com.json"),
        r#"{"domain": "client.com", "performance": {"load": 2500.0}}"#,
    )
    .unwrap();

    let provider = FileMetricsProvider::new(dir.path());
    let summary = provider.fetch_site_summary("client.com").await.unwrap();

    assert_eq!(summary.domain, "client.com");
    assert_eq!(summary.performance.unwrap().load, Some(2500.0));
}

#[tokio::test]
async fn test_file_provider_reads_yaml_and_fills_domain() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("rival.com.yml"),
        "onPage:\n  altTextCoverage: 72.5\n  internalLinksPerPage: 14\n",
    )
    .unwrap();

    let provider = FileMetricsProvider::new(dir.path());
    let summary = provider.fetch_site_summary("rival.com").await.unwrap();

    assert_eq!(summary.domain, "rival.com");
    let on_page = summary.on_page.unwrap();
    assert_eq!(on_page.alt_text_coverage, Some(72.5));
    assert_eq!(on_page.internal_links_per_page, Some(14.0));
    assert_eq!(on_page.external_links_per_page, None);
}

#[tokio::test]
async fn test_file_provider_reads_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("rival.com.toml"),
        "domain = \"rival.com\"\n\n[structure]\naverageDepth = 2.5\nmaxDepth = 6.0\n",
    )
    .unwrap();

    let provider = FileMetricsProvider::new(dir.path());
    let summary = provider.fetch_site_summary("rival.com").await.unwrap();

    let structure = summary.structure.unwrap();
    assert_eq!(structure.average_depth, Some(2.5));
    assert_eq!(structure.max_depth, Some(6.0));
}

#[tokio::test]
async fn test_file_provider_missing_file() {
    let dir = TempDir::new().unwrap();
    let provider = FileMetricsProvider::new(dir.path());

    let result = provider.fetch_site_summary("nowhere.com").await;
    assert!(matches!(result, Err(ProviderError::NotFound(domain)) if domain == "nowhere.com"));
}

#[tokio::test]
async fn test_file_provider_reports_io_errors() {
    let dir = TempDir::new().unwrap();
    let not_a_dir = dir.path().join("summaries");
    fs::write(&not_a_dir, "plain file").unwrap();

    let provider = FileMetricsProvider::new(&not_a_dir);
    let result = provider.fetch_site_summary("client.com").await;

    assert!(
        matches!(&result, Err(ProviderError::Io { path, .. }) if path.starts_with(&not_a_dir)),
        "expected an IO error, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_file_provider_invalid_contents() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.com.json"), "{ not valid").unwrap();

    let provider = FileMetricsProvider::new(dir.path());
    let result = provider.fetch_site_summary("bad.com").await;

    assert!(matches!(result, Err(ProviderError::Parse { .. })));
}

#[tokio::test]
async fn test_http_provider_fetches_summary() {
    let base_url = start_metrics_server().await;
    let provider = HttpMetricsProvider::new(&base_url, None).unwrap();

    let summary = provider.fetch_site_summary("rival.com").await.unwrap();
    assert_eq!(summary.domain, "rival.com");
    assert_eq!(summary.technical.unwrap().schema_markup_percent, Some(60.0));
}

#[tokio::test]
async fn test_http_provider_fills_missing_domain() {
    let base_url = start_metrics_server().await;
    let provider = HttpMetricsProvider::new(&base_url, Some(50.0)).unwrap();

    let summary = provider.fetch_site_summary("anonymous.com").await.unwrap();
    assert_eq!(summary.domain, "anonymous.com");
}

#[tokio::test]
async fn test_http_provider_errors() {
    let base_url = start_metrics_server().await;
    let provider = HttpMetricsProvider::new(&base_url, None).unwrap();

    let not_found = provider.fetch_site_summary("unknown.com").await;
    assert!(matches!(not_found, Err(ProviderError::NotFound(_))));

    let server_error = provider.fetch_site_summary("broken.com").await;
    assert!(matches!(
        server_error,
        Err(ProviderError::Status { status: 500, .. })
    ));

    let garbage = provider.fetch_site_summary("garbage.com").await;
    assert!(matches!(garbage, Err(ProviderError::Http(_))));
}

#[test]
fn test_http_provider_summary_url() {
    let provider = HttpMetricsProvider::new("https://metrics.example.com/v1", None).unwrap();
    assert_eq!(
        provider.summary_url("client.com").unwrap().as_str(),
        "https://metrics.example.com/v1/sites/client.com"
    );
}

#[test]
fn test_http_provider_rejects_other_schemes() {
    let result = HttpMetricsProvider::new("ftp://metrics.example.com", None);
    assert!(result.is_err());
    assert!(
        result
            .err()
            .unwrap()
            .to_string()
            .contains("only http and https are supported")
    );
}

#[test]
fn test_provider_for_source_requires_directory() {
    let result = provider_for_source("/definitely/not/a/real/dir", None);
    assert!(result.is_err());

    let dir = TempDir::new().unwrap();
    assert!(provider_for_source(dir.path().to_str().unwrap(), None).is_ok());
    assert!(provider_for_source("http://127.0.0.1:9", None).is_ok());
}

#[tokio::test]
async fn test_collect_marks_failed_competitors() {
    let provider = InMemoryMetricsProvider::new()
        .with_summary(summary_with_load("client.com", 3000.0))
        .with_summary(summary_with_load("rival.com", 2000.0));

    let competitors = vec![
        "rival.com".to_string(),
        "missing.com".to_string(),
        "rival.com".to_string(),
        "client.com".to_string(),
    ];
    let data = collect_site_summaries(&provider, "client.com", &competitors, 2, false)
        .await
        .unwrap();

    assert_eq!(data.client.domain, "client.com");
    // Duplicates and the client itself are dropped
    assert_eq!(data.competitors.len(), 2);
    assert!(data.competitors["rival.com"].is_usable());

    let missing = &data.competitors["missing.com"];
    assert!(!missing.is_usable());
    assert!(missing.error.as_deref().unwrap().contains("missing.com"));
}

#[tokio::test]
async fn test_collect_fails_without_client() {
    let provider =
        InMemoryMetricsProvider::new().with_summary(summary_with_load("rival.com", 2000.0));

    let result =
        collect_site_summaries(&provider, "client.com", &["rival.com".to_string()], 5, false)
            .await;

    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to fetch metrics for client client.com")
    );
}

#[tokio::test]
async fn test_collect_rejects_failed_client_summary() {
    let provider =
        InMemoryMetricsProvider::new().with_summary(SiteSummary::failed("client.com", "timeout"));

    let result = collect_site_summaries(&provider, "client.com", &[], 5, false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_collect_over_http() {
    let base_url = start_metrics_server().await;
    let provider = provider_for_source(&base_url, None).unwrap();

    let competitors = vec!["rival.com".to_string(), "broken.com".to_string()];
    let data = collect_site_summaries(provider.as_ref(), "client.com", &competitors, 5, false)
        .await
        .unwrap();

    assert!(data.competitors["rival.com"].is_usable());
    assert!(!data.competitors["broken.com"].is_usable());
}
