use crate::config::ConfigFormat;
use crate::http_client::build_http_client;
use crate::models::{CompetitorSet, SiteSummary};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no site summary found for {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid site summary for {domain}: {message}")]
    Parse { domain: String, message: String },

    #[error("metrics endpoint returned HTTP {status} for {domain}")]
    Status { domain: String, status: u16 },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid metrics URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Source of crawled site summaries
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn fetch_site_summary(&self, domain: &str) -> Result<SiteSummary, ProviderError>;
}

/// Reads `<dir>/<domain>.{json,toml,yaml,yml}`
pub struct FileMetricsProvider {
    dir: PathBuf,
}

impl FileMetricsProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl MetricsProvider for FileMetricsProvider {
    async fn fetch_site_summary(&self, domain: &str) -> Result<SiteSummary, ProviderError> {
        for format in ConfigFormat::ALL {
            for ext in format.extensions() {
                let path = self.dir.join(format!("{}.{}", domain, ext));
                let exists = tokio::fs::try_exists(&path)
                    .await
                    .map_err(|source| ProviderError::Io {
                        path: path.clone(),
                        source,
                    })?;
                if !exists {
                    continue;
                }

                let contents = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| ProviderError::Io {
                        path: path.clone(),
                        source,
                    })?;
                let summary: SiteSummary =
                    format
                        .parse(&contents, &path)
                        .map_err(|e| ProviderError::Parse {
                            domain: domain.to_string(),
                            message: format!("{:#}", e),
                        })?;

                tracing::debug!(domain = %domain, path = %path.display(), "Loaded site summary");
                return Ok(with_domain(summary, domain));
            }
        }

        Err(ProviderError::NotFound(domain.to_string()))
    }
}

/// Fetches `GET {base}/sites/{domain}` from a JSON metrics service
pub struct HttpMetricsProvider {
    client: reqwest::Client,
    base_url: Url,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpMetricsProvider {
    pub fn new(base_url: &str, requests_per_second: Option<f64>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).context("Invalid metrics URL")?;

        // Validate URL scheme - only allow http and https
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(anyhow!(
                    "Invalid URL scheme '{}': only http and https are supported",
                    scheme
                ));
            }
        }

        // Joined paths are resolved relative to the base, so it must end with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let rate_limiter = requests_per_second
            .and_then(|rps| NonZeroU32::new(rps.ceil().max(1.0) as u32))
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client: build_http_client(REQUEST_TIMEOUT)?,
            base_url,
            rate_limiter,
        })
    }

    pub fn summary_url(&self, domain: &str) -> Result<Url, ProviderError> {
        Ok(self.base_url.join(&format!("sites/{}", domain))?)
    }
}

#[async_trait]
impl MetricsProvider for HttpMetricsProvider {
    async fn fetch_site_summary(&self, domain: &str) -> Result<SiteSummary, ProviderError> {
        // Wait for rate limiter before making request
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.summary_url(domain)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(domain.to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                domain: domain.to_string(),
                status: status.as_u16(),
            });
        }

        let summary: SiteSummary = response.json().await?;
        tracing::debug!(domain = %domain, url = %url, "Fetched site summary");
        Ok(with_domain(summary, domain))
    }
}

/// Fixed set of summaries, mostly useful for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricsProvider {
    summaries: HashMap<String, SiteSummary>,
}

impl InMemoryMetricsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, summary: SiteSummary) -> Self {
        self.summaries.insert(summary.domain.clone(), summary);
        self
    }
}

#[async_trait]
impl MetricsProvider for InMemoryMetricsProvider {
    async fn fetch_site_summary(&self, domain: &str) -> Result<SiteSummary, ProviderError> {
        self.summaries
            .get(domain)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(domain.to_string()))
    }
}

/// Choose a provider from a source string: http(s) URLs go to the metrics
/// service, anything else is read as a directory of summary files.
pub fn provider_for_source(
    source: &str,
    requests_per_second: Option<f64>,
) -> Result<Box<dyn MetricsProvider>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Box::new(HttpMetricsProvider::new(source, requests_per_second)?))
    } else {
        let dir = PathBuf::from(source);
        if !dir.is_dir() {
            bail!("Metrics source is not a directory: {}", dir.display());
        }
        Ok(Box::new(FileMetricsProvider::new(dir)))
    }
}

/// Summaries for one analysis job
#[derive(Debug, Clone)]
pub struct SiteData {
    pub client: SiteSummary,
    pub competitors: CompetitorSet,
}

/// Fetch the client and all competitors. A client failure aborts the job;
/// a competitor failure is recorded as an error entry and skipped downstream.
pub async fn collect_site_summaries<P>(
    provider: &P,
    client_domain: &str,
    competitor_domains: &[String],
    concurrency: usize,
    show_progress: bool,
) -> Result<SiteData>
where
    P: MetricsProvider + ?Sized,
{
    let client = provider
        .fetch_site_summary(client_domain)
        .await
        .with_context(|| format!("Failed to fetch metrics for client {}", client_domain))?;
    if let Some(error) = &client.error {
        bail!("Metrics for client {} are marked as failed: {}", client_domain, error);
    }

    let mut domains: Vec<&String> = Vec::new();
    for domain in competitor_domains {
        if domain == client_domain {
            tracing::warn!(domain = %domain, "Client listed as its own competitor, skipping");
        } else if !domains.contains(&domain) {
            domains.push(domain);
        }
    }

    let progress_bar = show_progress.then(|| {
        let pb = ProgressBar::new(domains.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} competitors")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    });

    let results = stream::iter(domains)
        .map(|domain| {
            let progress_bar = progress_bar.clone();
            async move {
                let result = provider.fetch_site_summary(domain).await;
                if let Some(pb) = &progress_bar {
                    pb.inc(1);
                }
                (domain, result)
            }
        })
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Competitor metrics fetched");
    }

    let mut competitors = CompetitorSet::new();
    for (domain, result) in results {
        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(
                    domain = %domain,
                    error = %e,
                    "Failed to fetch competitor metrics, skipping"
                );
                SiteSummary::failed(domain, e.to_string())
            }
        };
        competitors.insert(domain.clone(), summary);
    }

    let usable = competitors.values().filter(|s| s.is_usable()).count();
    tracing::info!(
        client = %client_domain,
        competitors = competitors.len(),
        usable,
        "Site summaries collected"
    );

    Ok(SiteData {
        client,
        competitors,
    })
}

fn with_domain(mut summary: SiteSummary, domain: &str) -> SiteSummary {
    if summary.domain.is_empty() {
        summary.domain = domain.to_string();
    }
    summary
}
