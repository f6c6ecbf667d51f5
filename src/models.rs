use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Competitor summaries keyed by domain
pub type CompetitorSet = BTreeMap<String, SiteSummary>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Technical,
    Content,
    Keywords,
    Performance,
    OnPage,
    Structure,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Technical,
        Category::Content,
        Category::Keywords,
        Category::Performance,
        Category::OnPage,
        Category::Structure,
    ];

    /// Weight of the category in the overall score (unverified tuning)
    pub fn weight(self) -> f64 {
        match self {
            Category::Technical => 0.20,
            Category::Content => 0.25,
            Category::Keywords => 0.20,
            Category::Performance => 0.15,
            Category::OnPage => 0.10,
            Category::Structure => 0.10,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Content => "content",
            Category::Keywords => "keywords",
            Category::Performance => "performance",
            Category::OnPage => "onPage",
            Category::Structure => "structure",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Technical => "Technical SEO",
            Category::Content => "Content",
            Category::Keywords => "Keywords",
            Category::Performance => "Performance",
            Category::OnPage => "On-Page SEO",
            Category::Structure => "Site Structure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named numeric sub-metrics of one category, in a fixed order
pub trait MetricSet {
    fn values(&self) -> Vec<(&'static str, Option<f64>)>;

    fn get(&self, name: &str) -> Option<f64> {
        self.values()
            .into_iter()
            .find(|(metric, _)| *metric == name)
            .and_then(|(_, value)| value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalMetrics {
    pub missing_titles_percent: Option<f64>,
    pub missing_descriptions_percent: Option<f64>,
    pub schema_markup_percent: Option<f64>,
    pub canonical_percent: Option<f64>,
    pub mobile_viewport_percent: Option<f64>,
}

impl MetricSet for TechnicalMetrics {
    fn values(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("missingTitlesPercent", self.missing_titles_percent),
            ("missingDescriptionsPercent", self.missing_descriptions_percent),
            ("schemaMarkupPercent", self.schema_markup_percent),
            ("canonicalPercent", self.canonical_percent),
            ("mobileViewportPercent", self.mobile_viewport_percent),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentMetrics {
    pub average_title_length: Option<f64>,
    pub average_description_length: Option<f64>,
    /// Average word count per page
    pub average_content_length: Option<f64>,
    /// Share of pages with an H1, 0..1
    pub h1_coverage: Option<f64>,
}

impl MetricSet for ContentMetrics {
    fn values(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("averageTitleLength", self.average_title_length),
            ("averageDescriptionLength", self.average_description_length),
            ("averageContentLength", self.average_content_length),
            ("h1Coverage", self.h1_coverage),
        ]
    }
}

/// Usage of one tracked keyword across a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordUsage {
    pub pages_with_keyword: f64,
    /// Density in percent of body words
    pub density: f64,
    /// Percent of pages carrying the keyword in their title
    pub title_usage: f64,
}

impl MetricSet for KeywordUsage {
    fn values(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("pagesWithKeyword", Some(self.pages_with_keyword)),
            ("density", Some(self.density)),
            ("titleUsage", Some(self.title_usage)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceMetrics {
    /// Milliseconds until the load event
    pub load: Option<f64>,
    pub dom_content_loaded: Option<f64>,
    pub first_paint: Option<f64>,
}

impl MetricSet for PerformanceMetrics {
    fn values(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("load", self.load),
            ("domContentLoaded", self.dom_content_loaded),
            ("firstPaint", self.first_paint),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnPageMetrics {
    /// Percent of images carrying alt text
    pub alt_text_coverage: Option<f64>,
    pub internal_links_per_page: Option<f64>,
    pub external_links_per_page: Option<f64>,
}

impl MetricSet for OnPageMetrics {
    fn values(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("altTextCoverage", self.alt_text_coverage),
            ("internalLinksPerPage", self.internal_links_per_page),
            ("externalLinksPerPage", self.external_links_per_page),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructureMetrics {
    /// Average click depth from the home page
    pub average_depth: Option<f64>,
    pub max_depth: Option<f64>,
    pub orphan_pages_percent: Option<f64>,
    pub broken_links_percent: Option<f64>,
    pub sitemap_coverage: Option<f64>,
}

impl MetricSet for StructureMetrics {
    fn values(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("averageDepth", self.average_depth),
            ("maxDepth", self.max_depth),
            ("orphanPagesPercent", self.orphan_pages_percent),
            ("brokenLinksPercent", self.broken_links_percent),
            ("sitemapCoverage", self.sitemap_coverage),
        ]
    }
}

/// Aggregate crawl metrics reported for one site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    #[serde(default)]
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical: Option<TechnicalMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<BTreeMap<String, KeywordUsage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_page: Option<OnPageMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureMetrics>,
}

impl SiteSummary {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    /// Placeholder for a site whose metrics could not be retrieved
    pub fn failed(domain: &str, error: impl Into<String>) -> Self {
        Self {
            domain: domain.to_string(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_usable(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the summary carries any data for the category
    pub fn has_category(&self, category: Category) -> bool {
        match category {
            Category::Technical => self.technical.is_some(),
            Category::Content => self.content.is_some(),
            Category::Keywords => self.keywords.is_some(),
            Category::Performance => self.performance.is_some(),
            Category::OnPage => self.on_page.is_some(),
            Category::Structure => self.structure.is_some(),
        }
    }

    pub fn keyword(&self, keyword: &str) -> Option<&KeywordUsage> {
        self.keywords.as_ref().and_then(|map| map.get(keyword))
    }
}

/// Competitors without an error marker
pub fn usable_competitors(competitors: &CompetitorSet) -> impl Iterator<Item = &SiteSummary> {
    competitors.values().filter(|summary| summary.is_usable())
}

/// Mean of the values, or None when there are none
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Mean of a metric over usable competitors, skipping those that lack it
pub fn competitor_mean<F>(competitors: &CompetitorSet, metric: F) -> Option<f64>
where
    F: Fn(&SiteSummary) -> Option<f64>,
{
    mean(usable_competitors(competitors).filter_map(metric))
}

/// Linear 1..5 severity between calibrated thresholds
pub fn impact_score(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        1.0
    } else if value >= max {
        5.0
    } else {
        1.0 + 4.0 * (value - min) / (max - min)
    }
}

/// Qualitative impact attached to benchmark suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "critical" => Some(ImpactLevel::Critical),
            "high" => Some(ImpactLevel::High),
            "medium" => Some(ImpactLevel::Medium),
            "low" => Some(ImpactLevel::Low),
            _ => None,
        }
    }

    pub fn score(self) -> f64 {
        match self {
            ImpactLevel::Critical => 5.0,
            ImpactLevel::High => 4.0,
            ImpactLevel::Medium => 3.0,
            ImpactLevel::Low => 2.0,
        }
    }
}

/// Numeric impact for a textual label; unknown labels count as medium
pub fn impact_score_from_label(label: &str) -> f64 {
    ImpactLevel::from_label(label)
        .unwrap_or(ImpactLevel::Medium)
        .score()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn from_impact(impact_score: f64) -> Self {
        if impact_score >= 4.5 {
            Priority::Critical
        } else if impact_score >= 3.5 {
            Priority::High
        } else if impact_score >= 2.5 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapData {
    pub client_value: f64,
    pub competitor_average: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub impact_score: f64,
    pub data: GapData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub impact_score: f64,
    pub actions: Vec<String>,
    pub related_gaps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationSource {
    GapAnalysis,
    Benchmark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub impact_score: f64,
    pub priority: Priority,
    pub actions: Vec<String>,
    pub source: RecommendationSource,
    pub related_items: Vec<String>,
}

impl Recommendation {
    pub fn from_opportunity(opportunity: &Opportunity) -> Self {
        Self {
            title: opportunity.title.clone(),
            description: opportunity.description.clone(),
            category: opportunity.category,
            impact_score: opportunity.impact_score,
            priority: Priority::from_impact(opportunity.impact_score),
            actions: opportunity.actions.clone(),
            source: RecommendationSource::GapAnalysis,
            related_items: opportunity.related_gaps.clone(),
        }
    }

    /// Benchmark suggestion whose impact is only known qualitatively
    pub fn from_benchmark(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        impact: ImpactLevel,
        actions: &[&str],
        related_items: Vec<String>,
    ) -> Self {
        let impact_score = impact.score();
        Self {
            title: title.into(),
            description: description.into(),
            category,
            impact_score,
            priority: Priority::from_impact(impact_score),
            actions: actions.iter().map(|action| action.to_string()).collect(),
            source: RecommendationSource::Benchmark,
            related_items,
        }
    }
}

/// Stable descending sort on impact score
pub fn sort_by_impact<T, F>(items: &mut [T], impact: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| impact(b).total_cmp(&impact(a)));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub client_value: Option<f64>,
    pub competitor_average: Option<f64>,
    pub industry_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBenchmark {
    pub client_score: f64,
    pub competitor_average: f64,
    pub industry_benchmark: f64,
    pub metrics: BTreeMap<String, MetricComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorScore {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub client_rank: usize,
    pub competitors: Vec<CompetitorScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Persisted score history of one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryHistory {
    pub client_history: Vec<TrendPoint>,
    pub competitor_history: Vec<TrendPoint>,
    pub industry_history: Vec<TrendPoint>,
}

pub type HistoryData = BTreeMap<Category, CategoryHistory>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub client_history: Vec<TrendPoint>,
    pub competitor_history: Vec<TrendPoint>,
    pub industry_history: Vec<TrendPoint>,
    pub forecast_client: Vec<TrendPoint>,
    pub forecast_competitor: Vec<TrendPoint>,
}

impl TrendSeries {
    /// History part only; forecasts are never persisted
    pub fn history(&self) -> CategoryHistory {
        CategoryHistory {
            client_history: self.client_history.clone(),
            competitor_history: self.competitor_history.clone(),
            industry_history: self.industry_history.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub impact_score: f64,
    pub actions: Vec<String>,
    pub duration_days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    pub description: String,
    pub priorities: Vec<Priority>,
    pub duration_months: u32,
    pub max_tasks: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub phases: Vec<Phase>,
}

/// Amounts along the resource axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    /// Hours
    pub time: f64,
    pub technical: f64,
    pub content: f64,
    /// Dollars
    pub cost: f64,
}

impl std::ops::AddAssign for Resources {
    fn add_assign(&mut self, other: Self) {
        self.time += other.time;
        self.technical += other.technical;
        self.content += other.content;
        self.cost += other.cost;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocation {
    pub total: Resources,
    pub by_priority: BTreeMap<Priority, Resources>,
    pub by_category: BTreeMap<Category, Resources>,
    pub by_phase: BTreeMap<String, Resources>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiProjection {
    pub months: Vec<String>,
    pub investment: Vec<f64>,
    #[serde(rename = "return")]
    pub returns: Vec<f64>,
    pub cumulative_roi: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Recommendation,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub category: Category,
    pub impact: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLink {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyMap {
    pub nodes: Vec<MapNode>,
    pub links: Vec<MapLink>,
}
