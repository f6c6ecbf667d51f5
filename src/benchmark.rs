use crate::config::load_data_file;
use crate::gap_scorer::GapScorer;
use crate::models::{
    Category, CategoryBenchmark, CategoryHistory, CompetitorScore, CompetitorSet, ContentMetrics,
    HistoryData, ImpactLevel, KeywordUsage, MetricComparison, MetricSet, OnPageMetrics,
    PerformanceMetrics, Ranking, Recommendation, SiteSummary, StructureMetrics, TechnicalMetrics,
    TrendPoint, TrendSeries, competitor_mean, mean, usable_competitors,
};
use anyhow::Result;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Number of monthly points forecast per series
pub const FORECAST_PERIODS: usize = 3;
/// Minimum history length before a forecast is produced
const MIN_FORECAST_HISTORY: usize = 3;

// Recommendation triggers. Unverified business tuning: keep as is.
const CATEGORY_RATIO: f64 = 0.8;
const CRITICAL_RATIO: f64 = 0.5;
const HIGH_RATIO: f64 = 0.65;
const MISSING_TAG_RATIO: f64 = 1.5;
const SCHEMA_RATIO: f64 = 0.7;
const CONTENT_LENGTH_RATIO: f64 = 0.7;
const SLOW_LOAD_RATIO: f64 = 1.3;
const ALT_TEXT_RATIO: f64 = 0.8;
const DEPTH_RATIO: f64 = 1.3;

// Optimal content ranges (lower, upper)
const TITLE_LENGTH_OPTIMAL: (f64, f64) = (50.0, 60.0);
const DESCRIPTION_LENGTH_OPTIMAL: (f64, f64) = (120.0, 160.0);
const CONTENT_LENGTH_OPTIMAL: (f64, f64) = (800.0, 2500.0);
const H1_COVERAGE_OPTIMAL: (f64, f64) = (0.9, 1.0);

const TARGET_KEYWORD_DENSITY: f64 = 2.0;

// Performance thresholds in ms: (good, medium, poor)
const LOAD_THRESHOLDS: (f64, f64, f64) = (2000.0, 4000.0, 6000.0);
const DCL_THRESHOLDS: (f64, f64, f64) = (1500.0, 3000.0, 4500.0);
const FIRST_PAINT_THRESHOLDS: (f64, f64, f64) = (1000.0, 2500.0, 4000.0);

const INTERNAL_LINKS_REFERENCE: f64 = 15.0;
const EXTERNAL_LINKS_REFERENCE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

const STRUCTURE_SCORING: &[(&str, f64, Direction)] = &[
    ("averageDepth", 3.0, Direction::LowerIsBetter),
    ("maxDepth", 5.0, Direction::LowerIsBetter),
    ("orphanPagesPercent", 5.0, Direction::LowerIsBetter),
    ("brokenLinksPercent", 1.0, Direction::LowerIsBetter),
    ("sitemapCoverage", 90.0, Direction::HigherIsBetter),
];

/// Industry reference values, one typed block per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndustryBenchmarks {
    pub technical: TechnicalMetrics,
    pub content: ContentMetrics,
    /// Typical usage of a well-targeted keyword
    pub keyword: KeywordUsage,
    pub performance: PerformanceMetrics,
    pub on_page: OnPageMetrics,
    pub structure: StructureMetrics,
}

impl Default for IndustryBenchmarks {
    fn default() -> Self {
        Self {
            technical: TechnicalMetrics {
                missing_titles_percent: Some(2.0),
                missing_descriptions_percent: Some(5.0),
                schema_markup_percent: Some(60.0),
                canonical_percent: Some(80.0),
                mobile_viewport_percent: Some(95.0),
            },
            content: ContentMetrics {
                average_title_length: Some(55.0),
                average_description_length: Some(150.0),
                average_content_length: Some(1200.0),
                h1_coverage: Some(0.95),
            },
            keyword: KeywordUsage {
                pages_with_keyword: 10.0,
                density: 2.0,
                title_usage: 40.0,
            },
            performance: PerformanceMetrics {
                load: Some(2500.0),
                dom_content_loaded: Some(1800.0),
                first_paint: Some(1200.0),
            },
            on_page: OnPageMetrics {
                alt_text_coverage: Some(85.0),
                internal_links_per_page: Some(15.0),
                external_links_per_page: Some(3.0),
            },
            structure: StructureMetrics {
                average_depth: Some(3.0),
                max_depth: Some(5.0),
                orphan_pages_percent: Some(5.0),
                broken_links_percent: Some(1.0),
                sitemap_coverage: Some(90.0),
            },
        }
    }
}

impl IndustryBenchmarks {
    /// Load a benchmark table from a JSON, TOML or YAML file.
    /// Blocks missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        load_data_file(path)
    }

    /// Score of the industry table for one category
    pub fn score(&self, category: Category) -> f64 {
        match category {
            Category::Technical => score_technical(&self.technical),
            Category::Content => score_content(&self.content),
            Category::Keywords => score_keyword(&self.keyword),
            Category::Performance => score_performance(&self.performance),
            Category::OnPage => score_on_page(&self.on_page),
            Category::Structure => score_structure(&self.structure),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkAnalysis {
    pub benchmarks: BTreeMap<Category, CategoryBenchmark>,
    pub rankings: BTreeMap<Category, Ranking>,
    pub trends: BTreeMap<Category, TrendSeries>,
    pub recommendations: Vec<Recommendation>,
}

impl BenchmarkAnalysis {
    /// Updated history to persist; forecasts are left out
    pub fn histories(&self) -> HistoryData {
        self.trends
            .iter()
            .map(|(category, series)| (*category, series.history()))
            .collect()
    }
}

pub struct BenchmarkEngine {
    industry: IndustryBenchmarks,
    forecast_periods: usize,
}

impl Default for BenchmarkEngine {
    fn default() -> Self {
        Self::new(IndustryBenchmarks::default())
    }
}

impl BenchmarkEngine {
    pub fn new(industry: IndustryBenchmarks) -> Self {
        Self {
            industry,
            forecast_periods: FORECAST_PERIODS,
        }
    }

    pub fn with_forecast_periods(mut self, periods: usize) -> Self {
        self.forecast_periods = periods;
        self
    }

    pub fn industry(&self) -> &IndustryBenchmarks {
        &self.industry
    }

    pub fn analyze(
        &self,
        client: &SiteSummary,
        competitors: &CompetitorSet,
        keywords: &[String],
        history: &HistoryData,
        as_of: NaiveDate,
    ) -> BenchmarkAnalysis {
        let tracked = if keywords.is_empty() {
            GapScorer::discover_keywords(client, competitors)
        } else {
            keywords.to_vec()
        };

        let mut analysis = BenchmarkAnalysis::default();

        for category in Category::ALL {
            let client_score = category_score(category, client, &tracked).unwrap_or(0.0);
            let competitor_scores: Vec<CompetitorScore> = competitors
                .iter()
                .filter(|(_, summary)| summary.is_usable())
                .filter_map(|(domain, summary)| {
                    category_score(category, summary, &tracked).map(|score| CompetitorScore {
                        name: domain.clone(),
                        score,
                    })
                })
                .collect();
            let competitor_average =
                mean(competitor_scores.iter().map(|entry| entry.score)).unwrap_or(0.0);
            let industry_benchmark = self.industry.score(category).clamp(0.0, 100.0);

            let benchmark = CategoryBenchmark {
                client_score,
                competitor_average,
                industry_benchmark,
                metrics: self.metric_comparisons(category, client, competitors, &tracked),
            };

            analysis
                .recommendations
                .extend(self.recommendations_for(category, &benchmark, client, competitors));
            analysis
                .rankings
                .insert(category, rank_client(client_score, competitor_scores));
            analysis.trends.insert(
                category,
                self.trend_series(history.get(&category), &benchmark, as_of),
            );
            analysis.benchmarks.insert(category, benchmark);
        }

        tracing::debug!(
            recommendations = analysis.recommendations.len(),
            "Benchmark analysis complete"
        );

        analysis
    }

    fn metric_comparisons(
        &self,
        category: Category,
        client: &SiteSummary,
        competitors: &CompetitorSet,
        tracked: &[String],
    ) -> BTreeMap<String, MetricComparison> {
        match category {
            Category::Technical => {
                compare_section(client, competitors, &self.industry.technical, technical_of)
            }
            Category::Content => {
                compare_section(client, competitors, &self.industry.content, content_of)
            }
            Category::Performance => {
                compare_section(client, competitors, &self.industry.performance, performance_of)
            }
            Category::OnPage => {
                compare_section(client, competitors, &self.industry.on_page, on_page_of)
            }
            Category::Structure => {
                compare_section(client, competitors, &self.industry.structure, structure_of)
            }
            Category::Keywords => {
                let mut metrics = BTreeMap::new();
                for keyword in tracked {
                    let fields: [(&str, fn(&KeywordUsage) -> f64, f64); 2] = [
                        ("density", |usage| usage.density, self.industry.keyword.density),
                        (
                            "titleUsage",
                            |usage| usage.title_usage,
                            self.industry.keyword.title_usage,
                        ),
                    ];
                    for (name, field, industry_value) in fields {
                        let usage_of = |summary: &SiteSummary| {
                            summary
                                .keywords
                                .as_ref()
                                .map(|map| map.get(keyword).map(field).unwrap_or(0.0))
                        };
                        metrics.insert(
                            format!("{}.{}", keyword, name),
                            MetricComparison {
                                client_value: usage_of(client),
                                competitor_average: competitor_mean(competitors, usage_of),
                                industry_average: Some(industry_value),
                            },
                        );
                    }
                }
                metrics
            }
        }
    }

    fn trend_series(
        &self,
        history: Option<&CategoryHistory>,
        benchmark: &CategoryBenchmark,
        as_of: NaiveDate,
    ) -> TrendSeries {
        let history = history.cloned().unwrap_or_default();
        let extend = |mut series: Vec<TrendPoint>, value: f64| {
            series.push(TrendPoint { date: as_of, value });
            series
        };

        let client_history = extend(history.client_history, benchmark.client_score);
        let competitor_history = extend(history.competitor_history, benchmark.competitor_average);
        let industry_history = extend(history.industry_history, benchmark.industry_benchmark);

        TrendSeries {
            forecast_client: forecast(&client_history, self.forecast_periods),
            forecast_competitor: forecast(&competitor_history, self.forecast_periods),
            client_history,
            competitor_history,
            industry_history,
        }
    }

    fn recommendations_for(
        &self,
        category: Category,
        benchmark: &CategoryBenchmark,
        client: &SiteSummary,
        competitors: &CompetitorSet,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        if !client.has_category(category) {
            return recommendations;
        }

        let client_score = benchmark.client_score;
        let behind_competitors = client_score < CATEGORY_RATIO * benchmark.competitor_average;
        let behind_industry = client_score < CATEGORY_RATIO * benchmark.industry_benchmark;

        if behind_competitors || behind_industry {
            let worst_ratio = [benchmark.competitor_average, benchmark.industry_benchmark]
                .into_iter()
                .filter(|reference| *reference > 0.0)
                .map(|reference| client_score / reference)
                .fold(f64::INFINITY, f64::min);
            let impact = if worst_ratio < CRITICAL_RATIO {
                ImpactLevel::Critical
            } else if worst_ratio < HIGH_RATIO {
                ImpactLevel::High
            } else {
                ImpactLevel::Medium
            };

            recommendations.push(Recommendation::from_benchmark(
                format!("Strengthen {}", category.label()),
                format!(
                    "{} score is {:.0} vs. competitor average {:.0} and industry benchmark {:.0}",
                    category.label(),
                    client_score,
                    benchmark.competitor_average,
                    benchmark.industry_benchmark
                ),
                category,
                impact,
                category_actions(category),
                vec![category.key().to_string()],
            ));
        }

        for rule in METRIC_RULES.iter().filter(|rule| rule.category == category) {
            let Some(comparison) = benchmark.metrics.get(rule.metric) else {
                continue;
            };
            let (Some(client_value), Some(competitor_average)) =
                (comparison.client_value, comparison.competitor_average)
            else {
                continue;
            };

            let triggered = match rule.trigger {
                Trigger::Above(ratio) => {
                    client_value > 0.0 && client_value > competitor_average * ratio
                }
                Trigger::Below(ratio) => {
                    competitor_average > 0.0 && client_value < competitor_average * ratio
                }
            };

            if triggered {
                recommendations.push(Recommendation::from_benchmark(
                    rule.title,
                    format!(
                        "{}: {:.1} vs. competitor average {:.1}",
                        rule.metric, client_value, competitor_average
                    ),
                    category,
                    rule.impact,
                    rule.actions,
                    vec![
                        category.key().to_string(),
                        format!("{}.{}", category.key(), rule.metric),
                    ],
                ));
            }
        }

        if !recommendations.is_empty() {
            tracing::debug!(
                category = %category,
                competitors = usable_competitors(competitors).count(),
                recommendations = recommendations.len(),
                "Benchmark recommendations generated"
            );
        }

        recommendations
    }
}

enum Trigger {
    Above(f64),
    Below(f64),
}

struct MetricRule {
    category: Category,
    metric: &'static str,
    trigger: Trigger,
    title: &'static str,
    impact: ImpactLevel,
    actions: &'static [&'static str],
}

const METRIC_RULES: &[MetricRule] = &[
    MetricRule {
        category: Category::Technical,
        metric: "missingTitlesPercent",
        trigger: Trigger::Above(MISSING_TAG_RATIO),
        title: "Fix Missing Title Tags",
        impact: ImpactLevel::High,
        actions: &[
            "Audit pages without a title tag",
            "Add unique title tags to every page",
            "Add title tag checks to the publishing workflow",
        ],
    },
    MetricRule {
        category: Category::Technical,
        metric: "missingDescriptionsPercent",
        trigger: Trigger::Above(MISSING_TAG_RATIO),
        title: "Add Missing Meta Descriptions",
        impact: ImpactLevel::Medium,
        actions: &[
            "Audit pages without a meta description",
            "Write a unique meta description for every page",
        ],
    },
    MetricRule {
        category: Category::Technical,
        metric: "schemaMarkupPercent",
        trigger: Trigger::Below(SCHEMA_RATIO),
        title: "Implement Schema Markup",
        impact: ImpactLevel::Medium,
        actions: &[
            "Add Organization and WebSite schema to the home page",
            "Add schema.org markup to key page templates",
            "Validate markup with a rich results testing tool",
        ],
    },
    MetricRule {
        category: Category::Content,
        metric: "averageContentLength",
        trigger: Trigger::Below(CONTENT_LENGTH_RATIO),
        title: "Expand Thin Content",
        impact: ImpactLevel::High,
        actions: &[
            "Identify pages with the lowest word counts",
            "Expand thin pages with in-depth, original copy",
        ],
    },
    MetricRule {
        category: Category::Performance,
        metric: "load",
        trigger: Trigger::Above(SLOW_LOAD_RATIO),
        title: "Reduce Page Load Time",
        impact: ImpactLevel::High,
        actions: &[
            "Compress and lazy-load images",
            "Minify and defer non-critical JavaScript and CSS",
            "Enable browser caching and a CDN",
        ],
    },
    MetricRule {
        category: Category::OnPage,
        metric: "altTextCoverage",
        trigger: Trigger::Below(ALT_TEXT_RATIO),
        title: "Add Alt Text to Images",
        impact: ImpactLevel::Low,
        actions: &["Add descriptive alt text to all content images"],
    },
    MetricRule {
        category: Category::Structure,
        metric: "averageDepth",
        trigger: Trigger::Above(DEPTH_RATIO),
        title: "Reduce Click Depth",
        impact: ImpactLevel::Medium,
        actions: &[
            "Keep key pages within three clicks of the home page",
            "Add hub pages that link to deep content",
        ],
    },
];

fn category_actions(category: Category) -> &'static [&'static str] {
    match category {
        Category::Technical => &[
            "Run a full technical SEO audit",
            "Fix missing titles, descriptions and canonical tags",
            "Add structured data to key templates",
        ],
        Category::Content => &[
            "Audit content quality and length across the site",
            "Rewrite titles and descriptions to recommended lengths",
            "Expand thin pages",
        ],
        Category::Keywords => &[
            "Revisit keyword targeting for each landing page",
            "Include target keywords in page titles and headings",
        ],
        Category::Performance => &[
            "Measure Core Web Vitals on key templates",
            "Compress and lazy-load images",
            "Reduce render-blocking resources",
        ],
        Category::OnPage => &[
            "Add descriptive alt text to all content images",
            "Add contextual internal links between related pages",
        ],
        Category::Structure => &[
            "Flatten the site hierarchy",
            "Fix broken links and orphan pages",
            "Keep the XML sitemap complete",
        ],
    }
}

/// Score a site for one category on a 0..100 scale.
/// Returns None when the site carries no data for the category.
pub fn category_score(
    category: Category,
    summary: &SiteSummary,
    keywords: &[String],
) -> Option<f64> {
    let score = match category {
        Category::Technical => score_technical(summary.technical.as_ref()?),
        Category::Content => score_content(summary.content.as_ref()?),
        Category::Keywords => {
            let usage = summary.keywords.as_ref()?;
            mean(keywords.iter().map(|keyword| {
                score_keyword(&usage.get(keyword).cloned().unwrap_or_default())
            }))
            .unwrap_or(0.0)
        }
        Category::Performance => score_performance(summary.performance.as_ref()?),
        Category::OnPage => score_on_page(summary.on_page.as_ref()?),
        Category::Structure => score_structure(summary.structure.as_ref()?),
    };
    Some(score.clamp(0.0, 100.0))
}

fn score_technical(metrics: &TechnicalMetrics) -> f64 {
    let missing = [
        metrics.missing_titles_percent,
        metrics.missing_descriptions_percent,
    ]
    .into_iter()
    .flatten()
    .map(|percent| 100.0 - percent);
    let present = [
        metrics.schema_markup_percent,
        metrics.canonical_percent,
        metrics.mobile_viewport_percent,
    ]
    .into_iter()
    .flatten();

    mean(missing.chain(present).map(|value| value.clamp(0.0, 100.0))).unwrap_or(0.0)
}

fn score_content(metrics: &ContentMetrics) -> f64 {
    let ranged = [
        (metrics.average_title_length, TITLE_LENGTH_OPTIMAL),
        (metrics.average_description_length, DESCRIPTION_LENGTH_OPTIMAL),
        (metrics.average_content_length, CONTENT_LENGTH_OPTIMAL),
        (metrics.h1_coverage, H1_COVERAGE_OPTIMAL),
    ];
    mean(
        ranged
            .into_iter()
            .filter_map(|(value, range)| value.map(|value| range_score(value, range))),
    )
    .unwrap_or(0.0)
}

/// 100 inside the optimal range, falling with distance relative to the lower bound
fn range_score(value: f64, (lower, upper): (f64, f64)) -> f64 {
    let distance = if value < lower {
        lower - value
    } else if value > upper {
        value - upper
    } else {
        0.0
    };
    if lower <= 0.0 {
        return if distance == 0.0 { 100.0 } else { 0.0 };
    }
    (100.0 - 100.0 * distance / lower).clamp(0.0, 100.0)
}

fn score_keyword(usage: &KeywordUsage) -> f64 {
    if usage.pages_with_keyword <= 0.0 {
        return 0.0;
    }
    50.0 * (usage.density / TARGET_KEYWORD_DENSITY).min(1.0)
        + 50.0 * (usage.title_usage / 100.0).min(1.0)
}

fn score_performance(metrics: &PerformanceMetrics) -> f64 {
    let timings = [
        (metrics.load, LOAD_THRESHOLDS),
        (metrics.dom_content_loaded, DCL_THRESHOLDS),
        (metrics.first_paint, FIRST_PAINT_THRESHOLDS),
    ];
    mean(
        timings
            .into_iter()
            .filter_map(|(value, thresholds)| value.map(|value| timing_score(value, thresholds))),
    )
    .unwrap_or(0.0)
}

/// Piecewise linear: 100 at good, 70 at medium, 30 at poor, 0 beyond
fn timing_score(value: f64, (good, medium, poor): (f64, f64, f64)) -> f64 {
    let score = if value <= good {
        100.0
    } else if value <= medium {
        100.0 - 30.0 * (value - good) / (medium - good)
    } else if value <= poor {
        70.0 - 40.0 * (value - medium) / (poor - medium)
    } else {
        30.0 - 30.0 * (value - poor) / (poor - medium)
    };
    score.clamp(0.0, 100.0)
}

fn score_on_page(metrics: &OnPageMetrics) -> f64 {
    let scores = [
        metrics.alt_text_coverage,
        metrics
            .internal_links_per_page
            .map(|links| links / INTERNAL_LINKS_REFERENCE * 100.0),
        metrics
            .external_links_per_page
            .map(|links| links / EXTERNAL_LINKS_REFERENCE * 100.0),
    ];
    mean(scores.into_iter().flatten().map(|score| score.clamp(0.0, 100.0))).unwrap_or(0.0)
}

fn score_structure(metrics: &StructureMetrics) -> f64 {
    mean(
        STRUCTURE_SCORING
            .iter()
            .filter_map(|(name, reference, direction)| {
                metrics.get(name).map(|value| match direction {
                    Direction::LowerIsBetter if value <= *reference => 100.0,
                    Direction::LowerIsBetter => reference / value * 100.0,
                    Direction::HigherIsBetter => (value / reference * 100.0).min(100.0),
                })
            }),
    )
    .unwrap_or(0.0)
}

fn technical_of(summary: &SiteSummary) -> Option<&TechnicalMetrics> {
    summary.technical.as_ref()
}

fn content_of(summary: &SiteSummary) -> Option<&ContentMetrics> {
    summary.content.as_ref()
}

fn performance_of(summary: &SiteSummary) -> Option<&PerformanceMetrics> {
    summary.performance.as_ref()
}

fn on_page_of(summary: &SiteSummary) -> Option<&OnPageMetrics> {
    summary.on_page.as_ref()
}

fn structure_of(summary: &SiteSummary) -> Option<&StructureMetrics> {
    summary.structure.as_ref()
}

fn compare_section<T: MetricSet + 'static>(
    client: &SiteSummary,
    competitors: &CompetitorSet,
    industry: &T,
    section: fn(&SiteSummary) -> Option<&T>,
) -> BTreeMap<String, MetricComparison> {
    industry
        .values()
        .into_iter()
        .map(|(name, industry_average)| {
            let comparison = MetricComparison {
                client_value: section(client).and_then(|metrics| metrics.get(name)),
                competitor_average: competitor_mean(competitors, |summary| {
                    section(summary).and_then(|metrics| metrics.get(name))
                }),
                industry_average,
            };
            (name.to_string(), comparison)
        })
        .collect()
}

/// Rank the client among competitors; ties favor the client
pub fn rank_client(client_score: f64, mut competitors: Vec<CompetitorScore>) -> Ranking {
    competitors.sort_by(|a, b| b.score.total_cmp(&a.score));
    let ahead = competitors
        .iter()
        .filter(|competitor| competitor.score > client_score)
        .count();
    Ranking {
        client_rank: ahead + 1,
        competitors,
    }
}

/// Extrapolate the average delta of the last three points, one month per step
pub fn forecast(series: &[TrendPoint], periods: usize) -> Vec<TrendPoint> {
    if series.len() < MIN_FORECAST_HISTORY {
        return Vec::new();
    }

    let last = &series[series.len() - 1];
    let third_last = &series[series.len() - 3];
    let average_delta = (last.value - third_last.value) / 2.0;

    let mut value = last.value;
    let mut points = Vec::with_capacity(periods);
    for step in 1..=periods {
        value = (value + average_delta).clamp(0.0, 100.0);
        if let Some(date) = last.date.checked_add_months(Months::new(step as u32)) {
            points.push(TrendPoint { date, value });
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_score_breakpoints() {
        assert_eq!(timing_score(1500.0, LOAD_THRESHOLDS), 100.0);
        assert_eq!(timing_score(2000.0, LOAD_THRESHOLDS), 100.0);
        assert!((timing_score(4000.0, LOAD_THRESHOLDS) - 70.0).abs() < 1e-9);
        assert!((timing_score(6000.0, LOAD_THRESHOLDS) - 30.0).abs() < 1e-9);
        assert_eq!(timing_score(20000.0, LOAD_THRESHOLDS), 0.0);
    }

    #[test]
    fn test_range_score() {
        assert_eq!(range_score(55.0, TITLE_LENGTH_OPTIMAL), 100.0);
        assert!((range_score(25.0, TITLE_LENGTH_OPTIMAL) - 50.0).abs() < 1e-9);
        assert!((range_score(70.0, TITLE_LENGTH_OPTIMAL) - 80.0).abs() < 1e-9);
        assert_eq!(range_score(500.0, TITLE_LENGTH_OPTIMAL), 0.0);
    }

    #[test]
    fn test_structure_direction_flags() {
        let deep = StructureMetrics {
            average_depth: Some(6.0),
            ..Default::default()
        };
        assert!((score_structure(&deep) - 50.0).abs() < 1e-9);

        let sparse_sitemap = StructureMetrics {
            sitemap_coverage: Some(45.0),
            ..Default::default()
        };
        assert!((score_structure(&sparse_sitemap) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_score_requires_pages() {
        let unused = KeywordUsage {
            pages_with_keyword: 0.0,
            density: 3.0,
            title_usage: 80.0,
        };
        assert_eq!(score_keyword(&unused), 0.0);

        let strong = KeywordUsage {
            pages_with_keyword: 4.0,
            density: 2.5,
            title_usage: 100.0,
        };
        assert_eq!(score_keyword(&strong), 100.0);
    }
}
