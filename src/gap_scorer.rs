use crate::models::{
    Category, CompetitorSet, ContentMetrics, Gap, GapData, KeywordUsage, OnPageMetrics,
    Opportunity, PerformanceMetrics, SiteSummary, TechnicalMetrics, competitor_mean, impact_score,
    sort_by_impact, usable_competitors,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// Gap thresholds and (min, max) impact calibrations.
// Unverified business tuning: keep the values exactly as they are.

const MISSING_TITLES_MARGIN: f64 = 5.0;
const MISSING_TITLES_IMPACT: (f64, f64) = (5.0, 30.0);
const MISSING_DESCRIPTIONS_MARGIN: f64 = 10.0;
const MISSING_DESCRIPTIONS_IMPACT: (f64, f64) = (10.0, 40.0);
const SCHEMA_DEFICIT_MARGIN: f64 = 15.0;
const SCHEMA_IMPACT: (f64, f64) = (15.0, 50.0);
const CANONICAL_DEFICIT_MARGIN: f64 = 20.0;
const CANONICAL_IMPACT: (f64, f64) = (20.0, 60.0);
const MOBILE_DEFICIT_MARGIN: f64 = 10.0;
const MOBILE_IMPACT: (f64, f64) = (10.0, 40.0);

const TITLE_LENGTH_RANGE: (f64, f64) = (30.0, 70.0);
const TITLE_LENGTH_IMPACT: (f64, f64) = (5.0, 30.0);
const DESCRIPTION_LENGTH_RANGE: (f64, f64) = (80.0, 170.0);
const DESCRIPTION_LENGTH_IMPACT: (f64, f64) = (10.0, 60.0);
const THIN_CONTENT_RATIO: f64 = 0.7;
const THIN_CONTENT_IMPACT: (f64, f64) = (30.0, 70.0);
const H1_COVERAGE_FLOOR: f64 = 0.9;
const H1_IMPACT: (f64, f64) = (5.0, 40.0);

const MISSING_KEYWORD_IMPACT: (f64, f64) = (0.5, 3.0);
const KEYWORD_DENSITY_RATIO: f64 = 0.5;
const KEYWORD_TITLE_RATIO: f64 = 0.5;
const KEYWORD_SHORTFALL_IMPACT: (f64, f64) = (50.0, 90.0);

const SLOW_METRIC_RATIO: f64 = 1.2;
const SLOW_METRIC_IMPACT: (f64, f64) = (20.0, 100.0);

const ALT_TEXT_RATIO: f64 = 0.8;
const ALT_TEXT_IMPACT: (f64, f64) = (20.0, 60.0);
const INTERNAL_LINKS_RATIO: f64 = 0.7;
const INTERNAL_LINKS_IMPACT: (f64, f64) = (30.0, 70.0);

const PAGE_DEPTH_RATIO: f64 = 1.3;
const PAGE_DEPTH_IMPACT: (f64, f64) = (30.0, 100.0);

/// Per-category scores plus the weighted overall score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(flatten)]
    pub categories: BTreeMap<Category, f64>,
    pub overall: f64,
}

impl Scores {
    pub fn category(&self, category: Category) -> f64 {
        self.categories.get(&category).copied().unwrap_or(100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub gaps: BTreeMap<Category, Vec<Gap>>,
    pub opportunities: Vec<Opportunity>,
    pub scores: Scores,
}

impl GapAnalysis {
    pub fn all_gaps(&self) -> impl Iterator<Item = &Gap> {
        self.gaps.values().flatten()
    }
}

struct OpportunityRule {
    title: &'static str,
    category: Category,
    gap_categories: &'static [Category],
    markers: &'static [&'static str],
    summary: &'static str,
    actions: &'static [&'static str],
}

const OPPORTUNITY_RULES: &[OpportunityRule] = &[
    OpportunityRule {
        title: "Optimize Title Tags",
        category: Category::Technical,
        gap_categories: &[Category::Technical, Category::Content],
        markers: &["Title"],
        summary: "Page titles are missing or poorly sized compared to competitors",
        actions: &[
            "Add unique title tags to every page",
            "Keep titles between 50 and 60 characters",
            "Place primary keywords near the start of the title",
            "Remove duplicate titles across pages",
        ],
    },
    OpportunityRule {
        title: "Improve Meta Descriptions",
        category: Category::Technical,
        gap_categories: &[Category::Technical, Category::Content],
        markers: &["Description"],
        summary: "Meta descriptions are missing or poorly sized compared to competitors",
        actions: &[
            "Write a unique meta description for every page",
            "Keep descriptions between 120 and 160 characters",
            "Include a clear call to action in each description",
        ],
    },
    OpportunityRule {
        title: "Implement Structured Data",
        category: Category::Technical,
        gap_categories: &[Category::Technical],
        markers: &["Schema"],
        summary: "Competitors use more schema.org markup",
        actions: &[
            "Add Organization and WebSite schema to the home page",
            "Mark up products, articles and FAQs with schema.org types",
            "Validate markup with a rich results testing tool",
        ],
    },
    OpportunityRule {
        title: "Add Canonical Tags",
        category: Category::Technical,
        gap_categories: &[Category::Technical],
        markers: &["Canonical"],
        summary: "Fewer pages declare a canonical URL than on competitor sites",
        actions: &[
            "Add self-referencing canonical tags to all indexable pages",
            "Point duplicate and parameterised URLs at their canonical version",
        ],
    },
    OpportunityRule {
        title: "Improve Mobile Experience",
        category: Category::Technical,
        gap_categories: &[Category::Technical],
        markers: &["Mobile"],
        summary: "Mobile viewport support lags behind competitors",
        actions: &[
            "Add a responsive viewport meta tag to every template",
            "Audit templates for horizontal scrolling on small screens",
            "Increase tap target sizes on navigation elements",
        ],
    },
    OpportunityRule {
        title: "Expand Content Depth",
        category: Category::Content,
        gap_categories: &[Category::Content],
        markers: &["Content"],
        summary: "Pages carry less content than competitor pages",
        actions: &[
            "Expand thin pages with in-depth, original copy",
            "Answer related questions users search for",
            "Merge or remove pages that cannot be expanded",
        ],
    },
    OpportunityRule {
        title: "Fix Heading Structure",
        category: Category::Content,
        gap_categories: &[Category::Content],
        markers: &["H1"],
        summary: "Many pages lack a primary H1 heading",
        actions: &[
            "Add exactly one descriptive H1 to each page",
            "Use H2 and H3 headings to structure long content",
        ],
    },
    OpportunityRule {
        title: "Target Missing Keywords",
        category: Category::Keywords,
        gap_categories: &[Category::Keywords],
        markers: &["Missing Keyword"],
        summary: "Competitors rank content for keywords the site does not cover",
        actions: &[
            "Create dedicated landing pages for missing keywords",
            "Map each missing keyword to a target URL",
            "Build internal links to the new pages",
        ],
    },
    OpportunityRule {
        title: "Strengthen Keyword Usage",
        category: Category::Keywords,
        gap_categories: &[Category::Keywords],
        markers: &["Underutilized", "from Titles"],
        summary: "Tracked keywords are used less prominently than on competitor sites",
        actions: &[
            "Work underused keywords naturally into body copy",
            "Include target keywords in page titles and headings",
            "Refresh existing pages that target these keywords",
        ],
    },
    OpportunityRule {
        title: "Improve Page Speed",
        category: Category::Performance,
        gap_categories: &[Category::Performance],
        markers: &["Slow"],
        summary: "Pages load slower than competitor pages",
        actions: &[
            "Compress and lazy-load images",
            "Minify and defer non-critical JavaScript and CSS",
            "Enable browser caching and a CDN",
            "Reduce server response time",
        ],
    },
    OpportunityRule {
        title: "Add Image Alt Text",
        category: Category::OnPage,
        gap_categories: &[Category::OnPage],
        markers: &["Image"],
        summary: "Fewer images carry alt text than on competitor sites",
        actions: &[
            "Add descriptive alt text to all content images",
            "Use empty alt attributes for decorative images",
        ],
    },
    OpportunityRule {
        title: "Improve Internal Linking",
        category: Category::OnPage,
        gap_categories: &[Category::OnPage],
        markers: &["Linking"],
        summary: "Pages link to fewer internal pages than competitor pages",
        actions: &[
            "Link related articles to each other",
            "Add contextual links from high-authority pages",
            "Introduce breadcrumb navigation",
        ],
    },
    OpportunityRule {
        title: "Flatten Site Architecture",
        category: Category::Structure,
        gap_categories: &[Category::Structure],
        markers: &["Depth"],
        summary: "Important pages sit deeper in the site than on competitor sites",
        actions: &[
            "Keep key pages within three clicks of the home page",
            "Add hub pages that link to deep content",
            "Update the XML sitemap to include all deep pages",
        ],
    },
];

pub struct GapScorer;

impl GapScorer {
    /// Compare the client against the competitor aggregate in every category.
    /// An empty keyword list tracks every keyword seen in the summaries.
    pub fn analyze(
        client: &SiteSummary,
        competitors: &CompetitorSet,
        keywords: &[String],
    ) -> GapAnalysis {
        let mut gaps = BTreeMap::new();

        for category in Category::ALL {
            let comparable = client.has_category(category)
                && usable_competitors(competitors).any(|summary| summary.has_category(category));

            let mut category_gaps = if comparable {
                match category {
                    Category::Technical => Self::technical_gaps(client, competitors),
                    Category::Content => Self::content_gaps(client, competitors),
                    Category::Keywords => Self::keyword_gaps(client, competitors, keywords),
                    Category::Performance => Self::performance_gaps(client, competitors),
                    Category::OnPage => Self::on_page_gaps(client, competitors),
                    Category::Structure => Self::structure_gaps(client, competitors),
                }
            } else {
                tracing::debug!(category = %category, "No comparable competitor data");
                Vec::new()
            };

            sort_by_impact(&mut category_gaps, |gap| gap.impact_score);
            gaps.insert(category, category_gaps);
        }

        let opportunities = Self::identify_opportunities(&gaps);
        let scores = Self::calculate_scores(&gaps);

        GapAnalysis {
            gaps,
            opportunities,
            scores,
        }
    }

    fn technical_gaps(client: &SiteSummary, competitors: &CompetitorSet) -> Vec<Gap> {
        let mut gaps = Vec::new();
        let Some(metrics) = &client.technical else {
            return gaps;
        };
        let average = |metric: fn(&TechnicalMetrics) -> Option<f64>| {
            competitor_mean(competitors, |summary| summary.technical.as_ref().and_then(metric))
        };

        // Client pages missing titles
        if let (Some(client_value), Some(competitor_average)) = (
            metrics.missing_titles_percent,
            average(|m| m.missing_titles_percent),
        ) {
            let excess = client_value - competitor_average;
            if excess > MISSING_TITLES_MARGIN {
                gaps.push(gap(
                    Category::Technical,
                    "Missing Page Titles",
                    format!(
                        "{:.1}% of pages lack a title tag vs. {:.1}% for competitors",
                        client_value, competitor_average
                    ),
                    impact_score(excess, MISSING_TITLES_IMPACT.0, MISSING_TITLES_IMPACT.1),
                    client_value,
                    competitor_average,
                ));
            }
        }

        // Client pages missing meta descriptions
        if let (Some(client_value), Some(competitor_average)) = (
            metrics.missing_descriptions_percent,
            average(|m| m.missing_descriptions_percent),
        ) {
            let excess = client_value - competitor_average;
            if excess > MISSING_DESCRIPTIONS_MARGIN {
                gaps.push(gap(
                    Category::Technical,
                    "Missing Meta Descriptions",
                    format!(
                        "{:.1}% of pages lack a meta description vs. {:.1}% for competitors",
                        client_value, competitor_average
                    ),
                    impact_score(
                        excess,
                        MISSING_DESCRIPTIONS_IMPACT.0,
                        MISSING_DESCRIPTIONS_IMPACT.1,
                    ),
                    client_value,
                    competitor_average,
                ));
            }
        }

        let coverage_rules: [(
            Option<f64>,
            Option<f64>,
            f64,
            (f64, f64),
            &str,
            &str,
        ); 3] = [
            (
                metrics.schema_markup_percent,
                average(|m| m.schema_markup_percent),
                SCHEMA_DEFICIT_MARGIN,
                SCHEMA_IMPACT,
                "Insufficient Schema Markup",
                "structured data",
            ),
            (
                metrics.canonical_percent,
                average(|m| m.canonical_percent),
                CANONICAL_DEFICIT_MARGIN,
                CANONICAL_IMPACT,
                "Missing Canonical Tags",
                "a canonical tag",
            ),
            (
                metrics.mobile_viewport_percent,
                average(|m| m.mobile_viewport_percent),
                MOBILE_DEFICIT_MARGIN,
                MOBILE_IMPACT,
                "Poor Mobile Optimization",
                "a mobile viewport",
            ),
        ];

        for (client_value, competitor_average, margin, (min, max), title, feature) in coverage_rules
        {
            if let (Some(client_value), Some(competitor_average)) =
                (client_value, competitor_average)
            {
                let deficit = competitor_average - client_value;
                if deficit > margin {
                    gaps.push(gap(
                        Category::Technical,
                        title,
                        format!(
                            "{:.1}% of pages have {} vs. {:.1}% for competitors",
                            client_value, feature, competitor_average
                        ),
                        impact_score(deficit, min, max),
                        client_value,
                        competitor_average,
                    ));
                }
            }
        }

        gaps
    }

    fn content_gaps(client: &SiteSummary, competitors: &CompetitorSet) -> Vec<Gap> {
        let mut gaps = Vec::new();
        let Some(metrics) = &client.content else {
            return gaps;
        };
        let average = |metric: fn(&ContentMetrics) -> Option<f64>| {
            competitor_mean(competitors, |summary| summary.content.as_ref().and_then(metric))
        };

        // Title and description lengths are judged against absolute ranges
        let length_rules = [
            (
                metrics.average_title_length,
                average(|m| m.average_title_length),
                TITLE_LENGTH_RANGE,
                TITLE_LENGTH_IMPACT,
                "Title Length",
            ),
            (
                metrics.average_description_length,
                average(|m| m.average_description_length),
                DESCRIPTION_LENGTH_RANGE,
                DESCRIPTION_LENGTH_IMPACT,
                "Description Length",
            ),
        ];

        for (client_value, competitor_average, (low, high), (min, max), label) in length_rules {
            let Some(client_value) = client_value else {
                continue;
            };
            let (suffix, deviation) = if client_value < low {
                ("Too Short", low - client_value)
            } else if client_value > high {
                ("Too Long", client_value - high)
            } else {
                continue;
            };

            gaps.push(gap(
                Category::Content,
                &format!("{} {}", label, suffix),
                format!(
                    "Average {} is {:.0} characters (recommended: {:.0}-{:.0})",
                    label.to_lowercase(),
                    client_value,
                    low,
                    high
                ),
                impact_score(deviation, min, max),
                client_value,
                competitor_average.unwrap_or(0.0),
            ));
        }

        // Thin content relative to competitors
        if let (Some(client_value), Some(competitor_average)) = (
            metrics.average_content_length,
            average(|m| m.average_content_length),
        ) && competitor_average > 0.0
            && client_value < competitor_average * THIN_CONTENT_RATIO
        {
            let shortfall = (1.0 - client_value / competitor_average) * 100.0;
            gaps.push(gap(
                Category::Content,
                "Thin Content",
                format!(
                    "Pages average {:.0} words vs. {:.0} for competitors",
                    client_value, competitor_average
                ),
                impact_score(shortfall, THIN_CONTENT_IMPACT.0, THIN_CONTENT_IMPACT.1),
                client_value,
                competitor_average,
            ));
        }

        // H1 coverage
        if let (Some(client_value), Some(competitor_average)) =
            (metrics.h1_coverage, average(|m| m.h1_coverage))
            && client_value < H1_COVERAGE_FLOOR
            && competitor_average > H1_COVERAGE_FLOOR
        {
            let deficit = (competitor_average - client_value) * 100.0;
            gaps.push(gap(
                Category::Content,
                "Missing H1 Headings",
                format!(
                    "{:.0}% of pages have an H1 vs. {:.0}% for competitors",
                    client_value * 100.0,
                    competitor_average * 100.0
                ),
                impact_score(deficit, H1_IMPACT.0, H1_IMPACT.1),
                client_value,
                competitor_average,
            ));
        }

        gaps
    }

    /// Keywords tracked when the caller supplies none
    pub fn discover_keywords(client: &SiteSummary, competitors: &CompetitorSet) -> Vec<String> {
        std::iter::once(client)
            .chain(usable_competitors(competitors))
            .filter_map(|summary| summary.keywords.as_ref())
            .flat_map(|keywords| keywords.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn keyword_gaps(
        client: &SiteSummary,
        competitors: &CompetitorSet,
        keywords: &[String],
    ) -> Vec<Gap> {
        let mut gaps = Vec::new();
        if client.keywords.is_none() {
            return gaps;
        }

        let tracked = if keywords.is_empty() {
            Self::discover_keywords(client, competitors)
        } else {
            keywords.to_vec()
        };

        for keyword in &tracked {
            let client_usage = client.keyword(keyword).cloned().unwrap_or_default();

            // Competitors with keyword data count a keyword they lack as unused
            let competitor_usage = |metric: fn(&KeywordUsage) -> f64| {
                competitor_mean(competitors, |summary| {
                    summary
                        .keywords
                        .as_ref()
                        .map(|map| map.get(keyword).map(metric).unwrap_or(0.0))
                })
                .unwrap_or(0.0)
            };
            let competitor_pages = competitor_usage(|usage| usage.pages_with_keyword);
            let competitor_density = competitor_usage(|usage| usage.density);
            let competitor_titles = competitor_usage(|usage| usage.title_usage);

            if competitor_pages <= 0.0 {
                continue;
            }

            if client_usage.pages_with_keyword <= 0.0 {
                gaps.push(gap(
                    Category::Keywords,
                    &format!("Missing Keyword: {}", keyword),
                    format!(
                        "\"{}\" does not appear on any page; competitors use it on {:.1} pages on average",
                        keyword, competitor_pages
                    ),
                    impact_score(
                        competitor_density,
                        MISSING_KEYWORD_IMPACT.0,
                        MISSING_KEYWORD_IMPACT.1,
                    ),
                    client_usage.density,
                    competitor_density,
                ));
                continue;
            }

            if competitor_density > 0.0
                && client_usage.density < competitor_density * KEYWORD_DENSITY_RATIO
            {
                let shortfall = (1.0 - client_usage.density / competitor_density) * 100.0;
                gaps.push(gap(
                    Category::Keywords,
                    &format!("Underutilized Keyword: {}", keyword),
                    format!(
                        "\"{}\" density is {:.2}% vs. {:.2}% for competitors",
                        keyword, client_usage.density, competitor_density
                    ),
                    impact_score(
                        shortfall,
                        KEYWORD_SHORTFALL_IMPACT.0,
                        KEYWORD_SHORTFALL_IMPACT.1,
                    ),
                    client_usage.density,
                    competitor_density,
                ));
            }

            if competitor_titles > 0.0
                && client_usage.title_usage < competitor_titles * KEYWORD_TITLE_RATIO
            {
                let shortfall = (1.0 - client_usage.title_usage / competitor_titles) * 100.0;
                gaps.push(gap(
                    Category::Keywords,
                    &format!("Keyword Missing from Titles: {}", keyword),
                    format!(
                        "\"{}\" appears in {:.1}% of titles vs. {:.1}% for competitors",
                        keyword, client_usage.title_usage, competitor_titles
                    ),
                    impact_score(
                        shortfall,
                        KEYWORD_SHORTFALL_IMPACT.0,
                        KEYWORD_SHORTFALL_IMPACT.1,
                    ),
                    client_usage.title_usage,
                    competitor_titles,
                ));
            }
        }

        gaps
    }

    fn performance_gaps(client: &SiteSummary, competitors: &CompetitorSet) -> Vec<Gap> {
        let mut gaps = Vec::new();
        let Some(metrics) = &client.performance else {
            return gaps;
        };
        let average = |metric: fn(&PerformanceMetrics) -> Option<f64>| {
            competitor_mean(competitors, |summary| {
                summary.performance.as_ref().and_then(metric)
            })
        };

        let timings = [
            (metrics.load, average(|m| m.load), "Slow Page Load Time", "Page load"),
            (
                metrics.dom_content_loaded,
                average(|m| m.dom_content_loaded),
                "Slow DOM Content Loaded",
                "DOMContentLoaded",
            ),
            (
                metrics.first_paint,
                average(|m| m.first_paint),
                "Slow First Paint",
                "First paint",
            ),
        ];

        for (client_value, competitor_average, title, label) in timings {
            if let (Some(client_value), Some(competitor_average)) =
                (client_value, competitor_average)
                && competitor_average > 0.0
                && client_value > competitor_average * SLOW_METRIC_RATIO
            {
                let slower = (client_value / competitor_average - 1.0) * 100.0;
                gaps.push(gap(
                    Category::Performance,
                    title,
                    format!(
                        "{} takes {:.0}ms vs. {:.0}ms for competitors ({:.0}% slower)",
                        label, client_value, competitor_average, slower
                    ),
                    impact_score(slower, SLOW_METRIC_IMPACT.0, SLOW_METRIC_IMPACT.1),
                    client_value,
                    competitor_average,
                ));
            }
        }

        gaps
    }

    fn on_page_gaps(client: &SiteSummary, competitors: &CompetitorSet) -> Vec<Gap> {
        let mut gaps = Vec::new();
        let Some(metrics) = &client.on_page else {
            return gaps;
        };
        let average = |metric: fn(&OnPageMetrics) -> Option<f64>| {
            competitor_mean(competitors, |summary| summary.on_page.as_ref().and_then(metric))
        };

        // Alt text coverage
        if let (Some(client_value), Some(competitor_average)) =
            (metrics.alt_text_coverage, average(|m| m.alt_text_coverage))
            && competitor_average > 0.0
            && client_value < competitor_average * ALT_TEXT_RATIO
        {
            let shortfall = (1.0 - client_value / competitor_average) * 100.0;
            gaps.push(gap(
                Category::OnPage,
                "Missing Image Alt Text",
                format!(
                    "{:.1}% of images have alt text vs. {:.1}% for competitors",
                    client_value, competitor_average
                ),
                impact_score(shortfall, ALT_TEXT_IMPACT.0, ALT_TEXT_IMPACT.1),
                client_value,
                competitor_average,
            ));
        }

        // Internal links per page
        if let (Some(client_value), Some(competitor_average)) = (
            metrics.internal_links_per_page,
            average(|m| m.internal_links_per_page),
        ) && competitor_average > 0.0
            && client_value < competitor_average * INTERNAL_LINKS_RATIO
        {
            let shortfall = (1.0 - client_value / competitor_average) * 100.0;
            gaps.push(gap(
                Category::OnPage,
                "Weak Internal Linking",
                format!(
                    "Pages have {:.1} internal links vs. {:.1} for competitors",
                    client_value, competitor_average
                ),
                impact_score(shortfall, INTERNAL_LINKS_IMPACT.0, INTERNAL_LINKS_IMPACT.1),
                client_value,
                competitor_average,
            ));
        }

        gaps
    }

    fn structure_gaps(client: &SiteSummary, competitors: &CompetitorSet) -> Vec<Gap> {
        let mut gaps = Vec::new();

        if let Some(client_value) = client.structure.as_ref().and_then(|m| m.average_depth)
            && let Some(competitor_average) = competitor_mean(competitors, |summary| {
                summary.structure.as_ref().and_then(|m| m.average_depth)
            })
            && competitor_average > 0.0
            && client_value > competitor_average * PAGE_DEPTH_RATIO
        {
            let deeper = (client_value / competitor_average - 1.0) * 100.0;
            gaps.push(gap(
                Category::Structure,
                "Excessive Page Depth",
                format!(
                    "Pages sit {:.1} clicks deep on average vs. {:.1} for competitors",
                    client_value, competitor_average
                ),
                impact_score(deeper, PAGE_DEPTH_IMPACT.0, PAGE_DEPTH_IMPACT.1),
                client_value,
                competitor_average,
            ));
        }

        gaps
    }

    /// Bundle related gaps into actionable opportunities
    pub fn identify_opportunities(gaps: &BTreeMap<Category, Vec<Gap>>) -> Vec<Opportunity> {
        let mut opportunities = Vec::new();

        for rule in OPPORTUNITY_RULES {
            let members: Vec<&Gap> = rule
                .gap_categories
                .iter()
                .filter_map(|category| gaps.get(category))
                .flatten()
                .filter(|gap| rule.markers.iter().any(|marker| gap.title.contains(marker)))
                .collect();

            if members.is_empty() {
                continue;
            }

            let impact_score = members
                .iter()
                .map(|gap| gap.impact_score)
                .fold(f64::MIN, f64::max);

            opportunities.push(Opportunity {
                title: rule.title.to_string(),
                description: format!("{} ({} related gap(s))", rule.summary, members.len()),
                category: rule.category,
                impact_score,
                actions: rule.actions.iter().map(|action| action.to_string()).collect(),
                related_gaps: members.iter().map(|gap| gap.title.clone()).collect(),
            });
        }

        sort_by_impact(&mut opportunities, |opportunity| opportunity.impact_score);
        opportunities
    }

    /// Category scores from gap severities, then the weighted overall score
    pub fn calculate_scores(gaps: &BTreeMap<Category, Vec<Gap>>) -> Scores {
        let categories: BTreeMap<Category, f64> = Category::ALL
            .iter()
            .map(|&category| {
                let category_gaps = gaps.get(&category).map(Vec::as_slice).unwrap_or(&[]);
                (category, Self::category_score(category_gaps))
            })
            .collect();

        let overall = categories
            .iter()
            .map(|(category, score)| category.weight() * score)
            .sum();

        Scores {
            categories,
            overall,
        }
    }

    pub fn category_score(gaps: &[Gap]) -> f64 {
        if gaps.is_empty() {
            return 100.0;
        }
        let total_impact: f64 = gaps.iter().map(|gap| gap.impact_score).sum();
        let max_impact = 5.0 * gaps.len() as f64;
        (100.0 - (total_impact / max_impact) * 100.0).clamp(0.0, 100.0)
    }
}

fn gap(
    category: Category,
    title: &str,
    description: String,
    impact_score: f64,
    client_value: f64,
    competitor_average: f64,
) -> Gap {
    Gap {
        category,
        title: title.to_string(),
        description,
        impact_score,
        data: GapData {
            client_value,
            competitor_average,
            difference: client_value - competitor_average,
        },
    }
}
