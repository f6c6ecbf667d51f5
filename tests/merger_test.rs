use rivalscope::merger::{RecommendationMerger, is_similar};
use rivalscope::models::{
    Category, ImpactLevel, Opportunity, Priority, Recommendation, RecommendationSource,
};

fn recommendation(
    title: &str,
    category: Category,
    impact_score: f64,
    actions: &[&str],
    related_items: &[&str],
) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        description: format!("{} description", title),
        category,
        impact_score,
        priority: Priority::from_impact(impact_score),
        actions: actions.iter().map(|action| action.to_string()).collect(),
        source: RecommendationSource::GapAnalysis,
        related_items: related_items.iter().map(|item| item.to_string()).collect(),
    }
}

fn titles(recommendations: &[Recommendation]) -> Vec<&str> {
    recommendations.iter().map(|r| r.title.as_str()).collect()
}

#[test]
fn test_similar_titles_merge() {
    let merged = RecommendationMerger::merge(vec![
        recommendation(
            "Optimize Title Tags",
            Category::Technical,
            3.0,
            &["Add unique title tags to every page"],
            &["Missing Page Titles"],
        ),
        recommendation(
            "Fix Missing Title Tags",
            Category::Technical,
            4.0,
            &["Audit pages without a title tag"],
            &["technical", "technical.missingTitlesPercent"],
        ),
    ]);

    assert_eq!(merged.len(), 1);
    let combined = &merged[0];
    assert_eq!(combined.title, "Optimize Title Tags");
    assert_eq!(combined.impact_score, 4.0);
    assert_eq!(combined.priority, Priority::High);
    assert_eq!(
        combined.actions,
        vec![
            "Add unique title tags to every page".to_string(),
            "Audit pages without a title tag".to_string(),
        ]
    );
    assert_eq!(
        combined.related_items,
        vec![
            "Missing Page Titles".to_string(),
            "technical".to_string(),
            "technical.missingTitlesPercent".to_string(),
        ]
    );
}

#[test]
fn test_overlapping_actions_merge() {
    let merged = RecommendationMerger::merge(vec![
        recommendation(
            "Implement Structured Data",
            Category::Technical,
            2.0,
            &[
                "Add Organization and WebSite schema to the home page",
                "Mark up products with schema.org types",
            ],
            &[],
        ),
        recommendation(
            "Implement Schema Markup",
            Category::Technical,
            3.0,
            &["add organization and website schema to the home page"],
            &[],
        ),
    ]);

    assert_eq!(merged.len(), 1);
    // Exact duplicates are not repeated; case differences are kept as written
    assert_eq!(merged[0].actions.len(), 3);
    assert_eq!(merged[0].priority, Priority::Medium);
}

#[test]
fn test_different_categories_never_merge() {
    let left = recommendation(
        "Improve Page Speed",
        Category::Performance,
        3.0,
        &["Compress and lazy-load images"],
        &[],
    );
    let right = recommendation(
        "Improve Page Speed",
        Category::OnPage,
        3.0,
        &["Compress and lazy-load images"],
        &[],
    );

    assert!(!is_similar(&left, &right));
    assert_eq!(RecommendationMerger::merge(vec![left, right]).len(), 2);
}

#[test]
fn test_distinct_recommendations_keep_first_occurrence_order() {
    let input = vec![
        recommendation(
            "Expand Thin Content",
            Category::Content,
            4.0,
            &["Expand thin pages"],
            &[],
        ),
        recommendation(
            "Fix Heading Structure",
            Category::Content,
            2.0,
            &["Add exactly one descriptive H1 to each page"],
            &[],
        ),
        recommendation(
            "Improve Page Speed",
            Category::Performance,
            3.0,
            &["Enable browser caching and a CDN"],
            &[],
        ),
        recommendation(
            "Expand Content Depth",
            Category::Content,
            5.0,
            &["Expand thin pages with in-depth, original copy"],
            &[],
        ),
    ];

    let merged = RecommendationMerger::merge(input);
    assert_eq!(
        titles(&merged),
        vec![
            "Expand Thin Content",
            "Fix Heading Structure",
            "Improve Page Speed"
        ]
    );
    assert_eq!(merged[0].impact_score, 5.0);
    assert_eq!(merged[0].priority, Priority::Critical);
}

#[test]
fn test_merge_is_idempotent() {
    let input = vec![
        recommendation("Optimize Title Tags", Category::Technical, 3.0, &["a"], &[]),
        recommendation("Fix Missing Title Tags", Category::Technical, 4.0, &["b"], &[]),
        recommendation("Improve Page Speed", Category::Performance, 2.0, &["c"], &[]),
        recommendation("Reduce Page Load Time", Category::Performance, 4.0, &["c"], &[]),
        recommendation("Add Image Alt Text", Category::OnPage, 1.0, &["d"], &[]),
    ];

    let once = RecommendationMerger::merge(input.clone());
    let twice = RecommendationMerger::merge(once.clone());

    assert_eq!(once, twice);
    assert!(once.len() <= input.len());
    assert_eq!(once.len(), 3);
}

#[test]
fn test_empty_input() {
    assert!(RecommendationMerger::merge(Vec::new()).is_empty());
}

#[test]
fn test_collect_puts_opportunities_first() {
    let opportunity = Opportunity {
        title: "Improve Page Speed".to_string(),
        description: "Pages load slower than competitor pages".to_string(),
        category: Category::Performance,
        impact_score: 3.6,
        actions: vec!["Compress and lazy-load images".to_string()],
        related_gaps: vec!["Slow Page Load Time".to_string()],
    };
    let benchmark = Recommendation::from_benchmark(
        "Reduce Click Depth",
        "averageDepth: 5.0 vs. competitor average 3.0",
        Category::Structure,
        ImpactLevel::Medium,
        &["Add hub pages that link to deep content"],
        vec!["structure".to_string()],
    );

    let collected = RecommendationMerger::collect(&[opportunity], &[benchmark]);

    assert_eq!(titles(&collected), vec!["Improve Page Speed", "Reduce Click Depth"]);
    assert_eq!(collected[0].source, RecommendationSource::GapAnalysis);
    assert_eq!(collected[0].priority, Priority::High);
    assert_eq!(collected[0].related_items, vec!["Slow Page Load Time".to_string()]);
    assert_eq!(collected[1].source, RecommendationSource::Benchmark);
    assert_eq!(collected[1].impact_score, 3.0);
}
