use crate::models::{Opportunity, Priority, Recommendation};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Title similarity above which two recommendations are merged (unverified tuning)
const TITLE_SIMILARITY_THRESHOLD: f64 = 0.7;
/// Action similarity above which two actions count as overlapping (unverified tuning)
const ACTION_SIMILARITY_THRESHOLD: f64 = 0.8;

// Action verbs and filler words ignored when comparing titles
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "improve",
        "optimize",
        "fix",
        "add",
        "implement",
        "increase",
        "reduce",
        "enhance",
        "expand",
        "strengthen",
        "target",
        "create",
        "update",
        "address",
        "the",
        "a",
        "an",
        "and",
        "of",
        "for",
        "to",
        "on",
        "in",
    ]
    .into_iter()
    .collect()
});

/// Lowercase, strip punctuation and drop stop words
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `1 - distance / max_len`; two empty strings are identical
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

fn titles_similar(a: &str, b: &str) -> bool {
    let a = normalize_title(a);
    let b = normalize_title(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a) || levenshtein_ratio(&a, &b) > TITLE_SIMILARITY_THRESHOLD
}

fn actions_overlap(a: &[String], b: &[String]) -> bool {
    let lower = |actions: &[String]| -> Vec<String> {
        actions
            .iter()
            .map(|action| action.trim().to_lowercase())
            .filter(|action| !action.is_empty())
            .collect()
    };
    let a = lower(a);
    let b = lower(b);

    a.iter().any(|left| {
        b.iter().any(|right| {
            left.contains(right.as_str())
                || right.contains(left.as_str())
                || levenshtein_ratio(left, right) > ACTION_SIMILARITY_THRESHOLD
        })
    })
}

/// Whether two recommendations describe the same piece of work
pub fn is_similar(a: &Recommendation, b: &Recommendation) -> bool {
    a.category == b.category
        && (titles_similar(&a.title, &b.title) || actions_overlap(&a.actions, &b.actions))
}

pub struct RecommendationMerger;

impl RecommendationMerger {
    /// Bring opportunities and benchmark suggestions into one list, opportunities first
    pub fn collect(
        opportunities: &[Opportunity],
        benchmark_recommendations: &[Recommendation],
    ) -> Vec<Recommendation> {
        opportunities
            .iter()
            .map(Recommendation::from_opportunity)
            .chain(benchmark_recommendations.iter().cloned())
            .collect()
    }

    /// Merge near-duplicates. Output keeps the order of first occurrence.
    pub fn merge(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        let mut current = recommendations;
        loop {
            let before = current.len();
            current = Self::merge_pass(current);
            if current.len() == before {
                return current;
            }
            tracing::debug!(before, after = current.len(), "Merged similar recommendations");
        }
    }

    fn merge_pass(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        let mut processed = vec![false; recommendations.len()];
        let mut merged = Vec::with_capacity(recommendations.len());

        for i in 0..recommendations.len() {
            if processed[i] {
                continue;
            }
            processed[i] = true;
            let mut combined = recommendations[i].clone();

            for j in (i + 1)..recommendations.len() {
                if !processed[j] && is_similar(&combined, &recommendations[j]) {
                    absorb(&mut combined, &recommendations[j]);
                    processed[j] = true;
                }
            }

            merged.push(combined);
        }

        merged
    }
}

fn absorb(target: &mut Recommendation, other: &Recommendation) {
    for action in &other.actions {
        if !target.actions.contains(action) {
            target.actions.push(action.clone());
        }
    }
    for item in &other.related_items {
        if !target.related_items.contains(item) {
            target.related_items.push(item.clone());
        }
    }
    if other.impact_score > target.impact_score {
        target.impact_score = other.impact_score;
    }
    target.priority = Priority::from_impact(target.impact_score);
}
