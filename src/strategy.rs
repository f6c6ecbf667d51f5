use crate::models::{
    Category, MapLink, MapNode, NodeKind, Phase, Priority, Recommendation, ResourceAllocation,
    Resources, RoiProjection, StrategyMap, Task, Timeline,
};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TIMELINE_MONTHS: u32 = 6;

// Return per unit of projected impact (unverified tuning)
const RETURN_MULTIPLIER: f64 = 1.5;
const IMPACT_VALUE: f64 = 200.0;
const HIGH_LEVERAGE_MULTIPLIER: f64 = 1.2;
const EXTRA_DAYS_FOR_HEAVY_CATEGORIES: i64 = 2;

struct PhaseTemplate {
    name: &'static str,
    description: &'static str,
    months: u32,
    max_tasks: usize,
    priorities: &'static [Priority],
}

const PHASES: [PhaseTemplate; 3] = [
    PhaseTemplate {
        name: "Quick Wins",
        description: "High-impact fixes that can ship immediately",
        months: 1,
        max_tasks: 5,
        priorities: &[Priority::Critical, Priority::High],
    },
    PhaseTemplate {
        name: "Core Improvements",
        description: "Foundational work on the main ranking factors",
        months: 2,
        max_tasks: 8,
        priorities: &[Priority::High, Priority::Medium],
    },
    PhaseTemplate {
        name: "Advanced Optimization",
        description: "Longer-term refinements and competitive polish",
        months: 3,
        max_tasks: 12,
        priorities: &[Priority::Medium, Priority::Low],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyPlan {
    pub recommendations: Vec<Recommendation>,
    pub timeline: Timeline,
    pub resource_allocation: ResourceAllocation,
    pub roi_projection: RoiProjection,
    pub strategy_map: StrategyMap,
}

impl StrategyPlan {
    /// Every recommendation, scheduled or not
    pub fn all_recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn scheduled_tasks(&self) -> impl Iterator<Item = &Task> {
        self.timeline.phases.iter().flat_map(|phase| phase.tasks.iter())
    }
}

pub struct StrategyPlanner {
    months: u32,
}

impl Default for StrategyPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMELINE_MONTHS)
    }
}

impl StrategyPlanner {
    pub fn new(months: u32) -> Self {
        Self { months }
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn plan(&self, recommendations: &[Recommendation], start: NaiveDate) -> StrategyPlan {
        let timeline = self.build_timeline(recommendations, start);
        let resource_allocation = Self::allocate_resources(recommendations, &timeline);
        let roi_projection = self.project_roi(&timeline);
        let strategy_map = Self::build_strategy_map(recommendations);

        StrategyPlan {
            recommendations: recommendations.to_vec(),
            timeline,
            resource_allocation,
            roi_projection,
            strategy_map,
        }
    }

    /// Assign recommendations to phases and lay their tasks out in time
    pub fn build_timeline(&self, recommendations: &[Recommendation], start: NaiveDate) -> Timeline {
        let end = add_months(start, self.months);

        let mut buckets: Vec<Vec<&Recommendation>> = vec![Vec::new(); PHASES.len()];
        for recommendation in recommendations {
            let slot = PHASES
                .iter()
                .enumerate()
                .position(|(index, template)| {
                    template.priorities.contains(&recommendation.priority)
                        && buckets[index].len() < template.max_tasks
                })
                .or_else(|| {
                    let last = PHASES.len() - 1;
                    (buckets[last].len() < PHASES[last].max_tasks).then_some(last)
                });

            match slot {
                Some(index) => buckets[index].push(recommendation),
                None => tracing::debug!(
                    title = %recommendation.title,
                    "No phase capacity left, recommendation not scheduled"
                ),
            }
        }

        let mut cursor = start;
        let phases = PHASES
            .iter()
            .zip(buckets)
            .map(|(template, members)| {
                let phase_start = cursor.min(end);
                let phase_end = add_months(phase_start, template.months).min(end);
                cursor = phase_end;

                Phase {
                    name: template.name.to_string(),
                    description: template.description.to_string(),
                    priorities: template.priorities.to_vec(),
                    duration_months: template.months,
                    max_tasks: template.max_tasks,
                    start_date: phase_start,
                    end_date: phase_end,
                    tasks: layout_tasks(&members, phase_start, phase_end),
                }
            })
            .collect();

        Timeline {
            start_date: start,
            end_date: end,
            phases,
        }
    }

    /// Working days a recommendation needs
    pub fn task_duration_days(recommendation: &Recommendation) -> i64 {
        let base = match recommendation.priority {
            Priority::Critical => 2,
            Priority::High => 3,
            Priority::Medium => 5,
            Priority::Low => 7,
        };
        let action_days = recommendation.actions.len().div_ceil(2) as i64;
        let extra = if matches!(recommendation.category, Category::Content | Category::Technical) {
            EXTRA_DAYS_FOR_HEAVY_CATEGORIES
        } else {
            0
        };
        base + action_days + extra
    }

    pub fn estimate_resources(
        priority: Priority,
        category: Category,
        action_count: usize,
    ) -> Resources {
        let (hours, cost) = match priority {
            Priority::Critical => (16.0, 2000.0),
            Priority::High => (12.0, 1500.0),
            Priority::Medium => (8.0, 1000.0),
            Priority::Low => (4.0, 500.0),
        };
        let technical = match category {
            Category::Technical | Category::Performance => 3.0,
            Category::OnPage | Category::Structure => 2.0,
            _ => 1.0,
        };
        let content = match category {
            Category::Content | Category::Keywords => 3.0,
            Category::OnPage => 2.0,
            _ => 1.0,
        };

        Resources {
            time: hours + action_count as f64 * 2.0,
            technical,
            content,
            cost: cost + action_count as f64 * 100.0,
        }
    }

    /// Totals cover every recommendation; the phase breakdown covers scheduled tasks
    pub fn allocate_resources(
        recommendations: &[Recommendation],
        timeline: &Timeline,
    ) -> ResourceAllocation {
        let mut allocation = ResourceAllocation {
            by_priority: Priority::ALL
                .iter()
                .map(|priority| (*priority, Resources::default()))
                .collect(),
            by_phase: timeline
                .phases
                .iter()
                .map(|phase| (phase.name.clone(), Resources::default()))
                .collect(),
            ..Default::default()
        };

        for recommendation in recommendations {
            let estimate = Self::estimate_resources(
                recommendation.priority,
                recommendation.category,
                recommendation.actions.len(),
            );
            allocation.total += estimate;
            *allocation
                .by_priority
                .entry(recommendation.priority)
                .or_default() += estimate;
            *allocation
                .by_category
                .entry(recommendation.category)
                .or_default() += estimate;
        }

        for phase in &timeline.phases {
            for task in &phase.tasks {
                let estimate =
                    Self::estimate_resources(task.priority, task.category, task.actions.len());
                *allocation.by_phase.entry(phase.name.clone()).or_default() += estimate;
            }
        }

        allocation
    }

    /// Month-by-month investment, return and cumulative ROI
    pub fn project_roi(&self, timeline: &Timeline) -> RoiProjection {
        let months = self.months as usize;
        let start = timeline.start_date;
        let mut projection = RoiProjection {
            months: (0..months)
                .map(|offset| add_months(start, offset as u32).format("%Y-%m").to_string())
                .collect(),
            investment: vec![0.0; months],
            returns: vec![0.0; months],
            cumulative_roi: vec![0.0; months],
        };
        if months == 0 {
            return projection;
        }

        for task in timeline.phases.iter().flat_map(|phase| phase.tasks.iter()) {
            let first = month_index(start, task.start_date, months);
            let last = month_index(start, task.end_date, months).max(first);
            let cost =
                Self::estimate_resources(task.priority, task.category, task.actions.len()).cost;

            let span = (last - first + 1) as f64;
            for month in first..=last {
                projection.investment[month] += cost / span;
            }

            let monthly_return = task_impact(task) * RETURN_MULTIPLIER;
            for month in (last + 1)..months {
                projection.returns[month] += monthly_return;
            }
        }

        let mut invested = 0.0;
        let mut returned = 0.0;
        for month in 0..months {
            invested += projection.investment[month];
            returned += projection.returns[month];
            projection.cumulative_roi[month] = if invested > 0.0 {
                (returned - invested) / invested * 100.0
            } else {
                0.0
            };
        }

        projection
    }

    /// Graph of recommendations, their categories and shared references
    pub fn build_strategy_map(recommendations: &[Recommendation]) -> StrategyMap {
        let mut map = StrategyMap::default();
        let mut category_impact: BTreeMap<Category, f64> = BTreeMap::new();

        for (index, recommendation) in recommendations.iter().enumerate() {
            let id = recommendation_id(index);
            map.nodes.push(MapNode {
                id: id.clone(),
                name: recommendation.title.clone(),
                kind: NodeKind::Recommendation,
                category: recommendation.category,
                impact: recommendation.impact_score,
                priority: Some(recommendation.priority),
            });
            map.links.push(MapLink {
                source: id,
                target: category_id(recommendation.category),
                weight: recommendation.impact_score,
            });
            *category_impact.entry(recommendation.category).or_default() +=
                recommendation.impact_score;
        }

        for (category, impact) in category_impact {
            map.nodes.push(MapNode {
                id: category_id(category),
                name: category.label().to_string(),
                kind: NodeKind::Category,
                category,
                impact,
                priority: None,
            });
        }

        // One undirected link per pair sharing a reference
        for (i, left) in recommendations.iter().enumerate() {
            for (j, right) in recommendations.iter().enumerate().skip(i + 1) {
                let shared = left
                    .related_items
                    .iter()
                    .any(|item| right.related_items.contains(item));
                if shared {
                    map.links.push(MapLink {
                        source: recommendation_id(i),
                        target: recommendation_id(j),
                        weight: 1.0,
                    });
                }
            }
        }

        map
    }
}

fn layout_tasks(
    members: &[&Recommendation],
    phase_start: NaiveDate,
    phase_end: NaiveDate,
) -> Vec<Task> {
    let phase_days = (phase_end - phase_start).num_days().max(0);
    let count = members.len();

    members
        .iter()
        .enumerate()
        .map(|(index, recommendation)| {
            let offset = (index as f64 * phase_days as f64 / count as f64).round() as u64;
            let start_date = (phase_start + Days::new(offset)).min(phase_end);
            let duration_days = StrategyPlanner::task_duration_days(recommendation);
            let end_date = (start_date + Days::new(duration_days as u64)).min(phase_end);

            Task {
                title: recommendation.title.clone(),
                description: recommendation.description.clone(),
                category: recommendation.category,
                priority: recommendation.priority,
                impact_score: recommendation.impact_score,
                actions: recommendation.actions.clone(),
                duration_days,
                start_date,
                end_date,
            }
        })
        .collect()
}

fn task_impact(task: &Task) -> f64 {
    let priority_multiplier = match task.priority {
        Priority::Critical => 2.0,
        Priority::High => 1.5,
        Priority::Medium => 1.0,
        Priority::Low => 0.5,
    };
    let leverage = if matches!(task.category, Category::Performance | Category::Technical) {
        HIGH_LEVERAGE_MULTIPLIER
    } else {
        1.0
    };
    task.impact_score * IMPACT_VALUE * priority_multiplier * leverage
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX)
}

/// Whole calendar months from `start` to `date`, clamped to the projection
fn month_index(start: NaiveDate, date: NaiveDate, months: usize) -> usize {
    let mut elapsed =
        (date.year() - start.year()) * 12 + date.month() as i32 - start.month() as i32;
    if date.day() < start.day() {
        elapsed -= 1;
    }
    elapsed.clamp(0, months as i32 - 1) as usize
}

fn recommendation_id(index: usize) -> String {
    format!("rec-{}", index)
}

fn category_id(category: Category) -> String {
    format!("category-{}", category.key())
}
