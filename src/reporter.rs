use crate::AnalysisResult;
use crate::metrics::SiteData;
use crate::models::{Category, Priority};
use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Number of recommendations listed in the text report
const TOP_RECOMMENDATIONS: usize = 10;
/// Gaps listed per category in the text report
const GAPS_PER_CATEGORY: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub client: String,
    pub competitors: Vec<String>,
    pub skipped_competitors: Vec<String>,
    pub timestamp: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

pub struct Reporter;

impl Reporter {
    pub fn generate_report(site_data: &SiteData, result: AnalysisResult) -> AnalysisReport {
        let (usable, skipped): (Vec<_>, Vec<_>) = site_data
            .competitors
            .iter()
            .partition(|(_, summary)| summary.is_usable());

        AnalysisReport {
            client: site_data.client.domain.clone(),
            competitors: usable.into_iter().map(|(domain, _)| domain.clone()).collect(),
            skipped_competitors: skipped
                .into_iter()
                .map(|(domain, _)| domain.clone())
                .collect(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            result,
        }
    }

    pub fn print_text_report(report: &AnalysisReport) {
        let result = &report.result;

        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "Rivalscope - Competitive Analysis Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();

        println!("{}: {}", "Client".bright_white().bold(), report.client);
        println!(
            "{}: {}",
            "Competitors".bright_white().bold(),
            if report.competitors.is_empty() {
                "none".dimmed().to_string()
            } else {
                report.competitors.join(", ")
            }
        );
        if !report.skipped_competitors.is_empty() {
            println!(
                "{}: {}",
                "Skipped".bright_white().bold(),
                report.skipped_competitors.join(", ").yellow()
            );
        }
        println!("{}: {}", "Timestamp".bright_white().bold(), report.timestamp);
        println!();

        // Scores
        println!("{}", "Scores".bright_yellow().bold().underline());
        println!(
            "  {:<16} {:>7} {:>11} {:>10} {:>6}",
            "Category", "Gaps", "Benchmark", "Industry", "Rank"
        );
        for category in Category::ALL {
            let score = result.gap_analysis.scores.category(category);
            let benchmark = result.benchmark.benchmarks.get(&category);
            let rank = result
                .benchmark
                .rankings
                .get(&category)
                .map(|ranking| format!("{}/{}", ranking.client_rank, ranking.competitors.len() + 1))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<16} {:>7} {:>11} {:>10} {:>6}",
                category.label(),
                colored_score(score),
                benchmark
                    .map(|b| format!("{:.0}", b.client_score))
                    .unwrap_or_else(|| "-".to_string()),
                benchmark
                    .map(|b| format!("{:.0}", b.industry_benchmark))
                    .unwrap_or_else(|| "-".to_string()),
                rank
            );
        }
        println!(
            "  {:<16} {:>7}",
            "Overall".bold(),
            colored_score(result.gap_analysis.scores.overall)
        );
        println!();

        // Gaps
        let gap_count = result.gap_analysis.all_gaps().count();
        if gap_count > 0 {
            println!("{}", "Top Gaps".bright_yellow().bold().underline());
            for (category, gaps) in &result.gap_analysis.gaps {
                if gaps.is_empty() {
                    continue;
                }
                println!("  {}", category.label().bright_white().bold());
                for gap in gaps.iter().take(GAPS_PER_CATEGORY) {
                    println!(
                        "    [{}] {}: {}",
                        format!("{:.1}", gap.impact_score).bright_red(),
                        gap.title,
                        gap.description.dimmed()
                    );
                }
            }
            println!();
        }

        // Recommendations
        let recommendations = result.strategy.all_recommendations();
        if !recommendations.is_empty() {
            println!("{}", "Recommendations".bright_yellow().bold().underline());
            for recommendation in recommendations.iter().take(TOP_RECOMMENDATIONS) {
                println!(
                    "  [{}] {} ({})",
                    colored_priority(recommendation.priority),
                    recommendation.title.bright_white(),
                    recommendation.category.label()
                );
                for action in &recommendation.actions {
                    println!("      - {}", action);
                }
            }
            if recommendations.len() > TOP_RECOMMENDATIONS {
                println!(
                    "  {}",
                    format!("... and {} more", recommendations.len() - TOP_RECOMMENDATIONS)
                        .dimmed()
                );
            }
            println!();
        }

        // Timeline
        let timeline = &result.strategy.timeline;
        println!("{}", "Timeline".bright_yellow().bold().underline());
        println!("  {} to {}", timeline.start_date, timeline.end_date);
        for phase in &timeline.phases {
            println!();
            println!(
                "  {} ({} to {})",
                phase.name.bright_white().bold(),
                phase.start_date,
                phase.end_date
            );
            if phase.tasks.is_empty() {
                println!("    {}", "No tasks".dimmed());
            }
            for task in &phase.tasks {
                println!(
                    "    {} - {}  [{}] {}",
                    task.start_date,
                    task.end_date,
                    colored_priority(task.priority),
                    task.title
                );
            }
        }
        println!();

        // Resources and ROI
        let total = &result.strategy.resource_allocation.total;
        println!("{}", "Resources".bright_yellow().bold().underline());
        println!("  Time:       {:.0} hours", total.time);
        println!("  Technical:  {:.0} units", total.technical);
        println!("  Content:    {:.0} units", total.content);
        println!("  Cost:       ${:.0}", total.cost);
        println!();

        let roi = &result.strategy.roi_projection;
        if let Some(final_roi) = roi.cumulative_roi.last() {
            println!("{}", "ROI Projection".bright_yellow().bold().underline());
            for (index, month) in roi.months.iter().enumerate() {
                println!(
                    "  {}  invest ${:>8.0}  return ${:>8.0}  cumulative {:>7.1}%",
                    month, roi.investment[index], roi.returns[index], roi.cumulative_roi[index]
                );
            }
            println!(
                "  Final cumulative ROI: {}",
                if *final_roi >= 0.0 {
                    format!("{:.1}%", final_roi).bright_green()
                } else {
                    format!("{:.1}%", final_roi).bright_red()
                }
            );
        }

        println!();
        println!("{}", "=".repeat(80).bright_blue());
    }

    pub fn save_json_report(report: &AnalysisReport, filename: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(filename)
            .with_context(|| format!("Failed to create report file: {}", filename))?;
        file.write_all(json.as_bytes())?;
        eprintln!("Report saved to: {}", filename.bright_green());
        Ok(())
    }
}

fn colored_score(score: f64) -> ColoredString {
    let text = format!("{:.1}", score);
    if score >= 80.0 {
        text.bright_green()
    } else if score >= 50.0 {
        text.yellow()
    } else {
        text.bright_red()
    }
}

fn colored_priority(priority: Priority) -> ColoredString {
    match priority {
        Priority::Critical => "CRITICAL".bright_red().bold(),
        Priority::High => "HIGH    ".bright_red(),
        Priority::Medium => "MEDIUM  ".yellow(),
        Priority::Low => "LOW     ".bright_cyan(),
    }
}
