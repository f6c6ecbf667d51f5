pub mod benchmark;
pub mod cli;
pub mod config;
pub mod gap_scorer;
pub mod http_client;
pub mod merger;
pub mod metrics;
pub mod models;
pub mod reporter;
pub mod strategy;

use anyhow::{Context, Result, bail};
use benchmark::{BenchmarkAnalysis, BenchmarkEngine, IndustryBenchmarks};
use chrono::NaiveDate;
use cli::Cli;
use colored::*;
use config::{Config, load_data_file, save_data_file};
use gap_scorer::{GapAnalysis, GapScorer};
use merger::RecommendationMerger;
use metrics::{collect_site_summaries, provider_for_source};
use models::{CompetitorSet, HistoryData, SiteSummary, sort_by_impact};
use reporter::Reporter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strategy::{StrategyPlan, StrategyPlanner};

/// Everything one analysis job needs, already fetched
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub client: SiteSummary,
    pub competitors: CompetitorSet,
    /// Empty means every keyword found in the summaries
    pub keywords: Vec<String>,
    pub industry: IndustryBenchmarks,
    pub history: HistoryData,
    pub months: u32,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub gap_analysis: GapAnalysis,
    pub benchmark: BenchmarkAnalysis,
    pub strategy: StrategyPlan,
}

/// Run the four analysis stages. Pure: same input, same output.
pub fn analyze(input: &AnalysisInput) -> AnalysisResult {
    let gap_analysis = GapScorer::analyze(&input.client, &input.competitors, &input.keywords);

    let benchmark = BenchmarkEngine::new(input.industry.clone()).analyze(
        &input.client,
        &input.competitors,
        &input.keywords,
        &input.history,
        input.start_date,
    );

    let mut recommendations = RecommendationMerger::merge(RecommendationMerger::collect(
        &gap_analysis.opportunities,
        &benchmark.recommendations,
    ));
    sort_by_impact(&mut recommendations, |recommendation| {
        recommendation.impact_score
    });

    let strategy = StrategyPlanner::new(input.months).plan(&recommendations, input.start_date);

    tracing::info!(
        gaps = gap_analysis.all_gaps().count(),
        opportunities = gap_analysis.opportunities.len(),
        recommendations = recommendations.len(),
        overall = gap_analysis.scores.overall,
        "Analysis complete"
    );

    AnalysisResult {
        gap_analysis,
        benchmark,
        strategy,
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let args = match Config::load(args.config.as_deref())? {
        Some(config) => config.merge_with_cli(&args),
        None => args,
    };

    // Validate input
    if args.client.trim().is_empty() {
        bail!("Client domain must not be empty");
    }
    if args.output != "text" && args.output != "json" {
        bail!("Output format must be text or json, got '{}'", args.output);
    }
    if args.months == 0 {
        bail!("Timeline must span at least one month");
    }

    let start_date = match &args.start_date {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid start date '{}', expected YYYY-MM-DD", date))?,
        None => chrono::Local::now().date_naive(),
    };

    let text_output = args.output == "text";
    if text_output {
        println!(
            "{}",
            "Rivalscope - Competitive SEO Gap Analyzer"
                .bright_cyan()
                .bold()
        );
        println!("{}", "=".repeat(50).bright_blue());
        println!();
        println!("{} {}", "Client:".bright_white().bold(), args.client);
        println!(
            "{} {}",
            "Competitors:".bright_white().bold(),
            args.competitors.len()
        );
        println!("{} {}", "Source:".bright_white().bold(), args.source);
        println!();
    }

    if args.competitors.is_empty() {
        tracing::warn!("No competitors given, there is nothing to compare against");
    }

    let industry = match &args.benchmarks {
        Some(path) => IndustryBenchmarks::from_file(Path::new(path))?,
        None => IndustryBenchmarks::default(),
    };

    let history: HistoryData = match &args.history {
        Some(path) if Path::new(path).exists() => load_data_file(Path::new(path))
            .with_context(|| format!("Failed to load score history: {}", path))?,
        Some(path) => {
            tracing::warn!(path = %path, "History file not found, starting a new history");
            HistoryData::new()
        }
        None => HistoryData::new(),
    };

    if args.verbose && text_output {
        println!("{}", "Fetching site summaries...".bright_yellow());
    }

    let provider = provider_for_source(&args.source, args.rate_limit)?;
    let site_data = collect_site_summaries(
        provider.as_ref(),
        &args.client,
        &args.competitors,
        args.concurrency,
        args.verbose && text_output,
    )
    .await?;

    let input = AnalysisInput {
        client: site_data.client.clone(),
        competitors: site_data.competitors.clone(),
        keywords: args.keywords.clone(),
        industry,
        history,
        months: args.months,
        start_date,
    };
    let result = analyze(&input);

    if let Some(path) = &args.save_history {
        save_data_file(Path::new(path), &result.benchmark.histories())
            .with_context(|| format!("Failed to save score history: {}", path))?;
        tracing::info!(path = %path, "Score history saved");
    }

    let report = Reporter::generate_report(&site_data, result);

    // Output report
    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        _ => {
            Reporter::print_text_report(&report);
        }
    }

    // Save to file if requested
    if let Some(filename) = args.save {
        Reporter::save_json_report(&report, &filename)?;
    }

    Ok(())
}
