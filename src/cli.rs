use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "rivalscope")]
#[command(
    about = "A CLI competitive SEO gap analyzer and strategy planner",
    long_about = None
)]
pub struct Cli {
    /// The client domain to analyze
    #[arg(value_name = "CLIENT")]
    pub client: String,

    /// Competitor domain (repeatable)
    #[arg(short = 'C', long = "competitor", value_name = "DOMAIN")]
    pub competitors: Vec<String>,

    /// Keyword to track (repeatable; default: every keyword found in the data)
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Where site summaries come from: a directory or an http(s) metrics endpoint
    #[arg(long, default_value = ".")]
    pub source: String,

    /// Strategy timeline length in months (default: 6)
    #[arg(short, long, default_value_t = 6)]
    pub months: u32,

    /// First day of the plan, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Industry benchmark table (JSON, TOML, or YAML)
    #[arg(long)]
    pub benchmarks: Option<String>,

    /// Score history file used for trend forecasts
    #[arg(long)]
    pub history: Option<String>,

    /// Write the updated score history to this file
    #[arg(long)]
    pub save_history: Option<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub output: String,

    /// Save report to file
    #[arg(short, long)]
    pub save: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Rate limit for metrics requests per second (optional, e.g., 1.0 for 1 req/s)
    #[arg(short = 'r', long)]
    pub rate_limit: Option<f64>,

    /// Number of concurrent metrics requests (default: 5)
    #[arg(short = 'c', long, default_value_t = 5)]
    pub concurrency: usize,

    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long)]
    pub config: Option<String>,
}
