use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Configuration file structure that mirrors CLI arguments
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// The client domain to analyze
    pub client: Option<String>,

    /// Competitor domains
    pub competitors: Option<Vec<String>>,

    /// Keywords to track
    pub keywords: Option<Vec<String>>,

    /// Directory or http(s) endpoint serving site summaries
    pub source: Option<String>,

    /// Strategy timeline length in months
    pub months: Option<u32>,

    /// First day of the plan, YYYY-MM-DD
    pub start_date: Option<String>,

    /// Industry benchmark table
    pub benchmarks: Option<String>,

    /// Score history file
    pub history: Option<String>,

    /// Where to write the updated score history
    pub save_history: Option<String>,

    /// Output format: text or json
    pub output: Option<String>,

    /// Save report to file
    pub save: Option<String>,

    /// Verbose output
    pub verbose: Option<bool>,

    /// Rate limit for metrics requests per second
    pub rate_limit: Option<f64>,

    /// Number of concurrent metrics requests
    pub concurrency: Option<usize>,
}

/// Data file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    pub const ALL: [ConfigFormat; 3] = [ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml];

    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }

    /// Parse file contents in this format
    pub fn parse<T: DeserializeOwned>(&self, contents: &str, path: &Path) -> Result<T> {
        let value = match self {
            ConfigFormat::Json => serde_json::from_str(contents)
                .with_context(|| format!("Failed to parse JSON file: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(contents)
                .with_context(|| format!("Failed to parse TOML file: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(contents)
                .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?,
        };
        Ok(value)
    }

    /// Render a value in this format
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = match self {
            ConfigFormat::Json => serde_json::to_string_pretty(value)?,
            ConfigFormat::Toml => toml::to_string_pretty(value)?,
            ConfigFormat::Yaml => serde_yaml::to_string(value)?,
        };
        Ok(rendered)
    }
}

/// Read and parse a JSON, TOML or YAML data file, choosing the format by extension
pub fn load_data_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let format = ConfigFormat::from_path(path)
        .with_context(|| format!("Unsupported file format: {}", path.display()))?;

    format.parse(&contents, path)
}

/// Write a data file in the format matching its extension; unknown extensions get JSON
pub fn save_data_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let format = ConfigFormat::from_path(path).unwrap_or(ConfigFormat::Json);
    let rendered = format.render(value)?;
    fs::write(path, rendered).with_context(|| format!("Failed to write file: {}", path.display()))
}

/// `<dir>/<stem>.<ext>` for every supported extension, in lookup order
fn candidate_files(dir: &Path, stem: &str) -> impl Iterator<Item = PathBuf> {
    let dir = dir.to_path_buf();
    let stem = stem.to_string();
    ConfigFormat::ALL.into_iter().flat_map(move |format| {
        let dir = dir.clone();
        let stem = stem.clone();
        format
            .extensions()
            .iter()
            .map(move |ext| dir.join(format!("{}.{}", stem, ext)))
            .collect::<Vec<_>>()
    })
}

/// Keep the CLI value unless it still equals its clap default
fn prefer_cli<T: PartialEq + Clone>(cli: &T, default: T, config: Option<&T>) -> T {
    match config {
        Some(value) if *cli == default => value.clone(),
        _ => cli.clone(),
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        load_data_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Candidate config files, highest priority first: `./rivalscope.*`, then
    /// `$XDG_CONFIG_HOME/rivalscope/config.*` (or `~/.config/rivalscope/config.*`)
    pub fn default_paths() -> Vec<PathBuf> {
        let config_home = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        let mut paths: Vec<PathBuf> = candidate_files(Path::new(""), "rivalscope").collect();
        if let Some(config_home) = config_home {
            paths.extend(candidate_files(&config_home.join("rivalscope"), "config"));
        }
        paths
    }

    /// First configuration file found on the default paths, if any
    pub fn from_default_paths() -> Result<Option<Self>> {
        Self::default_paths()
            .into_iter()
            .find(|path| path.exists())
            .map(|path| Self::from_file(&path))
            .transpose()
    }

    /// Load the explicit config file if one was given, otherwise search the default paths
    pub fn load(explicit: Option<&str>) -> Result<Option<Self>> {
        match explicit {
            Some(path) => Self::from_file(Path::new(path)).map(Some),
            None => Self::from_default_paths(),
        }
    }

    /// Overlay CLI arguments on this configuration.
    /// A CLI value wins unless it is still the clap default; empty lists fall back to the config.
    pub fn merge_with_cli(&self, cli: &Cli) -> Cli {
        let list = |cli_values: &Vec<String>, config_values: &Option<Vec<String>>| {
            if cli_values.is_empty() {
                config_values.clone().unwrap_or_default()
            } else {
                cli_values.clone()
            }
        };

        Cli {
            client: prefer_cli(&cli.client, String::new(), self.client.as_ref()),
            competitors: list(&cli.competitors, &self.competitors),
            keywords: list(&cli.keywords, &self.keywords),
            source: prefer_cli(&cli.source, ".".to_string(), self.source.as_ref()),
            months: prefer_cli(&cli.months, 6, self.months.as_ref()),
            start_date: cli.start_date.clone().or_else(|| self.start_date.clone()),
            benchmarks: cli.benchmarks.clone().or_else(|| self.benchmarks.clone()),
            history: cli.history.clone().or_else(|| self.history.clone()),
            save_history: cli.save_history.clone().or_else(|| self.save_history.clone()),
            output: prefer_cli(&cli.output, "text".to_string(), self.output.as_ref()),
            save: cli.save.clone().or_else(|| self.save.clone()),
            verbose: prefer_cli(&cli.verbose, false, self.verbose.as_ref()),
            rate_limit: cli.rate_limit.or(self.rate_limit),
            concurrency: prefer_cli(&cli.concurrency, 5, self.concurrency.as_ref()),
            config: cli.config.clone(),
        }
    }
}
