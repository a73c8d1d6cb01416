use crate::config::model::DepreciationMethod;
use crate::config::toml_config::{SourceKind, TomlConfig};
use crate::config::{OutputFormat, RunConfig};
use crate::domain::model::RunMode;
use crate::utils::error::Result;
use clap::Parser;

pub const DEFAULT_CONFIG_PATH: &str = "dcf.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "dcf")]
#[command(about = "Estimate a company's intrinsic share price with a discounted cash flow model")]
pub struct CliConfig {
    /// Stock ticker symbol, e.g. AAPL
    pub ticker: String,

    /// Projection horizon in years (positive integer)
    #[arg(allow_hyphen_values = true)]
    pub years: String,

    /// Growth case: 1 = base, 2 = bull, 3 = bear
    pub case: String,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print projected revenue only, skip discounting
    #[arg(long)]
    pub projection_only: bool,

    /// Read the company snapshot from a JSON file instead of the data provider
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Directory to write the valuation report into
    #[arg(short, long)]
    pub output: Option<String>,

    /// Report formats to write
    #[arg(long, value_delimiter = ',')]
    pub format: Vec<OutputFormat>,

    #[arg(long)]
    pub risk_free_rate: Option<f64>,

    #[arg(long)]
    pub market_return: Option<f64>,

    #[arg(long)]
    pub terminal_growth: Option<f64>,

    /// ratio-of-capex or historical-average
    #[arg(long)]
    pub depreciation: Option<DepreciationMethod>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log phase timings and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// Loads the configuration file and applies command-line overrides on top of it.
    pub fn into_run_config(self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::load_or_default(path, true)?,
            None => TomlConfig::load_or_default(DEFAULT_CONFIG_PATH, false)?,
        };
        self.apply(file)
    }

    pub fn apply(self, mut file: TomlConfig) -> Result<RunConfig> {
        if let Some(rate) = self.risk_free_rate {
            file.model.risk_free_rate = rate;
        }
        if let Some(rate) = self.market_return {
            file.model.market_return = rate;
        }
        if let Some(rate) = self.terminal_growth {
            file.model.terminal_growth_rate = rate;
        }
        if let Some(method) = self.depreciation {
            file.model.depreciation_method = method;
        }
        if let Some(path) = self.snapshot {
            file.source.r#type = SourceKind::File;
            file.source.snapshot_path = Some(path);
        }
        if let Some(path) = self.output {
            file.output.path = Some(path);
        }
        if !self.format.is_empty() {
            file.output.formats = self.format;
        }

        let mut config = RunConfig::from_inputs(&self.ticker, &self.years, &self.case, file)?;
        if self.projection_only {
            config.mode = RunMode::ProjectionOnly;
        }
        config.monitor |= self.monitor;
        config.json_logs |= self.log_json;
        Ok(config)
    }
}
