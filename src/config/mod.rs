#[cfg(feature = "cli")]
pub mod cli;
pub mod model;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::RunMode;
use crate::domain::scenario::Scenario;
use crate::utils::error::{DcfError, Result};
use crate::utils::validation::{parse_years, validate_ticker, Validate};
use model::ModelConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use toml_config::{SourceConfig, TomlConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = DcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(DcfError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: json, csv".to_string(),
            }),
        }
    }
}

/// Validated settings for one valuation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub ticker: String,
    pub years: u32,
    pub scenario: Scenario,
    pub mode: RunMode,
    pub model: ModelConfig,
    pub source: SourceConfig,
    pub output_path: Option<String>,
    pub output_formats: Vec<OutputFormat>,
    pub monitor: bool,
    /// Logs as JSON lines instead of the compact format.
    pub json_logs: bool,
}

impl RunConfig {
    /// Validates the three positional inputs against a loaded file configuration.
    pub fn from_inputs(ticker: &str, years: &str, case: &str, file: TomlConfig) -> Result<Self> {
        let ticker = validate_ticker(ticker)?;
        let years = parse_years(years)?;
        let scenario = Scenario::from_str(case)?;
        let monitor = file.monitoring_enabled();
        let json_logs = file.json_logs_enabled();

        Ok(Self {
            ticker,
            years,
            scenario,
            mode: RunMode::Valuation,
            model: file.model,
            source: file.source,
            output_path: file.output.path,
            output_formats: file.output.formats,
            monitor,
            json_logs,
        })
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        let file_view = TomlConfig {
            model: self.model.clone(),
            source: self.source.clone(),
            output: toml_config::OutputConfig {
                path: self.output_path.clone(),
                formats: self.output_formats.clone(),
            },
            monitoring: None,
        };
        file_view.validate()
    }
}

impl ConfigProvider for RunConfig {
    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn years(&self) -> u32 {
        self.years
    }

    fn scenario(&self) -> Scenario {
        self.scenario
    }

    fn mode(&self) -> RunMode {
        self.mode
    }

    fn model(&self) -> &ModelConfig {
        &self.model
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_inputs() {
        let config = RunConfig::from_inputs("msft", "5", "2", TomlConfig::default()).unwrap();
        assert_eq!(config.ticker, "MSFT");
        assert_eq!(config.years, 5);
        assert_eq!(config.scenario, Scenario::Bull);
        assert_eq!(config.mode, RunMode::Valuation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_inputs_rejects_bad_values() {
        assert!(matches!(
            RunConfig::from_inputs("MSFT", "0", "1", TomlConfig::default()).unwrap_err(),
            DcfError::InvalidInput { .. }
        ));
        assert!(matches!(
            RunConfig::from_inputs("MSFT", "5", "4", TomlConfig::default()).unwrap_err(),
            DcfError::InvalidInput { .. }
        ));
        assert!(matches!(
            RunConfig::from_inputs("M$FT", "5", "1", TomlConfig::default()).unwrap_err(),
            DcfError::InvalidTicker { .. }
        ));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("tsv".parse::<OutputFormat>().is_err());
    }
}
