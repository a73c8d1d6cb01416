use crate::utils::error::{DcfError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;
pub const DEFAULT_MARKET_RETURN: f64 = 0.08;
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 0.03;
pub const DEFAULT_HISTORY_PERIODS: usize = 3;

/// How projected depreciation is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepreciationMethod {
    /// Historical mean of depreciation / capex applied to projected capex.
    RatioOfCapex,
    /// Flat historical mean of depreciation for every projected year.
    #[default]
    HistoricalAverage,
}

impl FromStr for DepreciationMethod {
    type Err = DcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ratio-of-capex" | "ratio_of_capex" | "legacy" => Ok(DepreciationMethod::RatioOfCapex),
            "historical-average" | "historical_average" | "average" => {
                Ok(DepreciationMethod::HistoricalAverage)
            }
            other => Err(DcfError::InvalidConfigValueError {
                field: "depreciation_method".to_string(),
                value: other.to_string(),
                reason: "expected ratio-of-capex or historical-average".to_string(),
            }),
        }
    }
}

impl fmt::Display for DepreciationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepreciationMethod::RatioOfCapex => f.write_str("ratio-of-capex"),
            DepreciationMethod::HistoricalAverage => f.write_str("historical-average"),
        }
    }
}

/// Historical working-capital value the projected series starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkingCapitalAnchor {
    #[default]
    MostRecent,
    Oldest,
}

/// Tunable inputs of the valuation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Risk-free rate used by CAPM.
    pub risk_free_rate: f64,
    /// Expected market return used by CAPM.
    pub market_return: f64,
    /// Perpetual growth rate for the terminal value.
    pub terminal_growth_rate: f64,
    /// Number of most recent reporting periods the ratios are averaged over.
    pub history_periods: usize,
    pub depreciation_method: DepreciationMethod,
    pub working_capital_anchor: WorkingCapitalAnchor,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            market_return: DEFAULT_MARKET_RETURN,
            terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
            history_periods: DEFAULT_HISTORY_PERIODS,
            depreciation_method: DepreciationMethod::default(),
            working_capital_anchor: WorkingCapitalAnchor::default(),
        }
    }
}

impl Validate for ModelConfig {
    fn validate(&self) -> Result<()> {
        validate_range("model.risk_free_rate", self.risk_free_rate, -0.05, 0.5)?;
        validate_range("model.market_return", self.market_return, -0.5, 1.0)?;
        validate_range("model.terminal_growth_rate", self.terminal_growth_rate, -0.5, 0.5)?;
        validate_positive_number("model.history_periods", self.history_periods, 1)?;
        Ok(())
    }
}
