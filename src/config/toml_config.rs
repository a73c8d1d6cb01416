use crate::config::model::ModelConfig;
use crate::config::OutputFormat;
use crate::utils::error::{DcfError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_ENDPOINT: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub model: ModelConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Yahoo,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Snapshot JSON read when `type = "file"`.
    pub snapshot_path: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            r#type: SourceKind::Yahoo,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            snapshot_path: None,
            headers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report files are only written when a path is set.
    pub path: Option<String>,
    pub formats: Vec<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            formats: vec![OutputFormat::Json, OutputFormat::Csv],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DcfError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Reads `path` when it exists. A missing file is only an error when the user named it.
    pub fn load_or_default<P: AsRef<Path>>(path: P, explicit: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            if explicit {
                return Err(DcfError::ConfigError {
                    field: "config".to_string(),
                    message: format!("file '{}' does not exist", path.display()),
                });
            }
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DcfError::ConfigError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${YAHOO_CRUMB})
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs_enabled(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.model.validate()?;

        match self.source.r#type {
            SourceKind::Yahoo => {
                validate_url("source.endpoint", &self.source.endpoint)?;
                validate_non_empty_string("source.user_agent", &self.source.user_agent)?;
                validate_positive_number(
                    "source.timeout_seconds",
                    self.source.timeout_seconds as usize,
                    1,
                )?;
            }
            SourceKind::File => {
                let path = crate::utils::validation::validate_required_field(
                    "source.snapshot_path",
                    &self.source.snapshot_path,
                )?;
                validate_path("source.snapshot_path", path)?;
            }
        }

        if let Some(path) = &self.output.path {
            validate_path("output.path", path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{DepreciationMethod, WorkingCapitalAnchor};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.source.endpoint, DEFAULT_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_model_section() {
        let toml_content = r#"
[model]
risk_free_rate = 0.042
market_return = 0.095
terminal_growth_rate = 0.025
depreciation_method = "ratio-of-capex"
working_capital_anchor = "oldest"

[output]
path = "./reports"
formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.model.risk_free_rate, 0.042);
        assert_eq!(config.model.market_return, 0.095);
        assert_eq!(config.model.terminal_growth_rate, 0.025);
        assert_eq!(config.model.history_periods, 3);
        assert_eq!(config.model.depreciation_method, DepreciationMethod::RatioOfCapex);
        assert_eq!(config.model.working_capital_anchor, WorkingCapitalAnchor::Oldest);
        assert_eq!(config.output.path.as_deref(), Some("./reports"));
        assert_eq!(config.output.formats, vec![OutputFormat::Json]);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DCF_TEST_CRUMB", "abc123");

        let toml_content = r#"
[source]
endpoint = "https://query2.finance.yahoo.com"

[source.headers]
x-crumb = "${DCF_TEST_CRUMB}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let headers = config.source.headers.unwrap();
        assert_eq!(headers.get("x-crumb").map(String::as_str), Some("abc123"));

        std::env::remove_var("DCF_TEST_CRUMB");
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = TomlConfig::from_toml_str(
            r#"
[source]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(bad_endpoint.validate().is_err());

        let file_without_path = TomlConfig::from_toml_str(
            r#"
[source]
type = "file"
"#,
        )
        .unwrap();
        assert!(matches!(
            file_without_path.validate().unwrap_err(),
            DcfError::MissingConfigError { .. }
        ));

        let bad_rate = TomlConfig::from_toml_str(
            r#"
[model]
market_return = 3.5
"#,
        )
        .unwrap();
        assert!(bad_rate.validate().is_err());
    }

    #[test]
    fn test_unknown_depreciation_method_is_parse_error() {
        let err = TomlConfig::from_toml_str(
            r#"
[model]
depreciation_method = "straight-line"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DcfError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[model]
terminal_growth_rate = 0.02

[monitoring]
enabled = true
json_logs = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.model.terminal_growth_rate, 0.02);
        assert!(config.monitoring_enabled());
        assert!(config.json_logs_enabled());
        assert!(!TomlConfig::default().json_logs_enabled());
    }

    #[test]
    fn test_load_or_default() {
        let missing = std::env::temp_dir().join("dcf-valuation-does-not-exist.toml");
        assert_eq!(
            TomlConfig::load_or_default(&missing, false).unwrap(),
            TomlConfig::default()
        );
        assert!(TomlConfig::load_or_default(&missing, true).is_err());
    }
}
