use thiserror::Error;

#[derive(Error, Debug)]
pub enum DcfError {
    #[error("Invalid ticker '{ticker}': {reason}")]
    InvalidTicker { ticker: String, reason: String },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient history: {message}")]
    InsufficientHistory { message: String },

    #[error("Missing line item '{item}' in {statement}")]
    MissingLineItem { item: String, statement: String },

    #[error("Division by zero: {context}")]
    DivisionByZero { context: String },

    #[error("Missing market data: {field}")]
    MissingMarketData { field: String },

    #[error("Total debt is zero, cost of debt is undefined")]
    ZeroDebt,

    #[error("Discount rate {wacc:.4} does not exceed terminal growth rate {growth:.4}")]
    InvalidDiscountRate { wacc: f64, growth: f64 },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Data provider error: {message}")]
    ProviderError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Model,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DcfError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DcfError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn division_by_zero(context: impl Into<String>) -> Self {
        DcfError::DivisionByZero {
            context: context.into(),
        }
    }

    pub fn missing_market_data(field: impl Into<String>) -> Self {
        DcfError::MissingMarketData {
            field: field.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DcfError::InvalidTicker { .. } | DcfError::InvalidInput { .. } => ErrorCategory::Input,
            DcfError::InsufficientHistory { .. }
            | DcfError::MissingLineItem { .. }
            | DcfError::MissingMarketData { .. } => ErrorCategory::Data,
            DcfError::DivisionByZero { .. }
            | DcfError::ZeroDebt
            | DcfError::InvalidDiscountRate { .. } => ErrorCategory::Model,
            DcfError::ApiError(_) | DcfError::ProviderError { .. } => ErrorCategory::Network,
            DcfError::ConfigError { .. }
            | DcfError::InvalidConfigValueError { .. }
            | DcfError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DcfError::CsvError(_) | DcfError::IoError(_) | DcfError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Model => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the CLI. Every named valuation condition gets its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            DcfError::InvalidTicker { .. } => 10,
            DcfError::InvalidInput { .. } => 11,
            DcfError::InsufficientHistory { .. } => 12,
            DcfError::MissingLineItem { .. } => 13,
            DcfError::DivisionByZero { .. } => 14,
            DcfError::MissingMarketData { .. } => 15,
            DcfError::ZeroDebt => 16,
            DcfError::InvalidDiscountRate { .. } => 17,
            DcfError::ConfigError { .. }
            | DcfError::InvalidConfigValueError { .. }
            | DcfError::MissingConfigError { .. } => 2,
            DcfError::ApiError(_) | DcfError::ProviderError { .. } => 3,
            DcfError::CsvError(_) | DcfError::IoError(_) | DcfError::SerializationError(_) => 4,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DcfError::InvalidTicker { ticker, .. } => {
                format!("Error: Invalid stock ticker '{}'.", ticker)
            }
            DcfError::InvalidInput { field, reason } => format!("Error: {} {}", field, reason),
            DcfError::InsufficientHistory { .. } => {
                "Error: Not enough historical revenue to estimate growth.".to_string()
            }
            DcfError::MissingLineItem { item, statement } => format!(
                "Error: The {} does not report '{}' for the selected periods.",
                statement, item
            ),
            DcfError::DivisionByZero { context } => {
                format!("Error: Cannot compute ratios, {} is zero.", context)
            }
            DcfError::MissingMarketData { field } => {
                format!("Error: Market data '{}' is unavailable for this company.", field)
            }
            DcfError::ZeroDebt => {
                "Error: Company reports no debt, cost of debt cannot be computed.".to_string()
            }
            DcfError::InvalidDiscountRate { wacc, growth } => format!(
                "Error: WACC ({:.2}%) must exceed the terminal growth rate ({:.2}%).",
                wacc * 100.0,
                growth * 100.0
            ),
            DcfError::ApiError(_) | DcfError::ProviderError { .. } => {
                "Error: Failed to fetch financial data from the provider.".to_string()
            }
            DcfError::ConfigError { .. }
            | DcfError::InvalidConfigValueError { .. }
            | DcfError::MissingConfigError { .. } => format!("Error: {}", self),
            DcfError::CsvError(_) | DcfError::IoError(_) | DcfError::SerializationError(_) => {
                format!("Error: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DcfError::InvalidTicker { .. } => "Check the ticker symbol on the exchange it trades on",
            DcfError::InvalidInput { .. } => {
                "Years must be a positive integer and case must be 1, 2, 3 (or base, bull, bear)"
            }
            DcfError::InsufficientHistory { .. } | DcfError::MissingLineItem { .. } => {
                "The company may use non-standard reporting; try a different ticker"
            }
            DcfError::DivisionByZero { .. } => "Historical data contains zero values; the model cannot be applied",
            DcfError::MissingMarketData { .. } => "Try again later or supply a snapshot file with the missing values",
            DcfError::ZeroDebt => "The WACC formula requires debt; this company cannot be valued with this model",
            DcfError::InvalidDiscountRate { .. } => {
                "Lower --terminal-growth or review --risk-free-rate / --market-return"
            }
            DcfError::ApiError(_) | DcfError::ProviderError { .. } => {
                "Check network connectivity and the [source] section of the configuration"
            }
            DcfError::ConfigError { .. }
            | DcfError::InvalidConfigValueError { .. }
            | DcfError::MissingConfigError { .. } => "Review the configuration file and command-line flags",
            DcfError::CsvError(_) | DcfError::IoError(_) | DcfError::SerializationError(_) => {
                "Check file permissions and the output path"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DcfError>;
