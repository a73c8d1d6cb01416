pub mod aggregator;
pub mod dcf;
pub mod engine;
pub mod fcf;
pub mod growth;
pub mod projection;
pub mod valuation;
pub mod wacc;

pub use crate::domain::model::{CompanySnapshot, ValuationReport};
pub use crate::domain::ports::{ConfigProvider, FinancialDataSource, Pipeline, Storage};
pub use crate::utils::error::Result;
