pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{LocalStorage, SnapshotFileSource, YahooFinanceSource};
pub use app::valuation_pipeline::DcfPipeline;
pub use config::{model::ModelConfig, RunConfig};
pub use crate::core::dcf::{build_projection, compute_valuation, project_revenue, run_model};
pub use crate::core::engine::{DcfEngine, RunOutcome};
pub use domain::model::{CompanySnapshot, ValuationReport};
pub use domain::scenario::Scenario;
pub use utils::error::{DcfError, Result};
