pub mod report;
pub mod valuation_pipeline;

use crate::adapters::{LocalStorage, SnapshotFileSource, YahooFinanceSource};
use crate::config::toml_config::SourceKind;
use crate::config::RunConfig;
use crate::core::engine::{DcfEngine, RunOutcome};
use crate::core::FinancialDataSource;
use crate::utils::error::{DcfError, Result};
use valuation_pipeline::DcfPipeline;

/// Builds the configured data source and runs one valuation end to end.
pub async fn run(config: RunConfig) -> Result<RunOutcome> {
    match config.source.r#type {
        SourceKind::Yahoo => {
            let source = YahooFinanceSource::new(&config.source)?;
            run_with_source(source, config).await
        }
        SourceKind::File => {
            let path = config
                .source
                .snapshot_path
                .clone()
                .ok_or_else(|| DcfError::MissingConfigError {
                    field: "source.snapshot_path".to_string(),
                })?;
            let source = SnapshotFileSource::new(LocalStorage::new("."), path);
            run_with_source(source, config).await
        }
    }
}

pub async fn run_with_source<D: FinancialDataSource>(source: D, config: RunConfig) -> Result<RunOutcome> {
    tracing::info!("Using data source: {}", source.name());
    let monitor_enabled = config.monitor;
    let pipeline = DcfPipeline::new(source, LocalStorage::new("."), config);
    DcfEngine::new_with_monitoring(pipeline, monitor_enabled).run().await
}
