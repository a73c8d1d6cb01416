use crate::core::{Pipeline, ValuationReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Result of one engine run: the report and the files the load phase wrote.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: ValuationReport,
    pub written: Vec<String>,
}

pub struct DcfEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DcfEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting valuation run");

        tracing::info!("Fetching financial statements...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Fetched {} income statement period(s) for {}",
            snapshot.income_statement.0.periods().len(),
            snapshot.ticker
        );
        self.monitor.log_stats("extract");

        tracing::info!("Running DCF model...");
        let report = self.pipeline.transform(snapshot).await?;
        tracing::info!("Projected {} year(s)", report.projection.len());
        self.monitor.log_stats("transform");

        let written = self.pipeline.load(&report).await?;
        for path in &written {
            tracing::info!("Report written to: {}", path);
        }
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(RunOutcome { report, written })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ModelConfig;
    use crate::core::aggregator::tests::sample_snapshot;
    use crate::core::dcf::run_model;
    use crate::core::CompanySnapshot;
    use crate::domain::scenario::Scenario;
    use crate::utils::error::DcfError;
    use async_trait::async_trait;
    use chrono::Utc;

    struct StubPipeline {
        fail_extract: bool,
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<CompanySnapshot> {
            if self.fail_extract {
                return Err(DcfError::InvalidTicker {
                    ticker: "SMPL".to_string(),
                    reason: "stub".to_string(),
                });
            }
            Ok(sample_snapshot())
        }

        async fn transform(&self, snapshot: CompanySnapshot) -> Result<ValuationReport> {
            let outcome = run_model(&snapshot, 2, Scenario::Bull, &ModelConfig::default())?;
            Ok(ValuationReport {
                ticker: snapshot.ticker,
                company_name: None,
                currency: None,
                scenario: Scenario::Bull,
                years: 2,
                generated_at: Utc::now(),
                growth: outcome.growth,
                projection: outcome.schedule,
                valuation: outcome.valuation,
            })
        }

        async fn load(&self, report: &ValuationReport) -> Result<Vec<String>> {
            Ok(vec![format!("{}.json", report.ticker)])
        }
    }

    #[tokio::test]
    async fn test_run_drives_all_phases() {
        let engine = DcfEngine::new_with_monitoring(StubPipeline { fail_extract: false }, true);
        let outcome = engine.run().await.unwrap();
        assert_eq!(outcome.report.projection.len(), 2);
        assert_eq!(outcome.written, vec!["SMPL.json".to_string()]);
    }

    #[tokio::test]
    async fn test_extract_error_stops_run() {
        let engine = DcfEngine::new(StubPipeline { fail_extract: true });
        let err = engine.run().await.unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }
}
