use crate::app::report;
use crate::config::OutputFormat;
use crate::core::dcf::{build_projection, run_model};
use crate::core::{CompanySnapshot, ConfigProvider, FinancialDataSource, Pipeline, Storage, ValuationReport};
use crate::domain::model::RunMode;
use crate::utils::error::Result;
use chrono::Utc;

/// Fetches a snapshot, runs the model and writes the requested report files.
pub struct DcfPipeline<D: FinancialDataSource, S: Storage, C: ConfigProvider> {
    pub(crate) source: D,
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<D: FinancialDataSource, S: Storage, C: ConfigProvider> DcfPipeline<D, S, C> {
    pub fn new(source: D, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<D: FinancialDataSource, S: Storage, C: ConfigProvider> Pipeline for DcfPipeline<D, S, C> {
    async fn extract(&self) -> Result<CompanySnapshot> {
        tracing::debug!(
            "Requesting snapshot for {} from {}",
            self.config.ticker(),
            self.source.name()
        );
        self.source.fetch_snapshot(self.config.ticker()).await
    }

    async fn transform(&self, snapshot: CompanySnapshot) -> Result<ValuationReport> {
        let years = self.config.years();
        let scenario = self.config.scenario();
        let model = self.config.model();

        let (growth, schedule, valuation) = match self.config.mode() {
            RunMode::ProjectionOnly => {
                let (growth, _, schedule) = build_projection(&snapshot, years, scenario, model)?;
                (growth, schedule, None)
            }
            RunMode::Valuation => {
                let outcome = run_model(&snapshot, years, scenario, model)?;
                (outcome.growth, outcome.schedule, outcome.valuation)
            }
        };

        tracing::debug!(
            "{} case multiplier {:.4} (mean growth {:.4}, std dev {:.4})",
            scenario,
            schedule.multiplier,
            growth.mean_growth,
            growth.std_dev
        );

        Ok(ValuationReport {
            ticker: snapshot.ticker,
            company_name: snapshot.profile.name,
            currency: snapshot.profile.currency,
            scenario,
            years,
            generated_at: Utc::now(),
            growth,
            projection: schedule,
            valuation,
        })
    }

    async fn load(&self, report: &ValuationReport) -> Result<Vec<String>> {
        let Some(output_path) = self.config.output_path() else {
            tracing::debug!("No output path configured, skipping report files");
            return Ok(Vec::new());
        };

        let mut written = Vec::new();
        for format in self.config.output_formats() {
            let (file_name, data) = match format {
                OutputFormat::Json => (report::valuation_file_name(&report.ticker), report::to_json(report)?),
                OutputFormat::Csv => (
                    report::projection_file_name(&report.ticker),
                    report::schedule_csv(&report.projection)?,
                ),
            };

            let path = format!("{}/{}", output_path.trim_end_matches('/'), file_name);
            tracing::debug!("Writing {} bytes to {}", data.len(), path);
            self.storage.write_file(&path, &data).await?;
            written.push(path);
        }

        Ok(written)
    }
}
