use crate::config::model::ModelConfig;
use crate::config::OutputFormat;
use crate::domain::model::{CompanySnapshot, RunMode, ValuationReport};
use crate::domain::scenario::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn ticker(&self) -> &str;
    fn years(&self) -> u32;
    fn scenario(&self) -> Scenario;
    fn mode(&self) -> RunMode;
    fn model(&self) -> &ModelConfig;
    fn output_path(&self) -> Option<&str>;
    fn output_formats(&self) -> &[OutputFormat];
}

/// Source of company financial statements and market attributes.
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_snapshot(&self, ticker: &str) -> Result<CompanySnapshot>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CompanySnapshot>;
    async fn transform(&self, snapshot: CompanySnapshot) -> Result<ValuationReport>;
    async fn load(&self, report: &ValuationReport) -> Result<Vec<String>>;
}
