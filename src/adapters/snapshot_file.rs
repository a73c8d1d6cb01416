use crate::core::{CompanySnapshot, FinancialDataSource, Storage};
use crate::utils::error::{DcfError, Result};
use async_trait::async_trait;

/// Replays a company snapshot previously frozen to JSON.
pub struct SnapshotFileSource<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> SnapshotFileSource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }
}

#[async_trait]
impl<S: Storage> FinancialDataSource for SnapshotFileSource<S> {
    fn name(&self) -> &str {
        "snapshot-file"
    }

    async fn fetch_snapshot(&self, ticker: &str) -> Result<CompanySnapshot> {
        tracing::debug!("Reading snapshot from: {}", self.path);
        let data = self.storage.read_file(&self.path).await?;
        let snapshot: CompanySnapshot = serde_json::from_slice(&data)?;

        if !snapshot.ticker.eq_ignore_ascii_case(ticker) {
            return Err(DcfError::InvalidTicker {
                ticker: ticker.to_string(),
                reason: format!("snapshot file '{}' holds {}", self.path, snapshot.ticker),
            });
        }

        Ok(snapshot)
    }
}

pub async fn save_snapshot<S: Storage>(storage: &S, path: &str, snapshot: &CompanySnapshot) -> Result<()> {
    let data = serde_json::to_vec_pretty(snapshot)?;
    storage.write_file(path, &data).await
}
