// Adapters layer: concrete implementations for external systems (data provider, snapshot files, storage)

pub mod snapshot_file;
pub mod storage;
pub mod yahoo;

pub use snapshot_file::{save_snapshot, SnapshotFileSource};
pub use storage::LocalStorage;
pub use yahoo::YahooFinanceSource;
