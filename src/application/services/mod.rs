pub mod storage_service;
pub mod sync_service;

pub use storage_service::{EventsSnapshot, SnapshotEntry, StorageService};
pub use sync_service::{DrainSummary, SyncService, SyncStatus};
