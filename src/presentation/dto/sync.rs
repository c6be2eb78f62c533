use crate::application::services::{DrainSummary, SyncStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    /// online / offline / syncing
    pub state: String,
    pub pending_count: u32,
    pub last_sync_time: Option<i64>,
    pub conflict_overwrites: u64,
}

impl From<SyncStatus> for SyncStatusResponse {
    fn from(status: SyncStatus) -> Self {
        Self {
            state: status.state.as_str().to_string(),
            pending_count: status.pending_count,
            last_sync_time: status.last_sync_time.map(|t| t.timestamp_millis()),
            conflict_overwrites: status.conflict_overwrites,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummaryResponse {
    pub replayed: usize,
    pub skipped: usize,
    pub remaining: usize,
    pub went_offline: bool,
}

impl From<DrainSummary> for SyncSummaryResponse {
    fn from(summary: DrainSummary) -> Self {
        Self {
            replayed: summary.replayed,
            skipped: summary.skipped,
            remaining: summary.remaining,
            went_offline: summary.went_offline,
        }
    }
}
