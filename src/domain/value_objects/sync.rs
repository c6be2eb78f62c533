use serde::{Deserialize, Serialize};
use std::fmt;

/// 同期オーケストレータの状態。
/// Online/Offlineが定常状態で、Syncingはキュー排出中のみの遷移状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Online,
    Offline,
    Syncing,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Online => "online",
            SyncState::Offline => "offline",
            SyncState::Syncing => "syncing",
        }
    }

    /// 書き込みをリモートに直接向けてよい状態か
    pub fn routes_to_remote(&self) -> bool {
        matches!(self, SyncState::Online | SyncState::Syncing)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 楽観的更新の確定段階。Pendingはリモート確認待ち、Confirmedは確定済み。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Pending,
    Confirmed,
}

impl SyncPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::Pending => "pending",
            SyncPhase::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_states() {
        assert!(SyncState::Online.routes_to_remote());
        assert!(SyncState::Syncing.routes_to_remote());
        assert!(!SyncState::Offline.routes_to_remote());
    }
}
