use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::application::ports::connectivity::{
    Connectivity, ConnectivityCallback, ConnectivitySubscription,
};

type SubscriberMap = HashMap<u64, Arc<dyn Fn(bool) + Send + Sync>>;

/// プラットフォームの接続性イベントを集約するモニタ。
/// 実行環境側(モバイルシェルやOSのリスナ)がset_onlineで遷移を流し込み、
/// 購読者には反転したときだけ通知する。ポーリングはしない。
pub struct PlatformConnectivity {
    online: AtomicBool,
    next_id: AtomicU64,
    subscribers: Arc<Mutex<SubscriberMap>>,
}

impl PlatformConnectivity {
    pub fn new(initial_online: bool) -> Self {
        Self {
            online: AtomicBool::new(initial_online),
            next_id: AtomicU64::new(1),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 接続性イベントの注入点。同じ値の再通知は遷移ではないので無視する。
    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return;
        }
        info!(online, "Connectivity changed");
        let callbacks: Vec<Arc<dyn Fn(bool) + Send + Sync>> = match self.subscribers.lock() {
            Ok(guard) => guard.values().cloned().collect(),
            Err(_) => return,
        };
        // コールバック実行中はロックを持たない（中からのsubscribe/unsubscribeを許す）
        for callback in callbacks {
            callback(online);
        }
    }
}

impl Default for PlatformConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for PlatformConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn subscribe(&self, callback: ConnectivityCallback) -> ConnectivitySubscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.subscribers.lock() {
            guard.insert(id, Arc::from(callback));
        }
        debug!(id, "Connectivity subscriber added");

        let subscribers = Arc::clone(&self.subscribers);
        ConnectivitySubscription::new(move || {
            if let Ok(mut guard) = subscribers.lock() {
                guard.remove(&id);
            }
            debug!(id, "Connectivity subscriber removed");
        })
    }
}
