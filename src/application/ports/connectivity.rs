use std::sync::Mutex;

pub type ConnectivityCallback = Box<dyn Fn(bool) + Send + Sync>;

/// OS/ブラウザ由来の接続性ヒント。trueは「到達できるかもしれない」程度の意味で、
/// 実際の到達性はゲートウェイのプローブで確かめる。
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
    /// 状態が反転したときだけ呼ばれる購読を登録する
    fn subscribe(&self, callback: ConnectivityCallback) -> ConnectivitySubscription;
}

/// 接続性購読の解除ハンドル。unsubscribeは冪等で、Dropでも解除される。
pub struct ConnectivitySubscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl ConnectivitySubscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    pub fn unsubscribe(&self) {
        let cancel = match self.cancel.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

impl Drop for ConnectivitySubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
