use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// グローバルのサブスクライバを初期化する。二重初期化は無視する。
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "shiori_sync=debug,info".into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
