mod monitor;

pub use monitor::PlatformConnectivity;
