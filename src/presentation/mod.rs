pub mod dto;
pub mod handlers;

pub use handlers::{DocumentHandler, EventHandler, SyncHandler, TripHandler};
