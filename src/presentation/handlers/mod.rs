pub mod document_handler;
pub mod event_handler;
pub mod sync_handler;
pub mod trip_handler;

pub use document_handler::DocumentHandler;
pub use event_handler::EventHandler;
pub use sync_handler::SyncHandler;
pub use trip_handler::TripHandler;
