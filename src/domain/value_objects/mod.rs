pub mod category;
pub mod day_offset;
pub mod ids;
pub mod meta;
pub mod mutation;
pub mod sync;

pub use category::{DocumentCategory, EventCategory};
pub use day_offset::DayOffset;
pub use ids::{DocumentId, EventId, PlaceId, TripId};
pub use mutation::{EntityKind, MutationKind};
pub use sync::{SyncPhase, SyncState};
