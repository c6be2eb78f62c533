pub mod document;
pub mod event;
pub mod pending_mutation;
pub mod place;
pub mod trip;

pub use document::TripDocument;
pub use event::{EventPatch, GeoPoint, ItineraryEvent};
pub use pending_mutation::{PendingMutation, PendingMutationDraft};
pub use place::{collect_saved_places, merge_place_details, PlaceDetails, SavedPlace};
pub use trip::{Trip, TripPatch};
