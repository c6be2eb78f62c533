pub mod connectivity;
pub mod local_store;
pub mod remote_gateway;

pub use connectivity::{Connectivity, ConnectivityCallback, ConnectivitySubscription};
pub use local_store::{
    DocumentStore, EventStore, LocalStore, MetaStore, MutationQueue, TripStore,
};
pub use remote_gateway::{
    ChangeCallback, RealtimeSubscription, RemoteChange, RemoteChangeType, RemoteGateway,
};
