mod place_cache;

pub use place_cache::PlaceDetailsCache;
