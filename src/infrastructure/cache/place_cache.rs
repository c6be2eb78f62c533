use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::domain::entities::PlaceDetails;

/// 場所詳細のLRUキャッシュ。外部から取得した詳細を保持して再フェッチを減らす。
/// trip単位では持たない（place_idはtripをまたいで同じ場所を指す）。
pub struct PlaceDetailsCache {
    entries: Mutex<LruCache<String, PlaceDetails>>,
}

impl PlaceDetailsCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, place_id: &str) -> Option<PlaceDetails> {
        match self.entries.lock() {
            Ok(mut guard) => guard.get(place_id).cloned(),
            Err(_) => None,
        }
    }

    pub fn put(&self, details: PlaceDetails) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.put(details.place_id.to_string(), details);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PlaceId;

    fn details(place_id: &str, name: &str) -> PlaceDetails {
        let mut details = PlaceDetails::new(PlaceId::new(place_id.to_string()).unwrap());
        details.name = Some(name.to_string());
        details
    }

    #[test]
    fn test_put_then_get() {
        let cache = PlaceDetailsCache::new(4);
        cache.put(details("p1", "Kinkaku-ji"));

        let hit = cache.get("p1").unwrap();
        assert_eq!(hit.name.as_deref(), Some("Kinkaku-ji"));
        assert!(cache.get("p2").is_none());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = PlaceDetailsCache::new(2);
        cache.put(details("p1", "A"));
        cache.put(details("p2", "B"));
        // p1に触って最古をp2にする
        assert!(cache.get("p1").is_some());
        cache.put(details("p3", "C"));

        assert!(cache.get("p1").is_some());
        assert!(cache.get("p2").is_none());
        assert!(cache.get("p3").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_still_holds_one_entry() {
        let cache = PlaceDetailsCache::new(0);
        cache.put(details("p1", "A"));
        assert_eq!(cache.len(), 1);
    }
}
