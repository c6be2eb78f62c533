use crate::domain::entities::event::ItineraryEvent;
use crate::domain::value_objects::{EventCategory, EventId, PlaceId};
use serde::{Deserialize, Serialize};

/// 場所の詳細情報。地図プロバイダから取得したものと、
/// イベント行に埋め込まれた古いコピーの両方がこの形をとる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: PlaceId,
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub image_url: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
}

impl PlaceDetails {
    pub fn new(place_id: PlaceId) -> Self {
        Self {
            place_id,
            name: None,
            rating: None,
            review_count: None,
            image_url: None,
            address: None,
            opening_hours: None,
        }
    }

    /// イベント行に埋め込まれた場所情報を詳細として取り出す
    pub fn from_event(event: &ItineraryEvent) -> Option<Self> {
        let location = event.location.as_ref()?;
        let place_id = location.place_id.clone()?;
        Some(Self {
            place_id,
            name: Some(event.title.clone()),
            rating: event.rating,
            review_count: event.review_count,
            image_url: event.image_url.clone(),
            address: location.address.clone(),
            opening_hours: location.opening_hours.clone(),
        })
    }
}

/// フィールド単位の優先順位付きマージ。
/// 取得済み（fetched）の値が常に勝ち、欠けたフィールドだけ埋め込みコピー（cached）で補う。
pub fn merge_place_details(
    fetched: Option<&PlaceDetails>,
    cached: Option<&PlaceDetails>,
) -> Option<PlaceDetails> {
    match (fetched, cached) {
        (Some(f), Some(c)) => Some(PlaceDetails {
            place_id: f.place_id.clone(),
            name: f.name.clone().or_else(|| c.name.clone()),
            rating: f.rating.or(c.rating),
            review_count: f.review_count.or(c.review_count),
            image_url: f.image_url.clone().or_else(|| c.image_url.clone()),
            address: f.address.clone().or_else(|| c.address.clone()),
            opening_hours: f.opening_hours.clone().or_else(|| c.opening_hours.clone()),
        }),
        (Some(f), None) => Some(f.clone()),
        (None, Some(c)) => Some(c.clone()),
        (None, None) => None,
    }
}

/// 「あとで行く」リストの1項目。同じ場所を指すイベントは1つにまとめる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlace {
    pub place_id: Option<PlaceId>,
    pub title: String,
    pub category: EventCategory,
    pub details: Option<PlaceDetails>,
    pub event_ids: Vec<EventId>,
}

/// 未スケジュールイベントから保存済みスポット一覧を組み立てる。
/// place_idを持つイベントは場所単位でまとめ、持たないものは単独の項目になる。
pub fn collect_saved_places<F>(events: &[ItineraryEvent], fetched: F) -> Vec<SavedPlace>
where
    F: Fn(&PlaceId) -> Option<PlaceDetails>,
{
    let mut places: Vec<SavedPlace> = Vec::new();

    for event in events.iter().filter(|e| e.is_saved_place()) {
        match event.place_id() {
            Some(place_id) => {
                if let Some(existing) = places
                    .iter_mut()
                    .find(|p| p.place_id.as_ref() == Some(place_id))
                {
                    existing.event_ids.push(event.id.clone());
                    continue;
                }
                let details =
                    merge_place_details(fetched(place_id).as_ref(), PlaceDetails::from_event(event).as_ref());
                places.push(SavedPlace {
                    place_id: Some(place_id.clone()),
                    title: event.title.clone(),
                    category: event.category,
                    details,
                    event_ids: vec![event.id.clone()],
                });
            }
            None => places.push(SavedPlace {
                place_id: None,
                title: event.title.clone(),
                category: event.category,
                details: None,
                event_ids: vec![event.id.clone()],
            }),
        }
    }

    places
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::event::GeoPoint;
    use crate::domain::value_objects::{DayOffset, TripId};

    fn place_id(s: &str) -> PlaceId {
        PlaceId::new(s.to_string()).unwrap()
    }

    fn saved_event(title: &str, pid: Option<&str>) -> ItineraryEvent {
        let mut event = ItineraryEvent::new(
            TripId::generate(),
            EventCategory::Play,
            title.to_string(),
            DayOffset::UNSCHEDULED,
        );
        if let Some(pid) = pid {
            event.location = Some(GeoPoint {
                latitude: 35.0,
                longitude: 135.7,
                place_id: Some(place_id(pid)),
                address: Some("embedded address".to_string()),
                opening_hours: None,
            });
        }
        event
    }

    #[test]
    fn test_fetched_field_wins_over_cached() {
        let mut fetched = PlaceDetails::new(place_id("p1"));
        fetched.rating = Some(4.6);
        let mut cached = PlaceDetails::new(place_id("p1"));
        cached.rating = Some(4.1);
        cached.address = Some("old address".to_string());

        let merged = merge_place_details(Some(&fetched), Some(&cached)).unwrap();
        assert_eq!(merged.rating, Some(4.6));
        // fetched側に無いフィールドはcachedで補完される
        assert_eq!(merged.address.as_deref(), Some("old address"));
    }

    #[test]
    fn test_merge_with_single_side() {
        let fetched = PlaceDetails::new(place_id("p1"));
        assert!(merge_place_details(Some(&fetched), None).is_some());
        assert!(merge_place_details(None, Some(&fetched)).is_some());
        assert!(merge_place_details(None, None).is_none());
    }

    #[test]
    fn test_collect_groups_events_by_place() {
        let a = saved_event("Fushimi Inari", Some("p1"));
        let b = saved_event("Fushimi Inari (revisit)", Some("p1"));
        let c = saved_event("Some alley", None);
        let scheduled = {
            let mut e = saved_event("Scheduled stop", Some("p2"));
            e.day = DayOffset::scheduled(0);
            e
        };

        let places = collect_saved_places(&[a.clone(), b.clone(), c.clone(), scheduled], |_| None);

        assert_eq!(places.len(), 2);
        let grouped = &places[0];
        assert_eq!(grouped.event_ids, vec![a.id.clone(), b.id.clone()]);
        assert_eq!(places[1].event_ids, vec![c.id.clone()]);
    }

    #[test]
    fn test_collect_uses_fetched_details_first() {
        let event = saved_event("Fushimi Inari", Some("p1"));
        let places = collect_saved_places(&[event], |pid| {
            let mut details = PlaceDetails::new(pid.clone());
            details.address = Some("fresh address".to_string());
            Some(details)
        });

        let details = places[0].details.as_ref().unwrap();
        assert_eq!(details.address.as_deref(), Some("fresh address"));
        // fetchedに名前が無いので埋め込みコピーのタイトルが残る
        assert_eq!(details.name.as_deref(), Some("Fushimi Inari"));
    }
}
