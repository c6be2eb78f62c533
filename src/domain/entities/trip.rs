use crate::domain::value_objects::TripId;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(name: String, start_date: NaiveDate, duration_days: u32) -> Self {
        let now = Utc::now();
        Self {
            id: TripId::generate(),
            name,
            start_date,
            duration_days,
            cover_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_cover_image(mut self, url: String) -> Self {
        self.cover_image_url = Some(url);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// 最終日（初日を0日目として duration_days - 1 日後）
    pub fn end_date(&self) -> NaiveDate {
        let extra = u64::from(self.duration_days.saturating_sub(1));
        self.start_date
            .checked_add_days(Days::new(extra))
            .unwrap_or(self.start_date)
    }

    pub fn apply_patch(&mut self, patch: TripPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(duration_days) = patch.duration_days {
            self.duration_days = duration_days;
        }
        if let Some(url) = patch.cover_image_url {
            self.cover_image_url = Some(url);
        }
        self.touch();
    }
}

/// 部分更新。Someのフィールドだけを上書きする。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    pub cover_image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_date_spans_duration() {
        let trip = Trip::new("Kyoto".to_string(), date(2026, 4, 1), 3);
        assert_eq!(trip.end_date(), date(2026, 4, 3));
    }

    #[test]
    fn test_end_date_single_day_trip() {
        let trip = Trip::new("Day trip".to_string(), date(2026, 4, 1), 1);
        assert_eq!(trip.end_date(), date(2026, 4, 1));
    }

    #[test]
    fn test_apply_patch_overwrites_only_present_fields() {
        let mut trip = Trip::new("Kyoto".to_string(), date(2026, 4, 1), 3);
        let before = trip.updated_at;

        trip.apply_patch(TripPatch {
            name: Some("Kyoto & Nara".to_string()),
            ..TripPatch::default()
        });

        assert_eq!(trip.name, "Kyoto & Nara");
        assert_eq!(trip.start_date, date(2026, 4, 1));
        assert_eq!(trip.duration_days, 3);
        assert!(trip.updated_at >= before);
    }
}
