use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 予定イベントの種別。保存時は小文字の固定文字列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Transport,
    Stay,
    Eat,
    Play,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Transport => "transport",
            EventCategory::Stay => "stay",
            EventCategory::Eat => "eat",
            EventCategory::Play => "play",
        }
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "transport" => Ok(EventCategory::Transport),
            "stay" => Ok(EventCategory::Stay),
            "eat" => Ok(EventCategory::Eat),
            "play" => Ok(EventCategory::Play),
            other => Err(format!("Unknown event category: {other}")),
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Ticket,
    Reservation,
    Map,
    Receipt,
    Other,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Ticket => "ticket",
            DocumentCategory::Reservation => "reservation",
            DocumentCategory::Map => "map",
            DocumentCategory::Receipt => "receipt",
            DocumentCategory::Other => "other",
        }
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ticket" => Ok(DocumentCategory::Ticket),
            "reservation" => Ok(DocumentCategory::Reservation),
            "map" => Ok(DocumentCategory::Map),
            "receipt" => Ok(DocumentCategory::Receipt),
            "other" => Ok(DocumentCategory::Other),
            other => Err(format!("Unknown document category: {other}")),
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_category_parse_round_trip() {
        for cat in [
            EventCategory::Transport,
            EventCategory::Stay,
            EventCategory::Eat,
            EventCategory::Play,
        ] {
            assert_eq!(cat.as_str().parse::<EventCategory>().unwrap(), cat);
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!("sightseeing".parse::<EventCategory>().is_err());
        assert!("TRANSPORT".parse::<EventCategory>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&EventCategory::Stay).unwrap();
        assert_eq!(json, "\"stay\"");
        let back: DocumentCategory = serde_json::from_str("\"ticket\"").unwrap();
        assert_eq!(back, DocumentCategory::Ticket);
    }
}
