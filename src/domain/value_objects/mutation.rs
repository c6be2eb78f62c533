use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// キューに積まれる書き込みの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

impl FromStr for MutationKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(MutationKind::Create),
            "update" => Ok(MutationKind::Update),
            "delete" => Ok(MutationKind::Delete),
            other => Err(format!("Unknown mutation kind: {other}")),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ミューテーションが対象とするエンティティの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Trip,
    Event,
    Document,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Trip => "trip",
            EntityKind::Event => "event",
            EntityKind::Document => "document",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "trip" => Ok(EntityKind::Trip),
            "event" => Ok(EntityKind::Event),
            "document" => Ok(EntityKind::Document),
            other => Err(format!("Unknown entity kind: {other}")),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
