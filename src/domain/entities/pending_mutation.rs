use crate::domain::value_objects::{EntityKind, MutationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ローカルキューに積まれた未送信の書き込み。
/// payloadには対象エンティティの完全なスナップショットが入る（deleteはNull）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMutation {
    pub id: i64,
    pub kind: MutationKind,
    pub entity: EntityKind,
    pub entity_id: String,
    pub payload: serde_json::Value,
    pub queued_at: DateTime<Utc>,
    pub synced: bool,
    pub synced_at: Option<DateTime<Utc>>,
}

/// 採番前のキュー投入データ。idはストアがAUTOINCREMENTで割り当てる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMutationDraft {
    pub kind: MutationKind,
    pub entity: EntityKind,
    pub entity_id: String,
    pub payload: serde_json::Value,
    pub queued_at: DateTime<Utc>,
}

impl PendingMutationDraft {
    pub fn new(
        kind: MutationKind,
        entity: EntityKind,
        entity_id: String,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            entity,
            entity_id,
            payload,
            queued_at: Utc::now(),
        }
    }

    pub fn create(entity: EntityKind, entity_id: String, payload: serde_json::Value) -> Self {
        Self::new(MutationKind::Create, entity, entity_id, payload)
    }

    pub fn update(entity: EntityKind, entity_id: String, payload: serde_json::Value) -> Self {
        Self::new(MutationKind::Update, entity, entity_id, payload)
    }

    pub fn delete(entity: EntityKind, entity_id: String) -> Self {
        Self::new(
            MutationKind::Delete,
            entity,
            entity_id,
            serde_json::Value::Null,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_draft_has_null_payload() {
        let draft = PendingMutationDraft::delete(EntityKind::Event, "e1".to_string());
        assert_eq!(draft.kind, MutationKind::Delete);
        assert!(draft.payload.is_null());
    }

    #[test]
    fn test_create_draft_keeps_snapshot() {
        let snapshot = serde_json::json!({ "id": "e1", "title": "Ramen" });
        let draft =
            PendingMutationDraft::create(EntityKind::Event, "e1".to_string(), snapshot.clone());
        assert_eq!(draft.payload, snapshot);
        assert_eq!(draft.entity, EntityKind::Event);
    }
}
