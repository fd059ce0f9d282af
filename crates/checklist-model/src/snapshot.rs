//! Persisted progress
//!
//! [`CompletionRecord`] is the per-item tuple written to the local cache and
//! sent to the backend; [`UpdatePayload`] is the body of an instance update.

use crate::id::RawItemId;
use crate::instance::InstanceStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// Item id (compound string once an instance is loaded)
    pub item_id: RawItemId,
    /// Completion flag
    pub completed: bool,
    /// When the item became complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Operator notes
    #[serde(default)]
    pub notes: String,
}

/// Ordered completion records of one instance
pub type ProgressSnapshot = Vec<CompletionRecord>;

/// Body of an instance update sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    /// Status derived from the completion percentage
    pub status: InstanceStatus,
    /// Top-level completion percentage
    pub progress_percentage: u8,
    /// Time the payload was built
    pub updated_at: DateTime<Utc>,
    /// Per-item completion
    pub item_completion: ProgressSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_wire_shape() {
        let record = CompletionRecord {
            item_id: RawItemId::from("15_950"),
            completed: false,
            completed_at: None,
            notes: String::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["itemId"], "15_950");
        assert!(json.get("completedAt").is_none());

        let back: CompletionRecord = serde_json::from_str(
            r#"{"itemId": 4, "completed": true, "completedAt": "2024-05-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(back.item_id, RawItemId::Number(4));
        assert!(back.completed_at.is_some());
        assert!(back.notes.is_empty());
    }
}
