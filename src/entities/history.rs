//! Audit trail entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sku recorded on entries that concern the whole catalog
pub const SYSTEM_SKU: &str = "SYSTEM";

/// What kind of change an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryAction {
    /// The whole catalog was replaced from a file
    BulkLoad,
    /// An existing product was edited by hand
    Update,
    /// A product was added by hand
    Create,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::BulkLoad => "BULK_LOAD",
            HistoryAction::Update => "UPDATE",
            HistoryAction::Create => "CREATE",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One append-only audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,

    /// Free-text label of whoever was at the keyboard
    pub user: String,

    /// Product the change concerns, or [`SYSTEM_SKU`]
    pub sku: String,

    pub action: HistoryAction,

    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&HistoryAction::BulkLoad).unwrap();
        assert_eq!(json, "\"BULK_LOAD\"");
        let parsed: HistoryAction = serde_json::from_str("\"CREATE\"").unwrap();
        assert_eq!(parsed, HistoryAction::Create);
    }

    #[test]
    fn test_action_display_matches_serde() {
        for action in [HistoryAction::BulkLoad, HistoryAction::Update, HistoryAction::Create] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json.trim_matches('"'), action.to_string());
        }
    }
}
