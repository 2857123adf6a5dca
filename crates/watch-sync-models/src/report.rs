use serde::{Deserialize, Serialize};

use crate::outcome::SyncedItem;

/// Failed record as it appears in the report, failure rendered to text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedEntry {
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: String,
    pub external_id: i64,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<i64>,
}

/// Run-level artifact: every processed record lands in exactly one of the
/// two lists. Written once at end of run, overwriting any prior report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncReport {
    pub synced_count: usize,
    pub failed_count: usize,
    pub synced_items: Vec<SyncedItem>,
    pub failed_items: Vec<FailedEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_report_round_trip() {
        let report = SyncReport {
            synced_count: 1,
            failed_count: 1,
            synced_items: vec![SyncedItem {
                media_type: "movie".to_string(),
                title: "The Matrix".to_string(),
                external_id: 603,
                watched_at: Utc.with_ymd_and_hms(2024, 5, 1, 20, 30, 0).unwrap(),
                season: None,
                episode: None,
            }],
            failed_items: vec![FailedEntry {
                media_type: "show".to_string(),
                title: "Severance".to_string(),
                external_id: 95396,
                error: "episode not found on remote service".to_string(),
                season: Some(2),
                episode: Some(5),
            }],
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: SyncReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_optional_fields_omitted_for_movies() {
        let entry = FailedEntry {
            media_type: "movie".to_string(),
            title: "Heat".to_string(),
            external_id: 949,
            error: "movie not found on remote service".to_string(),
            season: None,
            episode: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("season").is_none());
        assert!(json.get("episode").is_none());
        assert_eq!(json["type"], "movie");
    }
}
