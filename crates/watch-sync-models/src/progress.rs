use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::MediaKind;

/// Share of total duration that must be watched before a record counts as
/// watched. The comparison is strict: exactly 80% does not qualify.
pub const WATCHED_THRESHOLD: f64 = 0.8;

/// Metadata blob attached to a progress record by the media center.
///
/// Stored as JSON in the progress database; fields beyond `type` and `title`
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaMetadata {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
}

/// One locally tracked viewing-progress entry, read-only to the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressRecord {
    pub id: i64,
    /// TMDB id used to resolve the record against the remote catalog.
    pub external_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MediaMetadata>,
    /// Proxy for "when watching finished"; the only timestamp the store has.
    pub updated_at: DateTime<Utc>,
    pub watched_duration: f64,
    pub total_duration: f64,
}

impl ProgressRecord {
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_raw(
            self.metadata
                .as_ref()
                .and_then(|m| m.kind.as_deref()),
        )
    }

    pub fn display_title(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .unwrap_or("Unknown")
    }

    /// Whether this record crosses the watched threshold. The store query
    /// applies the same predicate server-side; this is the reference check.
    pub fn is_watched(&self) -> bool {
        self.total_duration > 0.0
            && self.watched_duration > WATCHED_THRESHOLD * self.total_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(watched: f64, total: f64) -> ProgressRecord {
        ProgressRecord {
            id: 1,
            external_id: 603,
            season_number: None,
            episode_number: None,
            metadata: Some(MediaMetadata {
                kind: Some("movie".to_string()),
                title: Some("The Matrix".to_string()),
            }),
            updated_at: Utc::now(),
            watched_duration: watched,
            total_duration: total,
        }
    }

    #[test]
    fn test_watched_above_threshold() {
        assert!(record(5400.0, 6000.0).is_watched());
    }

    #[test]
    fn test_watched_boundary_excluded() {
        // Exactly 80% is not watched
        assert!(!record(4800.0, 6000.0).is_watched());
    }

    #[test]
    fn test_watched_just_above_boundary() {
        assert!(record(4800.1, 6000.0).is_watched());
    }

    #[test]
    fn test_zero_duration_never_watched() {
        assert!(!record(100.0, 0.0).is_watched());
        assert!(!record(0.0, 0.0).is_watched());
    }

    #[test]
    fn test_display_title_defaults_to_unknown() {
        let mut r = record(5400.0, 6000.0);
        r.metadata = None;
        assert_eq!(r.display_title(), "Unknown");

        r.metadata = Some(MediaMetadata {
            kind: Some("movie".to_string()),
            title: None,
        });
        assert_eq!(r.display_title(), "Unknown");
    }

    #[test]
    fn test_media_kind_from_metadata() {
        let mut r = record(5400.0, 6000.0);
        assert_eq!(r.media_kind(), MediaKind::Movie);

        r.metadata = None;
        assert_eq!(r.media_kind(), MediaKind::Unknown(String::new()));
    }
}
