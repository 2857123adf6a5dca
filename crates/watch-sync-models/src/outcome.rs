use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::report::FailedEntry;

/// Why a record could not be synced.
///
/// These are values, not errors: every per-record fault ends up as one of
/// these kinds inside a `Failed` outcome. Transport faults from the remote
/// service fold into the matching not-found kind with the underlying error
/// text kept in `detail`.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncFailure {
    UnknownMediaType(String),
    MissingEpisodeInfo,
    MovieNotFound { detail: Option<String> },
    ShowNotFound { detail: Option<String> },
    EpisodeNotFound { detail: Option<String> },
    Submission { detail: String },
    Unexpected { detail: String },
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncFailure::UnknownMediaType(raw) if raw.is_empty() => {
                write!(f, "unknown media type")
            }
            SyncFailure::UnknownMediaType(raw) => {
                write!(f, "unknown media type: {}", raw)
            }
            SyncFailure::MissingEpisodeInfo => {
                write!(f, "show entry is missing season or episode number")
            }
            SyncFailure::MovieNotFound { detail } => match detail {
                Some(d) => write!(f, "movie not found on remote service: {}", d),
                None => write!(f, "movie not found on remote service"),
            },
            SyncFailure::ShowNotFound { detail } => match detail {
                Some(d) => write!(f, "show not found on remote service: {}", d),
                None => write!(f, "show not found on remote service"),
            },
            SyncFailure::EpisodeNotFound { detail } => match detail {
                Some(d) => write!(f, "episode not found on remote service: {}", d),
                None => write!(f, "episode not found on remote service"),
            },
            SyncFailure::Submission { detail } => {
                write!(f, "history submission failed: {}", detail)
            }
            SyncFailure::Unexpected { detail } => write!(f, "{}", detail),
        }
    }
}

/// A record that was resolved and submitted to the remote history log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncedItem {
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: String,
    pub external_id: i64,
    pub watched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<i64>,
}

/// A record that terminated in a failure state.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem {
    pub media_type: String,
    pub title: String,
    pub external_id: i64,
    pub failure: SyncFailure,
    pub season: Option<i64>,
    pub episode: Option<i64>,
}

impl FailedItem {
    /// Render for the report, with the failure flattened to its message.
    pub fn to_entry(&self) -> FailedEntry {
        FailedEntry {
            media_type: self.media_type.clone(),
            title: self.title.clone(),
            external_id: self.external_id,
            error: self.failure.to_string(),
            season: self.season,
            episode: self.episode,
        }
    }
}

/// Terminal outcome of processing one progress record. Created exactly once
/// per input record and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Synced(SyncedItem),
    Failed(FailedItem),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }

    pub fn title(&self) -> &str {
        match self {
            SyncOutcome::Synced(item) => &item.title,
            SyncOutcome::Failed(item) => &item.title,
        }
    }
}
