use async_trait::async_trait;
use chrono::{DateTime, Utc};
use watch_sync_models::ProgressRecord;

use crate::error::SourceError;
use crate::trakt::TraktIds;

/// Snapshot access to the locally tracked progress records.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All records crossing the watched threshold. A failure here is fatal
    /// to the run; it must surface before any remote call is made.
    async fn fetch_watched_items(&self) -> Result<Vec<ProgressRecord>, SourceError>;
}

/// Movie entity found in the remote catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieMatch {
    pub title: String,
    pub year: Option<u32>,
    pub ids: TraktIds,
}

/// Show entity found in the remote catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowMatch {
    pub title: String,
    pub year: Option<u32>,
    pub ids: TraktIds,
}

/// One episode within a resolved show.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeMatch {
    pub season: i64,
    pub number: i64,
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEntryKind {
    Movie,
    Episode,
}

/// What gets appended to the remote history log: a resolved entity plus the
/// watched-at moment.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub kind: HistoryEntryKind,
    pub trakt_id: u64,
    pub watched_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn movie(trakt_id: u64, watched_at: DateTime<Utc>) -> Self {
        Self {
            kind: HistoryEntryKind::Movie,
            trakt_id,
            watched_at,
        }
    }

    pub fn episode(trakt_id: u64, watched_at: DateTime<Utc>) -> Self {
        Self {
            kind: HistoryEntryKind::Episode,
            trakt_id,
            watched_at,
        }
    }
}

/// The remote tracking service: catalog lookup plus history submission.
///
/// Lookups are best-effort by external id; when the service returns several
/// candidates the first is taken, no disambiguation. `Ok(None)` means the
/// entity does not exist; `Err` means the call itself failed.
#[async_trait]
pub trait HistoryService: Send + Sync {
    fn service_name(&self) -> &str;

    async fn find_movie(&self, external_id: i64) -> Result<Option<MovieMatch>, SourceError>;

    async fn find_show(&self, external_id: i64) -> Result<Option<ShowMatch>, SourceError>;

    async fn find_episode(
        &self,
        show: &ShowMatch,
        season: i64,
        episode: i64,
    ) -> Result<Option<EpisodeMatch>, SourceError>;

    /// Appends one watched event to the user's history. Fire-and-forget:
    /// calling it twice for the same entity creates two history entries.
    async fn add_to_history(&self, entry: &HistoryEntry) -> Result<(), SourceError>;
}
