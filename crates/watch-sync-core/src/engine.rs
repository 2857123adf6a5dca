use anyhow::{Context, Result};
use tracing::{info, warn};
use watch_sync_models::{FailedItem, ProgressRecord, SyncFailure, SyncOutcome, SyncReport, SyncedItem};
use watch_sync_sources::{HistoryEntry, HistoryService, ProgressStore};

use crate::classify::{classify, ClassifiedMedia};
use crate::report::ReportBuilder;

/// Per-record reconciliation: classify, resolve against the remote catalog,
/// submit to the history log, record the outcome.
///
/// Records are processed sequentially and in isolation: every collaborator
/// call returns a typed result, and any per-record failure becomes a
/// `Failed` outcome instead of propagating. Only the initial store query
/// can fail the run.
pub struct SyncEngine<'a> {
    store: &'a dyn ProgressStore,
    service: &'a dyn HistoryService,
}

impl<'a> SyncEngine<'a> {
    pub fn new(store: &'a dyn ProgressStore, service: &'a dyn HistoryService) -> Self {
        Self { store, service }
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let records = self
            .store
            .fetch_watched_items()
            .await
            .context("failed to fetch watched items from the progress store")?;

        info!(
            "Processing {} watched progress records against {}",
            records.len(),
            self.service.service_name()
        );

        let mut builder = ReportBuilder::new();
        for record in &records {
            let outcome = self.process_record(record).await;
            match &outcome {
                SyncOutcome::Synced(item) => {
                    info!(
                        "Synced {} '{}' ({})",
                        item.media_type, item.title, item.external_id
                    );
                }
                SyncOutcome::Failed(item) => {
                    warn!(
                        "Failed {} '{}' ({}): {}",
                        item.media_type, item.title, item.external_id, item.failure
                    );
                }
            }
            builder.record(outcome);
        }

        Ok(builder.finalize())
    }

    async fn process_record(&self, record: &ProgressRecord) -> SyncOutcome {
        match classify(record) {
            Ok(ClassifiedMedia::Movie) => self.sync_movie(record).await,
            Ok(ClassifiedMedia::Episode { season, episode }) => {
                self.sync_episode(record, season, episode).await
            }
            Err(failure) => failed(record, failure),
        }
    }

    async fn sync_movie(&self, record: &ProgressRecord) -> SyncOutcome {
        let movie = match self.service.find_movie(record.external_id).await {
            Ok(Some(movie)) => movie,
            Ok(None) => return failed(record, SyncFailure::MovieNotFound { detail: None }),
            Err(e) => {
                return failed(
                    record,
                    SyncFailure::MovieNotFound {
                        detail: Some(e.to_string()),
                    },
                )
            }
        };

        let Some(trakt_id) = movie.ids.trakt else {
            return failed(
                record,
                SyncFailure::Unexpected {
                    detail: format!("catalog match for '{}' carries no usable id", movie.title),
                },
            );
        };

        let entry = HistoryEntry::movie(trakt_id, record.updated_at);
        if let Err(e) = self.service.add_to_history(&entry).await {
            return failed(
                record,
                SyncFailure::Submission {
                    detail: e.to_string(),
                },
            );
        }

        SyncOutcome::Synced(SyncedItem {
            media_type: "movie".to_string(),
            title: record.display_title().to_string(),
            external_id: record.external_id,
            watched_at: record.updated_at,
            season: None,
            episode: None,
        })
    }

    async fn sync_episode(
        &self,
        record: &ProgressRecord,
        season: i64,
        episode: i64,
    ) -> SyncOutcome {
        let show = match self.service.find_show(record.external_id).await {
            Ok(Some(show)) => show,
            Ok(None) => return failed(record, SyncFailure::ShowNotFound { detail: None }),
            Err(e) => {
                return failed(
                    record,
                    SyncFailure::ShowNotFound {
                        detail: Some(e.to_string()),
                    },
                )
            }
        };

        // A resolved show does not guarantee the episode exists; this is a
        // distinct failure kind, with the service error kept when there was one
        let episode_match = match self.service.find_episode(&show, season, episode).await {
            Ok(Some(m)) => m,
            Ok(None) => return failed(record, SyncFailure::EpisodeNotFound { detail: None }),
            Err(e) => {
                return failed(
                    record,
                    SyncFailure::EpisodeNotFound {
                        detail: Some(e.to_string()),
                    },
                )
            }
        };

        let Some(trakt_id) = episode_match.ids.trakt else {
            return failed(
                record,
                SyncFailure::Unexpected {
                    detail: format!(
                        "episode match s{:02}e{:02} of '{}' carries no usable id",
                        season, episode, show.title
                    ),
                },
            );
        };

        let entry = HistoryEntry::episode(trakt_id, record.updated_at);
        if let Err(e) = self.service.add_to_history(&entry).await {
            return failed(
                record,
                SyncFailure::Submission {
                    detail: e.to_string(),
                },
            );
        }

        SyncOutcome::Synced(SyncedItem {
            media_type: "episode".to_string(),
            title: record.display_title().to_string(),
            external_id: record.external_id,
            watched_at: record.updated_at,
            season: Some(season),
            episode: Some(episode),
        })
    }
}

fn failed(record: &ProgressRecord, failure: SyncFailure) -> SyncOutcome {
    SyncOutcome::Failed(FailedItem {
        media_type: record.media_kind().label().to_string(),
        title: record.display_title().to_string(),
        external_id: record.external_id,
        failure,
        season: record.season_number,
        episode: record.episode_number,
    })
}
