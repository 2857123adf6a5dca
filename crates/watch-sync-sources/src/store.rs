use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};
use watch_sync_models::{MediaMetadata, ProgressRecord};

use crate::error::SourceError;
use crate::traits::ProgressStore;

/// Watched-threshold selection, evaluated inside the database so only
/// qualifying records cross the wire. Strict comparison: exactly 80% stays
/// unwatched, and zero-duration rows can never qualify.
const WATCHED_ITEMS_QUERY: &str = "\
    SELECT id, external_id, season_number, episode_number, metadata, \
           updated_at, watched_duration, duration \
    FROM media_progress \
    WHERE duration > 0 AND watched_duration > duration * 0.8 \
    ORDER BY updated_at";

/// Read-only view over the media center's progress database.
pub struct SqliteProgressStore {
    pool: SqlitePool,
}

impl SqliteProgressStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, SourceError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| {
                SourceError::new(format!(
                    "failed to open progress database {}: {}",
                    database_url, e
                ))
            })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Decode the metadata JSON column. Records with malformed metadata are kept
/// with no metadata rather than aborting the query; classification turns
/// them into per-record failures later.
fn parse_metadata(record_id: i64, raw: Option<String>) -> Option<MediaMetadata> {
    let raw = raw?;
    match serde_json::from_str::<MediaMetadata>(&raw) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            warn!(
                "Ignoring malformed metadata on progress record {}: {}",
                record_id, e
            );
            None
        }
    }
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn fetch_watched_items(&self) -> Result<Vec<ProgressRecord>, SourceError> {
        let rows = sqlx::query(WATCHED_ITEMS_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::new(format!("watched items query failed: {}", e)))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row
                .try_get("id")
                .map_err(SourceError::from_err)?;
            let metadata_raw: Option<String> = row
                .try_get("metadata")
                .map_err(SourceError::from_err)?;
            let updated_at: DateTime<Utc> = row
                .try_get("updated_at")
                .map_err(SourceError::from_err)?;

            records.push(ProgressRecord {
                id,
                external_id: row.try_get("external_id").map_err(SourceError::from_err)?,
                season_number: row
                    .try_get("season_number")
                    .map_err(SourceError::from_err)?,
                episode_number: row
                    .try_get("episode_number")
                    .map_err(SourceError::from_err)?,
                metadata: parse_metadata(id, metadata_raw),
                updated_at,
                watched_duration: row
                    .try_get("watched_duration")
                    .map_err(SourceError::from_err)?,
                total_duration: row.try_get("duration").map_err(SourceError::from_err)?,
            });
        }

        debug!("Fetched {} watched progress records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteProgressStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE media_progress (
                id INTEGER PRIMARY KEY,
                external_id INTEGER NOT NULL,
                season_number INTEGER,
                episode_number INTEGER,
                metadata TEXT,
                updated_at TEXT NOT NULL,
                watched_duration REAL NOT NULL,
                duration REAL NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        SqliteProgressStore::new(pool)
    }

    async fn insert_row(
        store: &SqliteProgressStore,
        id: i64,
        external_id: i64,
        metadata: Option<&str>,
        watched: f64,
        duration: f64,
    ) {
        sqlx::query(
            "INSERT INTO media_progress \
             (id, external_id, metadata, updated_at, watched_duration, duration) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(external_id)
        .bind(metadata)
        .bind("2024-05-01T20:30:00+00:00")
        .bind(watched)
        .bind(duration)
        .execute(store.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_threshold_excludes_unfinished_and_zero_duration() {
        let store = test_store().await;

        // 7 rows above the threshold
        for id in 1..=7 {
            insert_row(
                &store,
                id,
                600 + id,
                Some(r#"{"type":"movie","title":"Watched"}"#),
                5400.0,
                6000.0,
            )
            .await;
        }
        // 3 rows with zero duration never qualify
        for id in 8..=10 {
            insert_row(&store, id, 600 + id, None, 100.0, 0.0).await;
        }

        let records = store.fetch_watched_items().await.unwrap();
        assert_eq!(records.len(), 7);
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_strict() {
        let store = test_store().await;

        // Exactly 80% does not qualify
        insert_row(&store, 1, 603, None, 4800.0, 6000.0).await;
        // Just above does
        insert_row(&store, 2, 604, None, 4801.0, 6000.0).await;

        let records = store.fetch_watched_items().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].external_id, 604);
    }

    #[tokio::test]
    async fn test_metadata_decoding() {
        let store = test_store().await;

        insert_row(
            &store,
            1,
            603,
            Some(r#"{"type":"movie","title":"The Matrix","extra":42}"#),
            5400.0,
            6000.0,
        )
        .await;
        insert_row(&store, 2, 604, Some("not json"), 5400.0, 6000.0).await;
        insert_row(&store, 3, 605, None, 5400.0, 6000.0).await;

        let records = store.fetch_watched_items().await.unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].display_title(), "The Matrix");
        // Malformed metadata is kept as absent, not a query failure
        assert!(records[1].metadata.is_none());
        assert!(records[2].metadata.is_none());
    }

    #[tokio::test]
    async fn test_season_and_episode_columns() {
        let store = test_store().await;

        sqlx::query(
            "INSERT INTO media_progress \
             (id, external_id, season_number, episode_number, metadata, updated_at, watched_duration, duration) \
             VALUES (1, 95396, 2, 5, '{\"type\":\"show\",\"title\":\"Severance\"}', \
                     '2024-05-01T20:30:00+00:00', 3000.0, 3300.0)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let records = store.fetch_watched_items().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].season_number, Some(2));
        assert_eq!(records[0].episode_number, Some(5));
        assert_eq!(records[0].display_title(), "Severance");
    }
}
