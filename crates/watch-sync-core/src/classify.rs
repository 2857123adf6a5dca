use watch_sync_models::{MediaKind, ProgressRecord, SyncFailure};

/// What a progress record turned out to be once its metadata was inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedMedia {
    Movie,
    Episode { season: i64, episode: i64 },
}

/// Assign a record to a media variant. Pure function of the record's
/// metadata and season/episode numbers.
///
/// A show record missing either number is a `MissingEpisodeInfo` failure,
/// not an unknown type: the metadata identified the record, the record
/// itself is incomplete.
pub fn classify(record: &ProgressRecord) -> Result<ClassifiedMedia, SyncFailure> {
    match record.media_kind() {
        MediaKind::Movie => Ok(ClassifiedMedia::Movie),
        MediaKind::Show => match (record.season_number, record.episode_number) {
            (Some(season), Some(episode)) => Ok(ClassifiedMedia::Episode { season, episode }),
            _ => Err(SyncFailure::MissingEpisodeInfo),
        },
        MediaKind::Unknown(raw) => Err(SyncFailure::UnknownMediaType(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use watch_sync_models::MediaMetadata;

    fn record(
        kind: Option<&str>,
        season: Option<i64>,
        episode: Option<i64>,
    ) -> ProgressRecord {
        ProgressRecord {
            id: 1,
            external_id: 603,
            season_number: season,
            episode_number: episode,
            metadata: kind.map(|k| MediaMetadata {
                kind: Some(k.to_string()),
                title: Some("Title".to_string()),
            }),
            updated_at: Utc::now(),
            watched_duration: 5400.0,
            total_duration: 6000.0,
        }
    }

    #[test]
    fn test_movie() {
        assert_eq!(
            classify(&record(Some("movie"), None, None)),
            Ok(ClassifiedMedia::Movie)
        );
    }

    #[test]
    fn test_episode_with_both_numbers() {
        assert_eq!(
            classify(&record(Some("show"), Some(2), Some(5))),
            Ok(ClassifiedMedia::Episode {
                season: 2,
                episode: 5
            })
        );
    }

    #[test]
    fn test_show_missing_episode_number() {
        assert_eq!(
            classify(&record(Some("show"), Some(2), None)),
            Err(SyncFailure::MissingEpisodeInfo)
        );
    }

    #[test]
    fn test_show_missing_season_number() {
        assert_eq!(
            classify(&record(Some("show"), None, Some(5))),
            Err(SyncFailure::MissingEpisodeInfo)
        );
    }

    #[test]
    fn test_unknown_type_keeps_raw_value() {
        assert_eq!(
            classify(&record(Some("short"), None, None)),
            Err(SyncFailure::UnknownMediaType("short".to_string()))
        );
    }

    #[test]
    fn test_absent_metadata_is_unknown_not_missing_info() {
        assert_eq!(
            classify(&record(None, Some(2), Some(5))),
            Err(SyncFailure::UnknownMediaType(String::new()))
        );
    }
}
