pub mod error;
pub mod store;
pub mod traits;
pub mod trakt;

pub use error::SourceError;
pub use store::SqliteProgressStore;
pub use traits::{
    EpisodeMatch, HistoryEntry, HistoryEntryKind, HistoryService, MovieMatch, ProgressStore,
    ShowMatch,
};
pub use trakt::{TraktClient, TraktIds};
