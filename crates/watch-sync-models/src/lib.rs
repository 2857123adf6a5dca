pub mod media;
pub mod outcome;
pub mod progress;
pub mod report;

pub use media::MediaKind;
pub use outcome::{FailedItem, SyncFailure, SyncOutcome, SyncedItem};
pub use progress::{MediaMetadata, ProgressRecord, WATCHED_THRESHOLD};
pub use report::{FailedEntry, SyncReport};
