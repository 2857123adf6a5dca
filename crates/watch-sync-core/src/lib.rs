pub mod classify;
pub mod engine;
pub mod report;

pub use classify::{classify, ClassifiedMedia};
pub use engine::SyncEngine;
pub use report::{write_report, ReportBuilder};
