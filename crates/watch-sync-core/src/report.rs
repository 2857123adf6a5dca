use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use watch_sync_models::{SyncOutcome, SyncReport};

/// Accumulates one outcome per processed record and renders the run report.
/// Pure bookkeeping; the engine owns all decision logic.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    outcomes: Vec<SyncOutcome>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: SyncOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn finalize(self) -> SyncReport {
        let mut synced_items = Vec::new();
        let mut failed_items = Vec::new();

        for outcome in self.outcomes {
            match outcome {
                SyncOutcome::Synced(item) => synced_items.push(item),
                SyncOutcome::Failed(item) => failed_items.push(item.to_entry()),
            }
        }

        SyncReport {
            synced_count: synced_items.len(),
            failed_count: failed_items.len(),
            synced_items,
            failed_items,
        }
    }
}

/// Persist the report: write a temp sibling, then rename over the target so
/// readers never observe a half-written file. Overwrites any prior report.
pub fn write_report(path: &Path, report: &SyncReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory {}", parent.display()))?;
    }

    let content = serde_json::to_vec_pretty(report).context("failed to serialize sync report")?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write report to {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to move report into place at {}", path.display()))?;

    info!(
        "Wrote sync report to {} ({} synced, {} failed)",
        path.display(),
        report.synced_count,
        report.failed_count
    );
    Ok(())
}
