//! Batch progress reporting

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::batch_runner::BatchOutcome;
use crate::domain::{CheckReport, ListingReference};

/// Receives batch lifecycle notifications. Indices are zero-based.
pub trait BatchProgress: Send + Sync {
    fn begin(&self, _total: usize) {}
    fn listing_started(&self, _index: usize, _listing: &ListingReference) {}
    fn listing_finished(&self, _index: usize, _report: &CheckReport) {}
    fn finished(&self, _outcome: &BatchOutcome) {}
}

/// Ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl BatchProgress for NoopProgress {}

/// Logs one line per listing with a running counter
#[derive(Debug, Default)]
pub struct LoggingProgress {
    total: AtomicUsize,
}

impl LoggingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchProgress for LoggingProgress {
    fn begin(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        info!("🚀 Checking {} listing(s)", total);
    }

    fn listing_started(&self, index: usize, listing: &ListingReference) {
        let total = self.total.load(Ordering::Relaxed);
        info!("[{}/{}] 🔍 {}", index + 1, total, listing);
    }

    fn listing_finished(&self, index: usize, report: &CheckReport) {
        let total = self.total.load(Ordering::Relaxed);
        info!(
            "[{}/{}] {} {} ({})",
            index + 1,
            total,
            report.status(),
            report.listing_name(),
            report.pass_ratio()
        );
    }

    fn finished(&self, outcome: &BatchOutcome) {
        if outcome.cancelled {
            info!(
                "🛑 Batch {} cancelled after {} listing(s)",
                outcome.run_id,
                outcome.reports.len()
            );
        } else {
            info!("🏁 Batch {} finished: {} listing(s)", outcome.run_id, outcome.reports.len());
        }
    }
}
