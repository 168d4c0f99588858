//! Sequential batch driver
//!
//! Listings are checked one at a time in input order. The cancellation token
//! is consulted between listings only, so a listing that has started always
//! produces its report.

use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::listing_checker::ListingChecker;
use super::progress::BatchProgress;
use crate::domain::{CheckReport, ListingReference};

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub run_id: Uuid,
    /// One report per processed listing, in input order
    pub reports: Vec<CheckReport>,
    pub cancelled: bool,
}

pub struct BatchRunner {
    checker: ListingChecker,
    listing_delay: Duration,
}

impl BatchRunner {
    /// `listing_delay` is the pause between two consecutive listings
    pub fn new(checker: ListingChecker, listing_delay: Duration) -> Self {
        Self { checker, listing_delay }
    }

    pub async fn run(
        &self,
        listings: &[ListingReference],
        cancel_token: &CancellationToken,
        progress: &dyn BatchProgress,
    ) -> BatchOutcome {
        let run_id = Uuid::new_v4();
        info!("🚀 Batch {} started: {} listing(s)", run_id, listings.len());
        progress.begin(listings.len());

        let mut reports = Vec::with_capacity(listings.len());
        let mut cancelled = false;

        for (index, listing) in listings.iter().enumerate() {
            if cancel_token.is_cancelled() {
                info!("🛑 Cancellation requested, stopping before listing {}", index + 1);
                cancelled = true;
                break;
            }

            progress.listing_started(index, listing);
            let report = self.checker.check(listing).await;
            progress.listing_finished(index, &report);
            reports.push(report);

            let is_last = index + 1 == listings.len();
            if !is_last && !self.listing_delay.is_zero() {
                debug!("⏳ Waiting {:?} before the next listing", self.listing_delay);
                tokio::select! {
                    () = cancel_token.cancelled() => {}
                    () = tokio::time::sleep(self.listing_delay) => {}
                }
            }
        }

        let outcome = BatchOutcome {
            run_id,
            reports,
            cancelled,
        };
        progress.finished(&outcome);
        outcome
    }
}
