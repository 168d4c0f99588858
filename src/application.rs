//! Application layer module
//!
//! This module contains the use cases that orchestrate acquisition and
//! classification: checking one listing and running a batch of them.

pub mod batch_runner;
pub mod listing_checker;
pub mod progress;

pub use batch_runner::{BatchOutcome, BatchRunner};
pub use listing_checker::ListingChecker;
pub use progress::{BatchProgress, LoggingProgress, NoopProgress};
