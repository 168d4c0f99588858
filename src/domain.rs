//! Domain module - listings, audit categories and check reports
//!
//! This module contains the value types that flow between the acquisition
//! layer, the classifier and the report writer. Everything here is plain data
//! with invariants enforced by constructors; no I/O happens in this layer.

pub mod category;
pub mod listing;
pub mod report;

// Re-export commonly used items for convenience
pub use category::{Category, CategoryVerdicts, DetectionResult};
pub use listing::ListingReference;
pub use report::{CheckReport, ReportStatus};
