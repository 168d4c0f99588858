//! Per-listing check report
//!
//! A `CheckReport` can only be built through [`CheckReport::classified`] or
//! [`CheckReport::acquisition_failed`], which keeps status, pass ratio and the
//! verdicts consistent with each other.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{Category, CategoryVerdicts};
use super::listing::ListingReference;

/// Overall outcome of one listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    /// All six categories passed
    Pass,
    /// Classification ran, at least one category failed
    Fail,
    /// The listing page could not be acquired
    Error,
}

impl ReportStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Pass => "PASS",
            ReportStatus::Fail => "FAIL",
            ReportStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    listing_name: String,
    source_url: String,
    checked_at: DateTime<Local>,
    verdicts: CategoryVerdicts,
    status: ReportStatus,
    error_detail: Option<String>,
}

impl CheckReport {
    /// Report for a listing whose page was acquired and classified
    pub fn classified(listing: &ListingReference, verdicts: CategoryVerdicts) -> Self {
        let status = if verdicts.all_passed() {
            ReportStatus::Pass
        } else {
            ReportStatus::Fail
        };
        Self {
            listing_name: listing.display_name.clone(),
            source_url: listing.source_url.clone(),
            checked_at: Local::now(),
            verdicts,
            status,
            error_detail: None,
        }
    }

    /// Report for a listing whose acquisition failed; every category is failed
    pub fn acquisition_failed(listing: &ListingReference, detail: impl Into<String>) -> Self {
        Self {
            listing_name: listing.display_name.clone(),
            source_url: listing.source_url.clone(),
            checked_at: Local::now(),
            verdicts: CategoryVerdicts::all_failed(),
            status: ReportStatus::Error,
            error_detail: Some(detail.into()),
        }
    }

    pub fn listing_name(&self) -> &str {
        &self.listing_name
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn checked_at(&self) -> DateTime<Local> {
        self.checked_at
    }

    pub fn verdicts(&self) -> &CategoryVerdicts {
        &self.verdicts
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn pass_count(&self) -> usize {
        self.verdicts.pass_count()
    }

    /// "k/6"
    pub fn pass_ratio(&self) -> String {
        format!("{}/{}", self.pass_count(), Category::COUNT)
    }

    pub fn is_pass(&self) -> bool {
        self.status == ReportStatus::Pass
    }
}
