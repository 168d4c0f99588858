//! Per-listing check use case
//!
//! Resolve the listing URL, acquire the listing page, judge the two name
//! categories on it, then fetch and judge the four media sub-pages with
//! bounded concurrency. Always yields exactly one [`CheckReport`].

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::domain::{Category, CategoryVerdicts, CheckReport, DetectionResult, ListingReference};
use crate::infrastructure::config::CheckerConfig;
use crate::infrastructure::fetch_error::FetchResult;
use crate::infrastructure::page_fetcher::{PageKind, PageSource};
use crate::infrastructure::parsing::{Classifier, ParsedDocument};
use crate::infrastructure::url_resolver::LinkResolver;

const NO_URL_DETAIL: &str = "GenericFetchError: listing has no URL";

pub struct ListingChecker {
    resolver: Arc<dyn LinkResolver>,
    pages: Arc<dyn PageSource>,
    classifier: Classifier,
    sub_page_permits: Semaphore,
    expected_site_marker: Option<String>,
}

impl ListingChecker {
    pub fn new(
        resolver: Arc<dyn LinkResolver>,
        pages: Arc<dyn PageSource>,
        classifier: Classifier,
        config: &CheckerConfig,
        expected_site_marker: Option<String>,
    ) -> Self {
        Self {
            resolver,
            pages,
            classifier,
            sub_page_permits: Semaphore::new(config.max_concurrent_sub_pages.max(1)),
            expected_site_marker: expected_site_marker.filter(|m| !m.trim().is_empty()),
        }
    }

    pub async fn check(&self, listing: &ListingReference) -> CheckReport {
        if !listing.has_url() {
            warn!("⚠️ Skipping '{}': listing has no URL", listing.display_name);
            return CheckReport::acquisition_failed(listing, NO_URL_DETAIL);
        }

        let canonical = self.resolver.resolve(&listing.target_url()).await;
        debug!("Canonical URL for '{}': {}", listing.display_name, canonical);

        let mut verdicts = match self.classify_listing_page(&canonical).await {
            Ok(verdicts) => verdicts,
            Err(e) => {
                error!("❌ Failed to acquire listing '{}': {}", listing.display_name, e);
                return CheckReport::acquisition_failed(listing, e.report_detail());
            }
        };

        let inspections = Category::ALL
            .into_iter()
            .filter(|category| category.uses_sub_page())
            .map(|category| self.inspect(category, &canonical));
        for (category, result) in join_all(inspections).await {
            verdicts.set(category, result);
        }

        let report = CheckReport::classified(listing, verdicts);
        log_verdicts(&report);
        report
    }

    /// Fetch the listing page and judge the name categories. The parsed
    /// document does not outlive this call.
    async fn classify_listing_page(&self, url: &str) -> FetchResult<CategoryVerdicts> {
        let page = self.pages.fetch(url, PageKind::Listing).await?;
        self.warn_if_unexpected_site(&page.document, url);
        Ok(self.classifier.classify_listing(&page.document))
    }

    async fn inspect(&self, category: Category, base_url: &str) -> (Category, DetectionResult) {
        let _permit = self.sub_page_permits.acquire().await.ok();
        let result = self
            .classifier
            .inspect_sub_page(category, base_url, self.pages.as_ref())
            .await;
        (category, result)
    }

    fn warn_if_unexpected_site(&self, document: &ParsedDocument, url: &str) {
        let Some(marker) = &self.expected_site_marker else {
            return;
        };
        let marker = marker.to_lowercase();
        if !document.text().to_lowercase().contains(&marker) && !url.to_lowercase().contains(&marker) {
            warn!("⚠️ '{}' not found in page text or URL; is this the right site? {}", marker, url);
        }
    }
}

fn log_verdicts(report: &CheckReport) {
    info!(
        "{} {} {} ({})",
        if report.is_pass() { "✅" } else { "⚠️" },
        report.listing_name(),
        report.status(),
        report.pass_ratio()
    );
    for (category, result) in report.verdicts().iter() {
        match &result.evidence {
            Some(evidence) => info!("   {} {}: {}", result.mark(), category, evidence),
            None => info!("   {} {}", result.mark(), category),
        }
    }
}
