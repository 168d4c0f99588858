//! Six-category classifier
//!
//! The two name categories are read straight off the listing document; the
//! four media categories each fetch their own sub-page through a
//! [`PageSource`] and evaluate it before anything else is awaited.

use tracing::{debug, warn};

use super::config::{DetectionPatterns, SubPagePaths};
use super::document::ParsedDocument;
use super::media_detector::{MenuDetector, PhotoDetector, VideoDetector};
use super::name_detector::{LocalizedNameDetector, SecondaryNameDetector};
use super::sub_page::compose_sub_page_url;
use super::DocumentDetector;
use crate::domain::{Category, CategoryVerdicts, DetectionResult};
use crate::infrastructure::page_fetcher::{PageKind, PageSource};

pub struct Classifier {
    localized_name: LocalizedNameDetector,
    secondary_name: SecondaryNameDetector,
    photos: PhotoDetector,
    menu: MenuDetector,
    video: VideoDetector,
    sub_pages: SubPagePaths,
}

impl Classifier {
    pub fn new(patterns: &DetectionPatterns) -> Self {
        Self {
            localized_name: LocalizedNameDetector::new(patterns),
            secondary_name: SecondaryNameDetector::new(patterns),
            photos: PhotoDetector::new(patterns),
            menu: MenuDetector::new(patterns),
            video: VideoDetector::new(patterns),
            sub_pages: patterns.sub_pages.clone(),
        }
    }

    fn detector(&self, category: Category) -> &dyn DocumentDetector {
        match category {
            Category::LocalizedName => &self.localized_name,
            Category::SecondaryName => &self.secondary_name,
            Category::StorefrontPhoto | Category::FoodPhoto => &self.photos,
            Category::Menu => &self.menu,
            Category::Video => &self.video,
        }
    }

    /// Relative path of the sub-page a category is judged on
    pub fn sub_page_path(&self, category: Category) -> Option<&str> {
        match category {
            Category::LocalizedName | Category::SecondaryName => None,
            Category::StorefrontPhoto => Some(&self.sub_pages.storefront),
            Category::Menu => Some(&self.sub_pages.menu),
            Category::FoodPhoto => Some(&self.sub_pages.food),
            Category::Video => Some(&self.sub_pages.video),
        }
    }

    pub fn sub_page_url(&self, base_url: &str, category: Category) -> Option<String> {
        self.sub_page_path(category)
            .map(|path| compose_sub_page_url(base_url, path))
    }

    /// Run one detector against an already-fetched document
    pub fn evaluate(&self, category: Category, document: &ParsedDocument) -> DetectionResult {
        self.detector(category).detect(document)
    }

    /// Name verdicts from the listing document; media categories stay failed
    pub fn classify_listing(&self, document: &ParsedDocument) -> CategoryVerdicts {
        let mut verdicts = CategoryVerdicts::all_failed();
        for category in [Category::LocalizedName, Category::SecondaryName] {
            verdicts.set(category, self.evaluate(category, document));
        }
        verdicts
    }

    /// Fetch the category's sub-page and judge it. A failed fetch is a
    /// failed verdict carrying the error message.
    pub async fn inspect_sub_page(
        &self,
        category: Category,
        base_url: &str,
        source: &dyn PageSource,
    ) -> DetectionResult {
        let Some(url) = self.sub_page_url(base_url, category) else {
            return DetectionResult::fail();
        };

        debug!("🔎 {} sub-page: {}", category, url);
        match source.fetch(&url, PageKind::SubPage).await {
            Ok(page) => self.evaluate(category, &page.document),
            Err(e) => {
                warn!("⚠️ {} sub-page unavailable: {}", category, e);
                DetectionResult::fail_with(e.to_string())
            }
        }
    }
}
