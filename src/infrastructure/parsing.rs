//! Evidence detectors for listing pages
//!
//! Each detector is compiled once from [`DetectionPatterns`] and evaluated
//! against a [`ParsedDocument`]. Detectors never fail: a missing element or
//! an unusable selector simply yields a failed [`DetectionResult`].

pub mod classifier;
pub mod config;
pub mod document;
pub mod media_detector;
pub mod name_detector;
pub mod photo_evidence;
pub mod sub_page;

// Re-export public types
pub use classifier::Classifier;
pub use config::DetectionPatterns;
pub use document::{ParsedDocument, element_text};
pub use media_detector::{MenuDetector, PhotoDetector, VideoDetector};
pub use name_detector::{LocalizedNameDetector, SecondaryNameDetector};
pub use photo_evidence::PhotoEvidence;
pub use sub_page::compose_sub_page_url;

use crate::domain::DetectionResult;
use once_cell::sync::Lazy;
use scraper::Selector;
use tracing::{debug, warn};

pub(crate) static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
pub(crate) static VIDEO: Lazy<Selector> = Lazy::new(|| Selector::parse("video").unwrap());
pub(crate) static IFRAME: Lazy<Selector> = Lazy::new(|| Selector::parse("iframe").unwrap());

/// A single heuristic verdict over one document
pub trait DocumentDetector {
    fn detect(&self, document: &ParsedDocument) -> DetectionResult;
}

/// Compile selector strings, skipping (and logging) the ones that do not parse
pub(crate) fn compile_selectors(selector_strings: &[String]) -> Vec<Selector> {
    let mut selectors = Vec::with_capacity(selector_strings.len());
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile selector '{}': {}", selector_str, e);
                errors.push(selector_str.as_str());
            }
        }
    }

    if !errors.is_empty() {
        debug!("{} selector(s) skipped: {}", errors.len(), errors.join(", "));
    }

    selectors
}

/// Case-insensitive containment for ASCII markers against arbitrary text
pub(crate) fn contains_any_ci(haystack: &str, needles: &[String]) -> bool {
    let lowered = haystack.to_lowercase();
    needles.iter().any(|n| lowered.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_selectors_are_skipped() {
        let compiled = compile_selectors(&["h1".to_string(), "[[nope".to_string(), ".a".to_string()]);
        assert_eq!(compiled.len(), 2);
    }

    #[test]
    fn marker_match_ignores_case() {
        assert!(contains_any_ci("https://X.test/PlaceHolder.png", &["placeholder".to_string()]));
        assert!(!contains_any_ci("https://x.test/a.png", &["logo".to_string()]));
    }
}
