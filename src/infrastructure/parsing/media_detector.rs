//! Sub-page detectors: storefront/food photos, menu and video

use regex::{Regex, RegexBuilder};
use scraper::Selector;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::{DetectionPatterns, VideoPatterns};
use super::document::{ParsedDocument, element_text};
use super::photo_evidence::PhotoEvidence;
use super::{DocumentDetector, IFRAME, IMAGE, VIDEO, compile_selectors, contains_any_ci};
use crate::domain::DetectionResult;

/// Storefront and food photo pages: pass on at least one real photo
pub struct PhotoDetector {
    evidence: PhotoEvidence,
}

impl PhotoDetector {
    pub fn new(patterns: &DetectionPatterns) -> Self {
        Self {
            evidence: PhotoEvidence::new(&patterns.photo),
        }
    }
}

impl DocumentDetector for PhotoDetector {
    fn detect(&self, document: &ParsedDocument) -> DetectionResult {
        let photos = self.evidence.collect(document, false);
        debug!("📷 {} real photo(s) on {}", photos.count(), document.url());
        if photos.is_empty() {
            DetectionResult::fail()
        } else {
            DetectionResult::pass(photos.evidence())
        }
    }
}

/// Menu page: an explicit "no menu" notice wins over any photos found
pub struct MenuDetector {
    no_menu: Option<Regex>,
    empty_state: Vec<Selector>,
    evidence: PhotoEvidence,
}

impl MenuDetector {
    pub fn new(patterns: &DetectionPatterns) -> Self {
        Self {
            no_menu: phrase_matcher(&patterns.menu.no_menu_phrases),
            empty_state: compile_selectors(&patterns.menu.empty_state_selectors),
            evidence: PhotoEvidence::new(&patterns.photo),
        }
    }

    fn no_menu_notice(&self, document: &ParsedDocument) -> Option<String> {
        let matcher = self.no_menu.as_ref()?;
        if let Some(found) = matcher.find(document.text()) {
            return Some(found.as_str().to_string());
        }
        self.empty_state
            .iter()
            .flat_map(|selector| document.select_all(selector))
            .find_map(|element| {
                let text = element_text(element);
                matcher.find(&text).map(|m| m.as_str().to_string())
            })
    }
}

/// One case-insensitive alternation over literal phrases
fn phrase_matcher(phrases: &[String]) -> Option<Regex> {
    let alternation = phrases
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    if alternation.is_empty() {
        return None;
    }
    match RegexBuilder::new(&alternation).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Failed to build no-menu matcher: {}", e);
            None
        }
    }
}

impl DocumentDetector for MenuDetector {
    fn detect(&self, document: &ParsedDocument) -> DetectionResult {
        if let Some(phrase) = self.no_menu_notice(document) {
            debug!("📋 No-menu notice '{}' on {}", phrase, document.url());
            return DetectionResult::fail_with(format!("no-menu notice: {phrase}"));
        }

        let photos = self.evidence.collect(document, true);
        debug!("📋 {} menu photo(s) on {}", photos.count(), document.url());
        if photos.is_empty() {
            DetectionResult::fail()
        } else {
            DetectionResult::pass(photos.evidence())
        }
    }
}

/// Video page: a `video` element, a platform iframe, or a video CDN thumbnail
pub struct VideoDetector {
    patterns: VideoPatterns,
    media_containers: Vec<Selector>,
    evidence: PhotoEvidence,
}

impl VideoDetector {
    pub fn new(patterns: &DetectionPatterns) -> Self {
        Self {
            patterns: patterns.video.clone(),
            media_containers: compile_selectors(&patterns.video.media_containers),
            evidence: PhotoEvidence::new(&patterns.photo),
        }
    }

    fn is_video_thumbnail(&self, source: &str) -> bool {
        let on_vod_host = self.patterns.cdn_hosts.iter().any(|h| source.contains(h.as_str()));
        on_vod_host
            || (source.contains(self.patterns.cdn_base.as_str())
                && contains_any_ci(source, &self.patterns.cdn_path_markers))
    }

    fn thumbnails(&self, document: &ParsedDocument) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for container_selector in &self.media_containers {
            for container in document.select_all(container_selector) {
                for image in container.select(&IMAGE) {
                    let Some(src) = self.evidence.image_source(image) else {
                        continue;
                    };
                    if self.evidence.accepts_source(src)
                        && !self.evidence.is_storefront(image, src)
                        && self.is_video_thumbnail(src)
                        && seen.insert(src.to_string())
                    {
                        found.push(src.to_string());
                    }
                }
            }
        }
        found
    }
}

impl DocumentDetector for VideoDetector {
    fn detect(&self, document: &ParsedDocument) -> DetectionResult {
        let videos = document.select_all(&VIDEO).count();
        if videos > 0 {
            return DetectionResult::pass(format!("{videos} video element(s)"));
        }

        let embedded = document.select_all(&IFRAME).find_map(|iframe| {
            iframe
                .value()
                .attr("src")
                .filter(|src| contains_any_ci(src, &self.patterns.iframe_platforms))
        });
        if let Some(src) = embedded {
            return DetectionResult::pass(format!("embedded player: {src}"));
        }

        let thumbnails = self.thumbnails(document);
        debug!("🎬 {} video thumbnail(s) on {}", thumbnails.len(), document.url());
        match thumbnails.first() {
            Some(first) => DetectionResult::pass(format!("{} thumbnail(s), first: {}", thumbnails.len(), first)),
            None => DetectionResult::fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn doc(body: &str) -> ParsedDocument {
        ParsedDocument::parse("https://x.test/r-abc/menus", &format!("<html><body>{body}</body></html>"))
    }

    const MENU_GALLERY: &str = r#"<div class="photo-grid">
        <img src="https://static8.orstatic.com/userphoto/photo/1/menu1.jpg" alt="menu">
    </div>"#;

    #[test]
    fn photo_page_passes_with_one_photo() {
        let detector = PhotoDetector::new(&DetectionPatterns::default());
        let result = detector.detect(&doc(MENU_GALLERY));
        assert!(result.passed);
        assert!(result.evidence.unwrap().starts_with("1 photo(s)"));
    }

    #[test]
    fn photo_page_without_photos_fails() {
        let detector = PhotoDetector::new(&DetectionPatterns::default());
        let result = detector.detect(&doc(r#"<img src="https://static8.orstatic.com/placeholder.png">"#));
        assert!(!result.passed);
    }

    #[test]
    fn menu_with_photos_passes() {
        let detector = MenuDetector::new(&DetectionPatterns::default());
        assert!(detector.detect(&doc(MENU_GALLERY)).passed);
    }

    #[test]
    fn no_menu_notice_wins_over_photos() {
        let detector = MenuDetector::new(&DetectionPatterns::default());
        let page = doc(&format!("<p>此餐廳暫時沒有菜單</p>{MENU_GALLERY}"));
        let result = detector.detect(&page);
        assert!(!result.passed);
        assert_eq!(result.evidence.as_deref(), Some("no-menu notice: 此餐廳暫時沒有菜單"));
    }

    #[test]
    fn latin_no_menu_notice_ignores_case() {
        let detector = MenuDetector::new(&DetectionPatterns::default());
        let page = doc(&format!(r#"<div class="empty-state">No Menu yet</div>{MENU_GALLERY}"#));
        assert!(!detector.detect(&page).passed);
    }

    #[test]
    fn menu_ignores_storefront_photos() {
        let detector = MenuDetector::new(&DetectionPatterns::default());
        let page = doc(
            r#"<div class="gallery"><img src="https://static8.orstatic.com/userphoto/doorphoto/1.jpg"></div>"#,
        );
        assert!(!detector.detect(&page).passed);
    }

    #[test]
    fn video_element_passes() {
        let detector = VideoDetector::new(&DetectionPatterns::default());
        assert!(detector.detect(&doc(r#"<video src="https://x.test/a.mp4"></video>"#)).passed);
    }

    #[test]
    fn platform_iframe_passes() {
        let detector = VideoDetector::new(&DetectionPatterns::default());
        let result = detector.detect(&doc(r#"<iframe src="https://www.YouTube.com/embed/xyz"></iframe>"#));
        assert!(result.passed);
        assert_eq!(
            result.evidence.as_deref(),
            Some("embedded player: https://www.YouTube.com/embed/xyz")
        );
    }

    #[test]
    fn video_cdn_thumbnail_passes() {
        let detector = VideoDetector::new(&DetectionPatterns::default());
        let page = doc(
            r#"<div class="video-list">
                 <img src="https://c-vod.orstatic.com/thumb/1.jpg">
               </div>"#,
        );
        assert!(detector.detect(&page).passed);
    }

    #[rstest]
    #[case::storefront_alt(r#"<img src="https://c-vod.orstatic.com/thumb/1.jpg" alt="餐廳門面">"#)]
    #[case::storefront_source(r#"<img src="https://c-vod.orstatic.com/doorphoto/1.jpg">"#)]
    fn storefront_images_are_not_video_thumbnails(#[case] image: &str) {
        let detector = VideoDetector::new(&DetectionPatterns::default());
        let page = doc(&format!(r#"<div class="video-list">{image}</div>"#));
        let result = detector.detect(&page);
        assert!(!result.passed);
        assert_eq!(result.evidence, None);
    }

    #[test]
    fn ordinary_photos_are_not_videos() {
        let detector = VideoDetector::new(&DetectionPatterns::default());
        let page = doc(
            r#"<div class="media-list">
                 <img src="https://static8.orstatic.com/userphoto/photo/1.jpg">
               </div><iframe src="https://maps.test/embed"></iframe>"#,
        );
        assert!(!detector.detect(&page).passed);
    }
}
