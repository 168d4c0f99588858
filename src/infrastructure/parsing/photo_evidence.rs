//! Real-photo evidence shared by the storefront, food, menu and video detectors
//!
//! A "real" photo is an image whose source is absolute, is not a placeholder,
//! logo or avatar, and points at user-uploaded photo storage. Galleries are
//! searched first; only when they yield nothing is the whole page scanned
//! with the stricter page-wide markers.

use scraper::{ElementRef, Selector};
use std::collections::HashSet;

use super::config::PhotoPatterns;
use super::document::ParsedDocument;
use super::{IMAGE, compile_selectors, contains_any_ci};

/// Distinct qualifying image sources, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoMatches {
    sources: Vec<String>,
}

impl PhotoMatches {
    fn push(&mut self, seen: &mut HashSet<String>, source: &str) {
        if seen.insert(source.to_string()) {
            self.sources.push(source.to_string());
        }
    }

    pub fn count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }

    /// `"<n> photo(s), first: <src>"`
    pub fn evidence(&self) -> String {
        match self.first() {
            Some(first) => format!("{} photo(s), first: {}", self.count(), first),
            None => "0 photo(s)".to_string(),
        }
    }
}

pub struct PhotoEvidence {
    patterns: PhotoPatterns,
    gallery_containers: Vec<Selector>,
}

impl PhotoEvidence {
    pub fn new(patterns: &PhotoPatterns) -> Self {
        Self {
            patterns: patterns.clone(),
            gallery_containers: compile_selectors(&patterns.gallery_containers),
        }
    }

    /// First non-empty source attribute of an image
    pub fn image_source<'a>(&self, image: ElementRef<'a>) -> Option<&'a str> {
        self.patterns
            .source_attributes
            .iter()
            .filter_map(|attr| image.value().attr(attr))
            .map(str::trim)
            .find(|src| !src.is_empty())
    }

    /// Absolute and not a placeholder, logo or avatar
    pub fn accepts_source(&self, source: &str) -> bool {
        let absolute = source.starts_with("http") || source.starts_with("//");
        absolute && !contains_any_ci(source, &self.patterns.rejected_source_markers)
    }

    /// Storefront images are identified by source or alt text
    pub fn is_storefront(&self, image: ElementRef<'_>, source: &str) -> bool {
        let alt = image.value().attr("alt").unwrap_or_default();
        contains_any_ci(source, &self.patterns.storefront_source_markers)
            || contains_any_ci(alt, &self.patterns.storefront_alt_markers)
    }

    /// Count real photos, optionally leaving out storefront images
    pub fn collect(&self, document: &ParsedDocument, exclude_storefront: bool) -> PhotoMatches {
        let mut matches = PhotoMatches::default();
        let mut seen = HashSet::new();

        for container_selector in &self.gallery_containers {
            for container in document.select_all(container_selector) {
                for image in container.select(&IMAGE) {
                    if let Some(src) =
                        self.qualifying_source(image, &self.patterns.gallery_markers, exclude_storefront)
                    {
                        matches.push(&mut seen, src);
                    }
                }
            }
        }

        if matches.is_empty() {
            for image in document.select_all(&IMAGE) {
                if let Some(src) =
                    self.qualifying_source(image, &self.patterns.page_wide_markers, exclude_storefront)
                {
                    matches.push(&mut seen, src);
                }
            }
        }

        matches
    }

    fn qualifying_source<'a>(
        &self,
        image: ElementRef<'a>,
        markers: &[String],
        exclude_storefront: bool,
    ) -> Option<&'a str> {
        let src = self.image_source(image)?;
        if !self.accepts_source(src) || !markers.iter().any(|m| src.contains(m.as_str())) {
            return None;
        }
        if exclude_storefront && self.is_storefront(image, src) {
            return None;
        }
        Some(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn evidence() -> PhotoEvidence {
        PhotoEvidence::new(&PhotoPatterns::default())
    }

    fn doc(body: &str) -> ParsedDocument {
        ParsedDocument::parse("https://x.test/photos/food", &format!("<html><body>{body}</body></html>"))
    }

    #[rstest]
    #[case("https://static8.orstatic.com/userphoto/photo/1/a.jpg", true)]
    #[case("//static8.orstatic.com/userphoto/photo/1/a.jpg", true)]
    #[case("/userphoto/photo/1/a.jpg", false)]
    #[case("https://static8.orstatic.com/Placeholder.png", false)]
    #[case("https://static8.orstatic.com/site/LOGO.png", false)]
    #[case("https://static8.orstatic.com/avatar/1.png", false)]
    fn source_filter(#[case] src: &str, #[case] expected: bool) {
        assert_eq!(evidence().accepts_source(src), expected);
    }

    #[test]
    fn gallery_images_are_counted_once_per_source() {
        let page = doc(
            r#"<div class="photo-list"><div class="media-list">
                 <img src="https://static8.orstatic.com/userphoto/photo/1/a.jpg">
               </div>
               <img data-src="https://static8.orstatic.com/userphoto/photo/1/b.jpg" src="">
               </div>"#,
        );
        let matches = evidence().collect(&page, false);
        assert_eq!(matches.count(), 2);
        assert_eq!(matches.first(), Some("https://static8.orstatic.com/userphoto/photo/1/a.jpg"));
    }

    #[test]
    fn page_wide_pass_uses_stricter_markers() {
        let page = doc(
            r#"<img src="https://static8.orstatic.com/banner.jpg">
               <img src="https://cdn.test/userphoto/9.jpg">"#,
        );
        let matches = evidence().collect(&page, false);
        assert_eq!(matches.count(), 1);
        assert_eq!(matches.first(), Some("https://cdn.test/userphoto/9.jpg"));
    }

    #[test]
    fn storefront_images_can_be_excluded() {
        let page = doc(
            r#"<div class="gallery">
                 <img src="https://static8.orstatic.com/userphoto/doorphoto/1.jpg">
                 <img src="https://static8.orstatic.com/userphoto/photo/2.jpg" alt="餐廳門面">
               </div>"#,
        );
        assert_eq!(evidence().collect(&page, false).count(), 2);
        assert!(evidence().collect(&page, true).is_empty());
    }
}
