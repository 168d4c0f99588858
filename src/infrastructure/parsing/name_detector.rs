//! Localized and secondary-script name detectors

use scraper::Selector;
use tracing::debug;

use super::config::DetectionPatterns;
use super::document::{ParsedDocument, element_text};
use super::{DocumentDetector, compile_selectors};
use crate::domain::DetectionResult;

const MIN_LATIN_LETTERS: usize = 3;
const FALLBACK_LATIN_RATIO: f64 = 1.5;
const MIN_FALLBACK_WORD_LEN: usize = 2;

pub(crate) fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn latin_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_alphabetic).count()
}

fn cjk_count(text: &str) -> usize {
    text.chars().filter(|c| is_cjk(*c)).count()
}

/// Passes when a name element carries at least one CJK ideograph
pub struct LocalizedNameDetector {
    selectors: Vec<Selector>,
}

impl LocalizedNameDetector {
    pub fn new(patterns: &DetectionPatterns) -> Self {
        Self {
            selectors: compile_selectors(&patterns.localized_name_selectors),
        }
    }
}

impl DocumentDetector for LocalizedNameDetector {
    fn detect(&self, document: &ParsedDocument) -> DetectionResult {
        for selector in &self.selectors {
            let Some(element) = document.select_first(selector) else {
                continue;
            };
            let text = element_text(element);
            if !text.is_empty() && text.chars().any(is_cjk) {
                return DetectionResult::pass(text);
            }
        }
        debug!("No localized name on {}", document.url());
        DetectionResult::fail()
    }
}

/// Passes when a name element is predominantly Latin letters
pub struct SecondaryNameDetector {
    selectors: Vec<Selector>,
    fallback: Option<Selector>,
}

impl SecondaryNameDetector {
    pub fn new(patterns: &DetectionPatterns) -> Self {
        let fallback = compile_selectors(std::slice::from_ref(&patterns.secondary_name_fallback))
            .into_iter()
            .next();
        Self {
            selectors: compile_selectors(&patterns.secondary_name_selectors),
            fallback,
        }
    }

    fn from_fallback(&self, document: &ParsedDocument) -> Option<String> {
        let element = document.select_first(self.fallback.as_ref()?)?;
        let text = element_text(element);
        let latin = latin_count(&text);

        #[allow(clippy::cast_precision_loss)]
        let dominant = latin as f64 > FALLBACK_LATIN_RATIO * cjk_count(&text) as f64;
        if latin < MIN_LATIN_LETTERS || !dominant {
            return None;
        }

        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|w| w.len() >= MIN_FALLBACK_WORD_LEN && w.chars().all(|c| c.is_ascii_alphabetic()))
            .collect();
        (!words.is_empty()).then(|| words.join(" "))
    }
}

impl DocumentDetector for SecondaryNameDetector {
    fn detect(&self, document: &ParsedDocument) -> DetectionResult {
        for selector in &self.selectors {
            let Some(element) = document.select_first(selector) else {
                continue;
            };
            let text = element_text(element);
            let latin = latin_count(&text);
            if latin >= MIN_LATIN_LETTERS && latin > cjk_count(&text) {
                return DetectionResult::pass(text);
            }
        }

        match self.from_fallback(document) {
            Some(words) => DetectionResult::pass(words),
            None => {
                debug!("No secondary name on {}", document.url());
                DetectionResult::fail()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn page(body: &str) -> ParsedDocument {
        ParsedDocument::parse("https://www.openrice.com/r-1", &format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn localized_name_from_heading() {
        let detector = LocalizedNameDetector::new(&DetectionPatterns::default());
        let result = detector.detect(&page(r#"<h1 class="poi-name">小食堂</h1>"#));
        assert!(result.passed);
        assert_eq!(result.evidence.as_deref(), Some("小食堂"));
    }

    #[test]
    fn localized_name_skips_latin_only_candidates() {
        let detector = LocalizedNameDetector::new(&DetectionPatterns::default());
        let result = detector.detect(&page(r#"<h1>Siu Sik Tong</h1><div data-name="x">小食堂</div>"#));
        assert!(result.passed);
        assert_eq!(result.evidence.as_deref(), Some("小食堂"));
    }

    #[test]
    fn localized_name_absent() {
        let detector = LocalizedNameDetector::new(&DetectionPatterns::default());
        assert!(!detector.detect(&page("<p>nothing here</p>")).passed);
    }

    #[rstest]
    #[case("Abc小食", true)]
    #[case("Ab", false)]
    #[case("Ab小食堂", false)]
    #[case("Siu Sik Tong", true)]
    #[case("ABC小食堂餐", false)]
    fn secondary_name_letter_balance(#[case] text: &str, #[case] expected: bool) {
        let detector = SecondaryNameDetector::new(&DetectionPatterns::default());
        let doc = page(&format!(r#"<div class="pdhs-en-section">{text}</div>"#));
        assert_eq!(detector.detect(&doc).passed, expected, "text: {text}");
    }

    #[test]
    fn secondary_name_falls_back_to_heading_words() {
        let detector = SecondaryNameDetector::new(&DetectionPatterns::default());
        let result = detector.detect(&page("<h1>小食 Siu Sik Tong 3</h1>"));
        assert!(result.passed);
        assert_eq!(result.evidence.as_deref(), Some("Siu Sik Tong"));
    }

    #[test]
    fn secondary_name_fallback_needs_clear_majority() {
        let detector = SecondaryNameDetector::new(&DetectionPatterns::default());
        // 4 Latin letters vs 3 CJK: 4 <= 4.5
        assert!(!detector.detect(&page("<h1>小食堂 Si Tg</h1>")).passed);
    }
}
