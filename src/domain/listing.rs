use serde::{Deserialize, Serialize};
use std::fmt;

/// One restaurant listing to audit, as read from one input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingReference {
    /// Display name from the input sheet (used only for reporting)
    pub display_name: String,
    /// Listing URL as entered (may be a short link or lack a scheme)
    pub source_url: String,
}

impl ListingReference {
    pub fn new(display_name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            source_url: source_url.into(),
        }
    }

    /// True when the row carried no usable URL at all
    pub fn has_url(&self) -> bool {
        !self.source_url.trim().is_empty()
    }

    /// URL to request: trimmed, with `https://` added when no scheme was given
    pub fn target_url(&self) -> String {
        let trimmed = self.source_url.trim();
        if trimmed.starts_with("http") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        }
    }
}

impl fmt::Display for ListingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.source_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_url_adds_missing_scheme() {
        let listing = ListingReference::new("A", " s.openrice.com/abc ");
        assert_eq!(listing.target_url(), "https://s.openrice.com/abc");
    }

    #[test]
    fn target_url_keeps_existing_scheme() {
        let listing = ListingReference::new("A", "http://example.com/r-1");
        assert_eq!(listing.target_url(), "http://example.com/r-1");
    }

    #[test]
    fn blank_url_is_reported() {
        assert!(!ListingReference::new("A", "   ").has_url());
        assert!(ListingReference::new("A", "x").has_url());
    }
}
