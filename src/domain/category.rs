//! The six audited content categories and their per-listing verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content element that every listing is expected to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    LocalizedName,
    SecondaryName,
    StorefrontPhoto,
    Menu,
    FoodPhoto,
    Video,
}

impl Category {
    /// All categories in report column order
    pub const ALL: [Category; 6] = [
        Category::LocalizedName,
        Category::SecondaryName,
        Category::StorefrontPhoto,
        Category::Menu,
        Category::FoodPhoto,
        Category::Video,
    ];

    pub const COUNT: usize = Self::ALL.len();

    fn index(self) -> usize {
        match self {
            Category::LocalizedName => 0,
            Category::SecondaryName => 1,
            Category::StorefrontPhoto => 2,
            Category::Menu => 3,
            Category::FoodPhoto => 4,
            Category::Video => 5,
        }
    }

    /// Column label used in reports and logs
    pub fn label(self) -> &'static str {
        match self {
            Category::LocalizedName => "Localized name",
            Category::SecondaryName => "Secondary name",
            Category::StorefrontPhoto => "Storefront photo",
            Category::Menu => "Menu",
            Category::FoodPhoto => "Food photo",
            Category::Video => "Video",
        }
    }

    /// Whether the verdict needs a sub-page fetch
    pub fn uses_sub_page(self) -> bool {
        !matches!(self, Category::LocalizedName | Category::SecondaryName)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one detector for one listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub passed: bool,
    /// Diagnostic only; never consulted when computing status
    pub evidence: Option<String>,
}

impl DetectionResult {
    pub fn pass(evidence: impl Into<String>) -> Self {
        Self {
            passed: true,
            evidence: Some(evidence.into()),
        }
    }

    pub fn fail() -> Self {
        Self::default()
    }

    /// Failed verdict that still records why (e.g. an explicit "no menu" notice)
    pub fn fail_with(evidence: impl Into<String>) -> Self {
        Self {
            passed: false,
            evidence: Some(evidence.into()),
        }
    }

    /// ✓ / ✗ mark used in reports
    pub fn mark(&self) -> &'static str {
        if self.passed { "✓" } else { "✗" }
    }
}

/// Fixed-shape mapping from every category to its verdict
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVerdicts([DetectionResult; Category::COUNT]);

impl CategoryVerdicts {
    /// All six categories failed, no evidence
    pub fn all_failed() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: Category, result: DetectionResult) {
        self.0[category.index()] = result;
    }

    pub fn with(mut self, category: Category, result: DetectionResult) -> Self {
        self.set(category, result);
        self
    }

    pub fn get(&self, category: Category) -> &DetectionResult {
        &self.0[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &DetectionResult)> {
        Category::ALL.into_iter().zip(self.0.iter())
    }

    pub fn pass_count(&self) -> usize {
        self.0.iter().filter(|r| r.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.pass_count() == Category::COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdicts_always_hold_six_entries() {
        let verdicts = CategoryVerdicts::all_failed();
        assert_eq!(verdicts.iter().count(), 6);
        assert_eq!(verdicts.pass_count(), 0);
    }

    #[test]
    fn set_and_get_are_keyed_by_category() {
        let verdicts = CategoryVerdicts::all_failed()
            .with(Category::Menu, DetectionResult::pass("2 photos"))
            .with(Category::Video, DetectionResult::fail_with("no video"));

        assert!(verdicts.get(Category::Menu).passed);
        assert!(!verdicts.get(Category::Video).passed);
        assert_eq!(verdicts.get(Category::Video).evidence.as_deref(), Some("no video"));
        assert_eq!(verdicts.pass_count(), 1);
    }

    #[test]
    fn only_media_categories_use_sub_pages() {
        let sub_pages: Vec<_> = Category::ALL.into_iter().filter(|c| c.uses_sub_page()).collect();
        assert_eq!(
            sub_pages,
            vec![Category::StorefrontPhoto, Category::Menu, Category::FoodPhoto, Category::Video]
        );
    }
}
