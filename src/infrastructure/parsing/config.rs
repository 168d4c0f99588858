//! Detection pattern configuration
//!
//! Centralized table of every site-specific selector, URL marker and phrase
//! the detectors rely on. Serializable so the `patterns` section of the
//! configuration file can override any of it.

use serde::{Deserialize, Serialize};

/// Main pattern table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionPatterns {
    /// Selectors tried in order for the localized (CJK) name
    pub localized_name_selectors: Vec<String>,

    /// Selectors tried in order for the secondary-script (Latin) name
    pub secondary_name_selectors: Vec<String>,

    /// Element inspected when no secondary-name selector matched
    pub secondary_name_fallback: String,

    pub photo: PhotoPatterns,
    pub menu: MenuPatterns,
    pub video: VideoPatterns,
    pub sub_pages: SubPagePaths,

    /// Marker expected in either the page text or the canonical URL;
    /// absence is only logged
    pub expected_site_marker: Option<String>,
}

impl Default for DetectionPatterns {
    fn default() -> Self {
        Self {
            localized_name_selectors: vec![
                r#"h1[class*="name"]"#.to_string(),
                ".restaurant-name".to_string(),
                "h1".to_string(),
                r#"[class*="中文"]"#.to_string(),
                "[data-name]".to_string(),
                ".poi-name".to_string(),
                r#"[class*="poi-name"]"#.to_string(),
            ],
            secondary_name_selectors: vec![
                ".pdhs-en-section".to_string(),
                r#"[class*="pdhs-en-section"]"#.to_string(),
                r#"[class*="english"]"#.to_string(),
                r#"[class*="en-name"]"#.to_string(),
                r#"[class*="english-name"]"#.to_string(),
                "h2".to_string(),
                ".restaurant-name-en".to_string(),
                r#"[class*="name-en"]"#.to_string(),
            ],
            secondary_name_fallback: "h1".to_string(),
            photo: PhotoPatterns::default(),
            menu: MenuPatterns::default(),
            video: VideoPatterns::default(),
            sub_pages: SubPagePaths::default(),
            expected_site_marker: Some("openrice".to_string()),
        }
    }
}

/// Markers used to tell real uploaded photos apart from decorative images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoPatterns {
    /// Attributes consulted in order; the first non-empty one is the source
    pub source_attributes: Vec<String>,
    /// Case-insensitive substrings that disqualify a source
    pub rejected_source_markers: Vec<String>,
    pub gallery_containers: Vec<String>,
    /// A gallery image counts if its source contains any of these
    pub gallery_markers: Vec<String>,
    /// Stricter markers for the page-wide pass
    pub page_wide_markers: Vec<String>,
    /// Source substrings identifying storefront images
    pub storefront_source_markers: Vec<String>,
    /// Alt-text substrings identifying storefront images
    pub storefront_alt_markers: Vec<String>,
}

impl Default for PhotoPatterns {
    fn default() -> Self {
        Self {
            source_attributes: vec![
                "src".to_string(),
                "data-src".to_string(),
                "data-lazy-src".to_string(),
                "data-original".to_string(),
            ],
            rejected_source_markers: vec![
                "placeholder".to_string(),
                "logo".to_string(),
                "avatar".to_string(),
            ],
            gallery_containers: vec![
                r#"[class*="media-list"]"#.to_string(),
                r#"[class*="photo-list"]"#.to_string(),
                r#"[class*="image-list"]"#.to_string(),
                r#"[class*="gallery"]"#.to_string(),
                r#"[class*="photo-grid"]"#.to_string(),
            ],
            gallery_markers: vec![
                "orstatic.com".to_string(),
                "/photo/".to_string(),
                "userphoto".to_string(),
            ],
            page_wide_markers: vec!["userphoto".to_string(), "/photo/".to_string()],
            storefront_source_markers: vec!["doorphoto".to_string()],
            storefront_alt_markers: vec![
                "door".to_string(),
                "門面".to_string(),
                "门面".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuPatterns {
    /// Explicit "this listing has no menu" notices
    pub no_menu_phrases: Vec<String>,
    pub empty_state_selectors: Vec<String>,
}

impl Default for MenuPatterns {
    fn default() -> Self {
        Self {
            no_menu_phrases: [
                "此餐廳暫時沒有菜單",
                "此餐厅暂时没有菜单",
                "暫無菜單",
                "暂无菜单",
                "沒有菜單",
                "没有菜单",
                "尚無菜單",
                "尚无菜单",
                "no menu",
                "暫時沒有",
                "暂时没有",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            empty_state_selectors: vec![
                r#"[class*="empty"]"#.to_string(),
                r#"[class*="no-menu"]"#.to_string(),
                r#"[class*="no_menu"]"#.to_string(),
                r#"[id*="empty"]"#.to_string(),
                r#"[id*="no-menu"]"#.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPatterns {
    /// Case-insensitive platform markers for `iframe` sources
    pub iframe_platforms: Vec<String>,
    pub media_containers: Vec<String>,
    /// A thumbnail source containing any of these is a video thumbnail
    pub cdn_hosts: Vec<String>,
    /// Base CDN marker that needs one of `cdn_path_markers` alongside it
    pub cdn_base: String,
    pub cdn_path_markers: Vec<String>,
}

impl Default for VideoPatterns {
    fn default() -> Self {
        Self {
            iframe_platforms: ["youtube", "vimeo", "video", "youku", "tiktok", "instagram"]
                .into_iter()
                .map(String::from)
                .collect(),
            media_containers: vec![
                r#"[class*="video"]"#.to_string(),
                r#"[class*="reel"]"#.to_string(),
                r#"[class*="media"]"#.to_string(),
            ],
            cdn_hosts: vec!["c-vod.orstatic.com".to_string()],
            cdn_base: "orstatic.com".to_string(),
            cdn_path_markers: vec!["/video/".to_string(), "reel".to_string()],
        }
    }
}

/// Relative sub-page paths appended to the canonical listing URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubPagePaths {
    pub storefront: String,
    pub menu: String,
    pub food: String,
    pub video: String,
}

impl Default for SubPagePaths {
    fn default() -> Self {
        Self {
            storefront: "photos/decor".to_string(),
            menu: "menus".to_string(),
            food: "photos/food".to_string(),
            video: "photos/videos".to_string(),
        }
    }
}
