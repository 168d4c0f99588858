//! Sub-page URL composition

const PHOTOS_SEGMENT: &str = "/photos";

/// Build the URL of a listing sub-page (`photos/decor`, `menus`, ...).
///
/// Query and fragment are dropped. When the base already points into the
/// photo section, everything from the last `/photos` segment onward is
/// replaced; otherwise the sub-path is appended.
pub fn compose_sub_page_url(base: &str, sub_path: &str) -> String {
    let base = base
        .find(['?', '#'])
        .map_or(base, |cut| &base[..cut]);
    let sub_path = sub_path.trim_start_matches('/');

    match last_photos_segment(base) {
        Some(idx) => format!("{}/{}", &base[..idx], sub_path),
        None => format!("{}/{}", base.trim_end_matches('/'), sub_path),
    }
}

/// Byte offset of the last `/photos` segment that ends at `/` or end of input
fn last_photos_segment(base: &str) -> Option<usize> {
    base.match_indices(PHOTOS_SEGMENT)
        .filter(|(idx, _)| {
            let rest = &base[idx + PHOTOS_SEGMENT.len()..];
            rest.is_empty() || rest.starts_with('/')
        })
        .map(|(idx, _)| idx)
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const BASE: &str = "https://www.openrice.com/zh/hongkong/r-abc-r12345";

    #[rstest]
    #[case(BASE, "menus", "https://www.openrice.com/zh/hongkong/r-abc-r12345/menus")]
    #[case("https://x.test/r-abc/", "menus", "https://x.test/r-abc/menus")]
    #[case("https://x.test/r-abc/photos", "photos/videos", "https://x.test/r-abc/photos/videos")]
    #[case("https://x.test/r-abc/photos/food", "menus", "https://x.test/r-abc/menus")]
    #[case("https://x.test/r-abc?_sUrl=1#top", "photos/decor", "https://x.test/r-abc/photos/decor")]
    #[case("https://x.test/r-photosynth", "menus", "https://x.test/r-photosynth/menus")]
    #[case("https://x.test/photos/r-abc/photos/decor", "photos/food", "https://x.test/photos/r-abc/photos/food")]
    #[case("https://x.test/r-abc/photoshop", "menus", "https://x.test/r-abc/photoshop/menus")]
    fn composes_sub_pages(#[case] base: &str, #[case] sub: &str, #[case] expected: &str) {
        assert_eq!(compose_sub_page_url(base, sub), expected);
    }

    proptest! {
        #[test]
        fn retargeting_a_photo_page_is_stable(slug in "r-[a-z0-9-]{1,20}", first in "(decor|food|videos)") {
            let base = format!("https://x.test/{slug}");
            let photo_page = compose_sub_page_url(&base, &format!("photos/{first}"));
            prop_assert_eq!(
                compose_sub_page_url(&photo_page, "photos/food"),
                compose_sub_page_url(&base, "photos/food")
            );
            prop_assert_eq!(compose_sub_page_url(&photo_page, "menus"), format!("{base}/menus"));
        }
    }
}
