//! Excerpt to plain-text conversion for description meta tags

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid shortcode pattern"));

/// Plain-text form of an HTML excerpt for description meta tags.
///
/// Strips all tags, then removes only the first `[...]` group (a leftover
/// CMS shortcode such as `[&hellip;]`).
pub fn sanitize(input: Option<&str>) -> String {
    let Some(text) = input.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let without_tags = TAG.replace_all(text, "");
    SHORTCODE.replace(&without_tags, "").into_owned()
}
