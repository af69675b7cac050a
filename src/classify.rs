//! Legislative-period classification of document links.
//!
//! Each discovered link is sorted into a Wahlperiode bucket, which
//! becomes the name of the directory the file is downloaded into. The
//! classifier trusts page structure over URL heuristics: a link inside
//! a correctly titled collapsible section is bucketed by that title even
//! when its URL would match the fallback patterns with a different
//! number.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::trace;

/// Bucket for links whose period cannot be determined from either the
/// surrounding section or the URL.
pub const UNKNOWN_BUCKET: &str = "Unknown_Wahlperiode";

/// Class marking the collapsible sections that group links by period.
const SECTION_CLASS: &str = "bt-collapse";

/// Regex for the two accepted title forms: an ordinal period
/// ("19. Wahlperiode") or the combined range ("1. - 19. Wahlperiode").
#[allow(clippy::expect_used)]
static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.\s*Wahlperiode|1\.\s*-\s*19\.\s*Wahlperiode)")
        .expect("title regex is valid") // Static pattern, safe to panic
});

/// Regex for the `wpN` token in URLs, e.g. `.../wp19/pp19001.xml`.
#[allow(clippy::expect_used)]
static WP_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wp(\d+)").expect("wp token regex is valid"));

/// Regex for the `wahlperiode-N` token in URLs.
#[allow(clippy::expect_used)]
static WP_SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wahlperiode-(\d+)").expect("wahlperiode regex is valid"));

/// Selector for the title element inside a collapsible section.
#[allow(clippy::expect_used)]
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2.bt-collapse-title").expect("title selector is valid")
});

/// Determines the Wahlperiode bucket for a document link.
///
/// Resolution order:
/// 1. The title of the nearest enclosing `div.bt-collapse` section,
///    matched against the two accepted title forms and normalized
///    (spaces to underscores, periods stripped).
/// 2. A `wpN` or `wahlperiode-N` token in the link's href, yielding
///    `{N}_Wahlperiode`.
/// 3. The fixed [`UNKNOWN_BUCKET`] sentinel.
///
/// Malformed or missing title nodes never fail classification; they fall
/// through to the next step. Given the same node and tree, the result is
/// deterministic.
#[must_use]
pub fn classify(link: ElementRef<'_>) -> String {
    if let Some(bucket) = bucket_from_section(link) {
        trace!(bucket = %bucket, "classified from section title");
        return bucket;
    }

    if let Some(href) = link.value().attr("href")
        && let Some(bucket) = bucket_from_href(href)
    {
        trace!(bucket = %bucket, "classified from href pattern");
        return bucket;
    }

    UNKNOWN_BUCKET.to_string()
}

/// Extracts the bucket from the nearest enclosing collapsible section.
fn bucket_from_section(link: ElementRef<'_>) -> Option<String> {
    let section = link
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "div" && el.value().classes().any(|c| c == SECTION_CLASS)
        })?;

    let title = section.select(&TITLE_SELECTOR).next()?;
    let title_text: String = title.text().collect();
    let matched = TITLE_PATTERN.find(&title_text)?;

    Some(normalize_title(matched.as_str()))
}

/// Extracts the bucket from `wpN` / `wahlperiode-N` tokens in the href.
fn bucket_from_href(href: &str) -> Option<String> {
    let captures = WP_TOKEN_PATTERN
        .captures(href)
        .or_else(|| WP_SEGMENT_PATTERN.captures(href))?;
    let number = captures.get(1)?.as_str();
    Some(format!("{number}_Wahlperiode"))
}

/// Normalizes a matched title into a directory-safe bucket name:
/// `"19. Wahlperiode"` becomes `"19_Wahlperiode"`, the range form
/// `"1. - 19. Wahlperiode"` becomes `"1_-_19_Wahlperiode"`.
fn normalize_title(matched: &str) -> String {
    matched.replace(' ', "_").replace('.', "")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use scraper::Html;

    /// Parses a snippet and returns the classification of its first anchor.
    fn classify_first_anchor(html: &str) -> String {
        let document = Html::parse_document(html);
        let anchor = Selector::parse("a").unwrap();
        let link = document.select(&anchor).next().expect("snippet has an anchor");
        classify(link)
    }

    #[test]
    fn test_classify_from_ordinal_section_title() {
        let bucket = classify_first_anchor(
            r#"<div class="bt-collapse">
                 <h2 class="bt-collapse-title">19. Wahlperiode</h2>
                 <ul><li><a class="bt-link-dokument" href="/blob/pp19.xml">XML</a></li></ul>
               </div>"#,
        );
        assert_eq!(bucket, "19_Wahlperiode");
    }

    #[test]
    fn test_classify_from_range_section_title() {
        let bucket = classify_first_anchor(
            r#"<div class="bt-collapse">
                 <h2 class="bt-collapse-title">1. - 19. Wahlperiode</h2>
                 <a class="bt-link-dokument" href="/blob/archiv.zip">ZIP</a>
               </div>"#,
        );
        assert_eq!(bucket, "1_-_19_Wahlperiode");
    }

    #[test]
    fn test_classify_section_title_wins_over_href_pattern() {
        // Structural context is more trusted than the URL heuristic:
        // the section says 20, the href says wp19.
        let bucket = classify_first_anchor(
            r#"<div class="bt-collapse">
                 <h2 class="bt-collapse-title">20. Wahlperiode</h2>
                 <a href="/blob/wp19/pp19001.xml">XML</a>
               </div>"#,
        );
        assert_eq!(bucket, "20_Wahlperiode");
    }

    #[test]
    fn test_classify_uses_nearest_enclosing_section() {
        let bucket = classify_first_anchor(
            r#"<div class="bt-collapse">
                 <h2 class="bt-collapse-title">18. Wahlperiode</h2>
                 <div class="bt-collapse">
                   <h2 class="bt-collapse-title">19. Wahlperiode</h2>
                   <a href="/blob/pp.xml">XML</a>
                 </div>
               </div>"#,
        );
        assert_eq!(bucket, "19_Wahlperiode");
    }

    #[test]
    fn test_classify_falls_back_to_wp_token() {
        let bucket = classify_first_anchor(r#"<a href="/blob/wp18/pp18123.xml">XML</a>"#);
        assert_eq!(bucket, "18_Wahlperiode");
    }

    #[test]
    fn test_classify_falls_back_to_wahlperiode_segment() {
        let bucket =
            classify_first_anchor(r#"<a href="/opendata/wahlperiode-18/foo.xml">XML</a>"#);
        assert_eq!(bucket, "18_Wahlperiode");
    }

    #[test]
    fn test_classify_section_without_title_falls_through_to_href() {
        let bucket = classify_first_anchor(
            r#"<div class="bt-collapse">
                 <a href="/blob/wp17/pp17001.xml">XML</a>
               </div>"#,
        );
        assert_eq!(bucket, "17_Wahlperiode");
    }

    #[test]
    fn test_classify_title_without_period_text_falls_through() {
        let bucket = classify_first_anchor(
            r#"<div class="bt-collapse">
                 <h2 class="bt-collapse-title">Weitere Dokumente</h2>
                 <a href="/blob/wahlperiode-16/pp.zip">ZIP</a>
               </div>"#,
        );
        assert_eq!(bucket, "16_Wahlperiode");
    }

    #[test]
    fn test_classify_no_match_anywhere_returns_sentinel() {
        let bucket = classify_first_anchor(r#"<a href="/blob/sonstiges.xml">XML</a>"#);
        assert_eq!(bucket, UNKNOWN_BUCKET);
    }

    #[test]
    fn test_classify_missing_href_without_section_returns_sentinel() {
        let bucket = classify_first_anchor("<a>nothing</a>");
        assert_eq!(bucket, UNKNOWN_BUCKET);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let document = Html::parse_document(
            r#"<div class="bt-collapse">
                 <h2 class="bt-collapse-title">19. Wahlperiode</h2>
                 <a href="/blob/pp19.xml">XML</a>
               </div>"#,
        );
        let anchor = Selector::parse("a").unwrap();
        let link = document.select(&anchor).next().unwrap();
        let first = classify(link);
        let second = classify(link);
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_title_examples() {
        assert_eq!(normalize_title("19. Wahlperiode"), "19_Wahlperiode");
        assert_eq!(normalize_title("1. - 19. Wahlperiode"), "1_-_19_Wahlperiode");
    }
}
