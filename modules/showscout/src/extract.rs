//! Candidate extraction from a rendered listing page.
//!
//! Pure read of the HTML snapshot: finds show-detail anchors, lifts a
//! shallow candidate per anchor from its enclosing card, dedups by URL
//! within the page. Zero matches is an empty list, never an error.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use showscout_core::ShowCandidate;
use url::Url;

/// Extract show candidates from a rendered listing page.
///
/// - Qualifying anchors point at `/live/` detail pages
/// - Relative hrefs are resolved against `page_url`; anything without a
///   resolvable http(s) URL is discarded
/// - Dedup by URL, first occurrence wins
pub fn extract_candidates(html: &str, page_url: &str) -> Vec<ShowCandidate> {
    let base = Url::parse(page_url).ok();
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse(r#"a[href*="/live/"]"#).unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in document.select(&anchor_selector) {
        let href = match anchor.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };
        if href.is_empty() {
            continue;
        }

        let resolved = match resolve_url(href, base.as_ref()) {
            Some(u) => u,
            None => continue,
        };

        if !seen.insert(resolved.clone()) {
            continue;
        }

        let container = card_container(&anchor);

        candidates.push(ShowCandidate {
            title: anchor_title(&anchor),
            url: resolved,
            start_raw: container.and_then(|c| time_attribute(&c)),
            host: container.and_then(|c| host_text(&c)).unwrap_or_default(),
            thumbnail: container.and_then(|c| thumbnail_url(&c)),
        });
    }

    candidates
}

fn resolve_url(href: &str, base: Option<&Url>) -> Option<String> {
    let url = match Url::parse(href) {
        Ok(u) => u,
        Err(_) => base?.join(href).ok()?,
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    Some(url.to_string())
}

/// Title resolution order: accessible label on the link, nearest heading
/// inside the link, the link's full text content, empty string.
fn anchor_title(anchor: &ElementRef) -> String {
    if let Some(label) = anchor.value().attr("aria-label") {
        let label = label.trim();
        if !label.is_empty() {
            return label.to_string();
        }
    }

    let heading_selector = Selector::parse("h1, h2, h3").unwrap();
    if let Some(heading) = anchor.select(&heading_selector).next() {
        let text = element_text(&heading);
        if !text.is_empty() {
            return text;
        }
    }

    element_text(anchor)
}

/// Walk up to the smallest enclosing card-like container: an `article` or
/// `section`, an element carrying a card data-test marker, or the nearest
/// `div`.
fn card_container<'a>(anchor: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut current = anchor.parent();
    while let Some(node) = current {
        if let Some(el) = ElementRef::wrap(node) {
            match el.value().name() {
                "article" | "section" | "div" => return Some(el),
                _ => {}
            }
            if el
                .value()
                .attr("data-test")
                .is_some_and(|v| v.contains("card"))
            {
                return Some(el);
            }
        }
        current = node.parent();
    }
    None
}

/// Machine-readable datetime on a time-bearing element inside the card,
/// kept raw for later parsing.
fn time_attribute(container: &ElementRef) -> Option<String> {
    let selector = Selector::parse("time[datetime], [data-start-time]").unwrap();
    let el = container.select(&selector).next()?;
    el.value()
        .attr("datetime")
        .or_else(|| el.value().attr("data-start-time"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn host_text(container: &ElementRef) -> Option<String> {
    let seller_link = Selector::parse(r#"a[href*="/user/"]"#).unwrap();
    if let Some(el) = container.select(&seller_link).next() {
        let text = element_text(&el);
        if !text.is_empty() {
            return Some(text);
        }
    }

    let seller_marker = Selector::parse(r#"[data-test*="seller"]"#).unwrap();
    container
        .select(&seller_marker)
        .next()
        .map(|el| element_text(&el))
        .filter(|s| !s.is_empty())
}

fn thumbnail_url(container: &ElementRef) -> Option<String> {
    let img_selector = Selector::parse("img").unwrap();
    let img = container.select(&img_selector).next()?;
    let value = img.value();
    value
        .attr("src")
        .or_else(|| value.attr("data-src"))
        .or_else(|| value.attr("srcset").and_then(|s| s.split_whitespace().next()))
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://www.whatnot.com/search?query=boba";

    #[test]
    fn empty_page_yields_no_candidates() {
        let html = "<html><body><p>No shows here.</p></body></html>";
        assert!(extract_candidates(html, PAGE_URL).is_empty());
    }

    #[test]
    fn anchor_without_live_path_is_skipped() {
        let html = r#"<html><body><a href="/user/somebody">a seller</a></body></html>"#;
        assert!(extract_candidates(html, PAGE_URL).is_empty());
    }

    #[test]
    fn relative_href_resolves_against_page_origin() {
        let html = r#"<html><body><a href="/live/abc123">Show</a></body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://www.whatnot.com/live/abc123");
    }

    #[test]
    fn non_http_scheme_is_discarded() {
        let html = r#"<html><body><a href="javascript:void('/live/x')">x</a></body></html>"#;
        assert!(extract_candidates(html, PAGE_URL).is_empty());
    }

    #[test]
    fn aria_label_wins_over_heading_and_text() {
        let html = r#"<html><body>
            <a href="/live/1" aria-label="BoBA Tuesday Night">
                <h2>Some heading</h2>
                trailing text
            </a>
        </body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        assert_eq!(candidates[0].title, "BoBA Tuesday Night");
    }

    #[test]
    fn heading_wins_over_anchor_text() {
        let html = r#"<html><body>
            <a href="/live/1"><h3>BoBA Breaks</h3>extra</a>
        </body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        assert_eq!(candidates[0].title, "BoBA Breaks");
    }

    #[test]
    fn card_fields_come_from_enclosing_container() {
        let html = r#"<html><body>
            <article>
                <a href="/live/1"><h2>BoBA</h2></a>
                <time datetime="2024-06-01T18:00:00Z">Jun 1</time>
                <a href="/user/bojackson">Bo Jackson</a>
                <img src="https://cdn/x.png">
            </article>
        </body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.start_raw.as_deref(), Some("2024-06-01T18:00:00Z"));
        assert_eq!(c.host, "Bo Jackson");
        assert_eq!(c.thumbnail.as_deref(), Some("https://cdn/x.png"));
    }

    #[test]
    fn data_start_time_attribute_is_read() {
        let html = r#"<html><body><div>
            <a href="/live/1">Show</a>
            <span data-start-time="1717264800000"></span>
        </div></body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        assert_eq!(candidates[0].start_raw.as_deref(), Some("1717264800000"));
    }

    #[test]
    fn srcset_first_token_is_thumbnail_fallback() {
        let html = r#"<html><body><div>
            <a href="/live/1">Show</a>
            <img srcset="https://cdn/small.png 1x, https://cdn/big.png 2x">
        </div></body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        assert_eq!(candidates[0].thumbnail.as_deref(), Some("https://cdn/small.png"));
    }

    #[test]
    fn duplicate_urls_keep_first_occurrence() {
        let html = r#"<html><body>
            <div><a href="/live/1" aria-label="First card">one</a></div>
            <div><a href="/live/1" aria-label="Second card">two</a></div>
            <div><a href="/live/2" aria-label="Other">three</a></div>
        </body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "First card");
    }

    #[test]
    fn missing_card_fields_degrade_to_defaults() {
        let html = r#"<html><body><a href="/live/9">bare link</a></body></html>"#;
        let candidates = extract_candidates(html, PAGE_URL);
        let c = &candidates[0];
        assert_eq!(c.start_raw, None);
        assert_eq!(c.host, "");
        assert_eq!(c.thumbnail, None);
    }
}
