//! Detail-page enrichment.
//!
//! Each candidate's detail page is visited sequentially and re-read for
//! canonical title/host/thumbnail/start values, every field independently
//! falling back to the candidate's listing-page value. The start time goes
//! through a strictly ordered fallback chain; the first layer that yields
//! a *parseable* date wins, and an unparseable string at any layer is
//! skipped rather than treated as success.
//!
//! Start-time chain:
//! 1. Explicit DOM: `time[datetime]`, `[data-start-time]`, structured
//!    startDate meta/itemprop tags
//! 2. JSON-LD: schema.org Event-typed objects, `VideoObject.publication`,
//!    `@graph` containers
//! 3. Generic scan of embedded JSON payloads for a start-like key with a
//!    parseable string or epoch-millis number
//! 4. Regex over the raw markup: first ISO-8601 timestamp, then first
//!    13-digit integer in the plausible epoch window
//! 5. The candidate's own `start_raw`

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use showscout_core::dates::{parse_start_raw, plausible_epoch_millis};
use showscout_core::{ShowCandidate, ShowRecord};

use crate::filter::TitleFilter;
use crate::renderer::{PageRenderer, RenderRequest};
use crate::targets::Mode;

/// Settle delay for detail pages. Shorter than listing pages: show pages
/// hydrate their metadata quickly.
const DETAIL_SETTLE_MS: u64 = 1200;

pub struct Enricher<'a> {
    renderer: &'a dyn PageRenderer,
    filter: &'a TitleFilter,
    mode: Mode,
    nav_timeout_ms: u64,
}

impl<'a> Enricher<'a> {
    pub fn new(
        renderer: &'a dyn PageRenderer,
        filter: &'a TitleFilter,
        mode: Mode,
        nav_timeout_ms: u64,
    ) -> Self {
        Self {
            renderer,
            filter,
            mode,
            nav_timeout_ms,
        }
    }

    /// Visit at most `max` candidates in their original order and return
    /// one record per kept candidate. A failure on one candidate never
    /// aborts the rest of the batch.
    pub async fn enrich_all(&self, candidates: &[ShowCandidate], max: usize) -> Vec<ShowRecord> {
        let mut records = Vec::new();

        for candidate in candidates.iter().take(max) {
            match self.visit(candidate).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    debug!(url = candidate.url.as_str(), "Record dropped by mode policy");
                }
                Err(e) => {
                    warn!(url = candidate.url.as_str(), error = %e, "Detail visit failed");
                    if self.mode == Mode::Seller {
                        // Curated feed: degrade to the listing-page fields
                        // rather than losing the show.
                        let start = candidate.start_raw.as_deref().and_then(parse_start_raw);
                        records.push(ShowRecord::from_candidate(candidate, start, None));
                    }
                }
            }
        }

        info!(
            visited = candidates.len().min(max),
            kept = records.len(),
            "Enrichment pass complete"
        );
        records
    }

    async fn visit(&self, candidate: &ShowCandidate) -> Result<Option<ShowRecord>> {
        let req = RenderRequest {
            timeout_ms: self.nav_timeout_ms,
            settle_ms: DETAIL_SETTLE_MS,
            scroll_page: false,
        };
        let html = self.renderer.render(&candidate.url, &req).await?;
        Ok(self.build_record(candidate, &html))
    }

    fn build_record(&self, candidate: &ShowCandidate, html: &str) -> Option<ShowRecord> {
        let doc = Html::parse_document(html);

        let title = detail_title(&doc).unwrap_or_else(|| candidate.title.clone());
        let thumbnail = detail_thumbnail(&doc)
            .or_else(|| candidate.thumbnail.clone())
            .unwrap_or_default();
        let host = detail_host(&doc).unwrap_or_else(|| candidate.host.clone());
        let start = resolve_start(&doc, html)
            .or_else(|| candidate.start_raw.as_deref().and_then(parse_start_raw));

        match self.mode {
            Mode::Seller => Some(ShowRecord {
                title,
                url: candidate.url.clone(),
                host: None,
                thumbnail,
                start,
            }),
            // Listing search pulls in unrelated shows; keep a record only
            // when the canonical title matches or a schedule time exists.
            Mode::Listing => {
                if self.filter.matches(&title) || start.is_some() {
                    Some(ShowRecord {
                        title,
                        url: candidate.url.clone(),
                        host: Some(host),
                        thumbnail,
                        start,
                    })
                } else {
                    None
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

fn detail_title(doc: &Html) -> Option<String> {
    meta_content(
        doc,
        r#"meta[property="og:title"], meta[name="og:title"], meta[name="twitter:title"]"#,
    )
    .or_else(|| first_text(doc, "h1"))
}

fn detail_thumbnail(doc: &Html) -> Option<String> {
    meta_content(
        doc,
        r#"meta[property="og:image"], meta[name="og:image"], meta[name="twitter:image"]"#,
    )
    .or_else(|| {
        let selector = Selector::parse("img").unwrap();
        let img = doc.select(&selector).next()?;
        img.value()
            .attr("src")
            .or_else(|| img.value().attr("data-src"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn detail_host(doc: &Html) -> Option<String> {
    first_text(doc, r#"a[href*="/user/"]"#)
        .or_else(|| first_text(doc, r#"[data-test*="seller"]"#))
        .or_else(|| first_text(doc, r#"[data-testid*="seller"]"#))
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    doc.select(&selector)
        .map(|el| element_text(&el))
        .find(|s| !s.is_empty())
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Start-time fallback chain
// ---------------------------------------------------------------------------

/// Resolve the scheduled start from a detail page, layers 1-4.
/// Returns epoch milliseconds of the first parseable value found.
pub fn resolve_start(doc: &Html, html: &str) -> Option<i64> {
    explicit_dom_start(doc)
        .or_else(|| json_ld_start(doc))
        .or_else(|| embedded_json_start(doc))
        .or_else(|| raw_markup_start(html))
}

/// Layer 1: machine-readable datetime attributes and structured startDate
/// meta tags.
fn explicit_dom_start(doc: &Html) -> Option<i64> {
    let timeish = Selector::parse("time[datetime], [data-start-time]").unwrap();
    for el in doc.select(&timeish) {
        let raw = el
            .value()
            .attr("datetime")
            .or_else(|| el.value().attr("data-start-time"));
        if let Some(ms) = raw.and_then(parse_start_raw) {
            return Some(ms);
        }
    }

    let meta = Selector::parse(
        r#"meta[property="event:start_time"], meta[itemprop="startDate"], [itemprop="startDate"]"#,
    )
    .unwrap();
    for el in doc.select(&meta) {
        let raw = el
            .value()
            .attr("content")
            .or_else(|| el.value().attr("datetime"));
        if let Some(ms) = raw.and_then(parse_start_raw) {
            return Some(ms);
        }
    }

    None
}

/// Layer 2: schema.org structured data in JSON-LD scripts.
fn json_ld_start(doc: &Html) -> Option<i64> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    for script in doc.select(&selector) {
        let payload: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&payload) else {
            continue;
        };
        if let Some(ms) = schema_org_start(&value) {
            return Some(ms);
        }
    }
    None
}

fn schema_org_start(value: &Value) -> Option<i64> {
    match value {
        Value::Array(items) => items.iter().find_map(schema_org_start),
        Value::Object(map) => {
            if is_event_typed(value) {
                if let Some(ms) = map
                    .get("startDate")
                    .and_then(Value::as_str)
                    .and_then(parse_start_raw)
                {
                    return Some(ms);
                }
            }

            // VideoObject livestreams carry the schedule on publication
            // (BroadcastEvent) sub-objects.
            if type_is(value, "VideoObject") {
                if let Some(publication) = map.get("publication") {
                    let events = match publication {
                        Value::Array(items) => items.iter().collect::<Vec<_>>(),
                        other => vec![other],
                    };
                    for event in events {
                        if let Some(ms) = event
                            .get("startDate")
                            .and_then(Value::as_str)
                            .and_then(parse_start_raw)
                        {
                            return Some(ms);
                        }
                    }
                }
            }

            if let Some(graph) = map.get("@graph").and_then(Value::as_array) {
                if let Some(ms) = graph.iter().find_map(schema_org_start) {
                    return Some(ms);
                }
            }

            None
        }
        _ => None,
    }
}

/// `@type` may be a single string or an array; Event subtypes all end in
/// "Event" (LiveEvent, BroadcastEvent, MusicEvent...).
fn is_event_typed(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "Event" || t.ends_with("Event"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t == "Event" || t.ends_with("Event")),
        _ => false,
    }
}

fn type_is(value: &Value, expected: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == expected,
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(|t| t == expected),
        _ => false,
    }
}

/// Layer 3: generic recursive scan of embedded JSON payloads (framework
/// hydration blobs and JSON-LD alike) for a start-like key.
fn embedded_json_start(doc: &Html) -> Option<i64> {
    let selector = Selector::parse(
        r#"script[type="application/json"], script[type="application/ld+json"]"#,
    )
    .unwrap();
    for script in doc.select(&selector) {
        let payload: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&payload) else {
            continue;
        };
        if let Some(ms) = scan_json_value(&value) {
            return Some(ms);
        }
    }
    None
}

fn scan_json_value(value: &Value) -> Option<i64> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                if !is_start_like_key(key) {
                    continue;
                }
                match val {
                    Value::String(s) => {
                        if let Some(ms) = parse_start_raw(s) {
                            return Some(ms);
                        }
                    }
                    Value::Number(n) => {
                        if let Some(ms) = n.as_i64().filter(|&ms| plausible_epoch_millis(ms)) {
                            return Some(ms);
                        }
                    }
                    _ => {}
                }
            }
            map.values().find_map(scan_json_value)
        }
        Value::Array(items) => items.iter().find_map(scan_json_value),
        _ => None,
    }
}

fn is_start_like_key(key: &str) -> bool {
    let k = key.to_ascii_lowercase();
    k.contains("start") && (k.contains("time") || k.contains("date") || k.ends_with("at"))
}

/// Layer 4: last resort, scan the raw markup for the first parseable
/// ISO-8601 timestamp, then the first plausible epoch-millis integer.
fn raw_markup_start(html: &str) -> Option<i64> {
    let iso = regex::Regex::new(
        r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?",
    )
    .ok()?;
    for m in iso.find_iter(html) {
        if let Some(ms) = parse_start_raw(m.as_str()) {
            return Some(ms);
        }
    }

    let millis = regex::Regex::new(r"\b\d{13}\b").ok()?;
    for m in millis.find_iter(html) {
        if let Some(ms) = m.as_str().parse::<i64>().ok().filter(|&n| plausible_epoch_millis(n)) {
            return Some(ms);
        }
    }

    None
}
