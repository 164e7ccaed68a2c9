use serde::{Deserialize, Serialize};

/// A shallow show entry lifted off a listing page, before detail enrichment.
///
/// `url` is the identity within one page's candidate set; anything without a
/// resolvable URL is discarded before it ever becomes a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowCandidate {
    pub title: String,
    pub url: String,
    /// Unparsed timestamp-like string found near the card, if any.
    pub start_raw: Option<String>,
    pub host: String,
    pub thumbnail: Option<String>,
}

/// The final, enriched representation of one show as published in the feed.
///
/// `host` is tracked in listing-search mode only; seller-page mode omits it
/// from the serialized feed. `start` is milliseconds since epoch, present
/// only when some extraction layer produced a parseable date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub thumbnail: String,
    pub start: Option<i64>,
}

impl ShowRecord {
    /// Build a record from a candidate's own fields alone. Used when a
    /// detail-page visit fails in seller-page mode (degrade, don't drop)
    /// and as the fallback base during enrichment.
    pub fn from_candidate(candidate: &ShowCandidate, start: Option<i64>, host: Option<String>) -> Self {
        Self {
            title: candidate.title.clone(),
            url: candidate.url.clone(),
            host,
            thumbnail: candidate.thumbnail.clone().unwrap_or_default(),
            start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_omitted_from_feed_when_absent() {
        let record = ShowRecord {
            title: "Show A".to_string(),
            url: "https://x/live/1".to_string(),
            host: None,
            thumbnail: "t.png".to_string(),
            start: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("host"));
    }

    #[test]
    fn host_serialized_when_present() {
        let record = ShowRecord {
            title: "Show A".to_string(),
            url: "https://x/live/1".to_string(),
            host: Some("seller".to_string()),
            thumbnail: String::new(),
            start: Some(1_717_264_800_000),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""host":"seller""#));
    }
}
