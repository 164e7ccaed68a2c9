//! Query/target resolution: turns configuration into the set of listing
//! pages the run will visit.

use showscout_core::Config;
use url::Url;

const SEARCH_BASE: &str = "https://www.whatnot.com/search";

/// How candidates from a target are treated downstream.
///
/// Listing search casts a wide net and must be title-filtered; a seller
/// page is a curated single-account feed where every candidate is in
/// scope a priori.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Listing,
    Seller,
}

/// One listing page to visit, with the label used for debug artifacts.
#[derive(Debug, Clone)]
pub struct Target {
    pub url: String,
    pub label: String,
    pub mode: Mode,
}

/// Resolve configuration into targets. A configured seller URL takes the
/// whole run into seller-page mode; otherwise each search phrase becomes
/// one livestream-vertical search page.
pub fn resolve(config: &Config) -> Vec<Target> {
    if let Some(ref seller_url) = config.seller_url {
        return vec![Target {
            url: seller_url.clone(),
            label: slug(seller_url),
            mode: Mode::Seller,
        }];
    }

    config
        .queries
        .iter()
        .map(|q| Target {
            url: search_url(q),
            label: slug(q),
            mode: Mode::Listing,
        })
        .collect()
}

/// Build the livestream search URL for one phrase.
pub fn search_url(query: &str) -> String {
    let url = Url::parse_with_params(
        SEARCH_BASE,
        &[
            ("query", query),
            ("referringSource", "typed"),
            ("searchVertical", "LIVESTREAM"),
        ],
    )
    .expect("static search base URL is valid");
    url.to_string()
}

/// Lowercase, collapse non-alphanumeric runs to `-`, trim edge dashes.
/// Names per-target debug artifacts (`raw-<slug>.json`).
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_dash = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_query() {
        let url = search_url("Bo Jackson Battle Arena");
        assert!(url.starts_with("https://www.whatnot.com/search?query=Bo+Jackson+Battle+Arena"));
        assert!(url.contains("searchVertical=LIVESTREAM"));
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("Bo Jackson Battle Arena"), "bo-jackson-battle-arena");
        assert_eq!(slug("BoBA!!"), "boba");
        assert_eq!(slug("https://x/user/someone"), "https-x-user-someone");
    }

    #[test]
    fn seller_url_wins_over_queries() {
        let mut config = test_config();
        config.seller_url = Some("https://www.whatnot.com/user/boba".to_string());
        let targets = resolve(&config);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].mode, Mode::Seller);
        assert_eq!(targets[0].url, "https://www.whatnot.com/user/boba");
    }

    #[test]
    fn each_query_becomes_a_listing_target() {
        let config = test_config();
        let targets = resolve(&config);
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.mode == Mode::Listing));
        assert_eq!(targets[0].label, "boba");
    }

    fn test_config() -> Config {
        Config {
            browserless_url: "http://localhost:3000".to_string(),
            browserless_token: None,
            queries: vec!["BoBA".to_string(), "Bo Battle Arena".to_string()],
            title_aliases: vec!["boba".to_string()],
            seller_url: None,
            max_enrich: 30,
            nav_timeout_ms: 60_000,
            run_deadline_secs: 600,
            output_dir: "public".to_string(),
        }
    }
}
