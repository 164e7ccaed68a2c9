use std::env;

use tracing::info;

/// Default search phrases, matched against livestream titles site-wide.
const DEFAULT_QUERIES: &[&str] = &["Bo Jackson Battle Arena", "BoBA", "Bo Battle Arena"];

/// Known aliases for the target show, matched case-insensitively against
/// candidate titles. Kept separate from the search phrases: search casts a
/// wide net, the alias list narrows it.
const DEFAULT_TITLE_ALIASES: &[&str] = &[
    "bo jackson battle arena",
    "boba",
    "bo battle arena",
    "tuesday night throwdown",
];

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Page renderer
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Targets
    pub queries: Vec<String>,
    pub title_aliases: Vec<String>,
    pub seller_url: Option<String>,

    // Pipeline tunables
    pub max_enrich: usize,
    pub nav_timeout_ms: u64,
    pub run_deadline_secs: u64,

    // Output
    pub output_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if a numeric var is malformed.
    pub fn from_env() -> Self {
        Self {
            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok().filter(|t| !t.is_empty()),
            queries: list_env("SHOWSCOUT_QUERIES", DEFAULT_QUERIES),
            title_aliases: list_env("SHOWSCOUT_TITLE_ALIASES", DEFAULT_TITLE_ALIASES),
            seller_url: env::var("SHOWSCOUT_SELLER_URL").ok().filter(|u| !u.is_empty()),
            max_enrich: env::var("SHOWSCOUT_MAX_ENRICH")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("SHOWSCOUT_MAX_ENRICH must be a number"),
            nav_timeout_ms: env::var("SHOWSCOUT_NAV_TIMEOUT_MS")
                .unwrap_or_else(|_| "60000".to_string())
                .parse()
                .expect("SHOWSCOUT_NAV_TIMEOUT_MS must be a number"),
            run_deadline_secs: env::var("SHOWSCOUT_RUN_DEADLINE_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .expect("SHOWSCOUT_RUN_DEADLINE_SECS must be a number"),
            output_dir: env::var("SHOWSCOUT_OUTPUT_DIR").unwrap_or_else(|_| "public".to_string()),
        }
    }

    /// Log the effective configuration with the token redacted.
    pub fn log_redacted(&self) {
        info!(
            browserless_url = self.browserless_url.as_str(),
            token = if self.browserless_token.is_some() { "[set]" } else { "[unset]" },
            queries = self.queries.len(),
            seller_url = self.seller_url.as_deref().unwrap_or("-"),
            max_enrich = self.max_enrich,
            output_dir = self.output_dir.as_str(),
            "Configuration loaded"
        );
    }
}

fn list_env(key: &str, defaults: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => {
            let items: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if items.is_empty() {
                defaults.iter().map(|s| s.to_string()).collect()
            } else {
                items
            }
        }
        Err(_) => defaults.iter().map(|s| s.to_string()).collect(),
    }
}
