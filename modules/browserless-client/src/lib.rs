pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Serialize;

/// Navigation wait condition, mirrors Puppeteer's `waitUntil`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    NetworkIdle0,
    NetworkIdle2,
}

/// Options for a single /content render.
///
/// `settle_ms` maps to Browserless `waitForTimeout` (dynamic listing pages
/// keep hydrating after domcontentloaded). `scroll_page` injects a small
/// scroll script so lazy-loaded cards below the fold are rendered before
/// the DOM snapshot is taken.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub wait_until: WaitUntil,
    pub timeout_ms: u64,
    pub settle_ms: u64,
    pub scroll_page: bool,
    pub user_agent: Option<String>,
    /// Opaque launch hardening (stealth mode, extra Chromium args).
    /// Passed through to the Browserless `launch` query parameter.
    pub launch: LaunchOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wait_until: WaitUntil::DomContentLoaded,
            timeout_ms: 60_000,
            settle_ms: 0,
            scroll_page: false,
            user_agent: None,
            launch: LaunchOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LaunchOptions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stealth: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl LaunchOptions {
    fn is_default(&self) -> bool {
        !self.stealth && self.args.is_empty()
    }
}

/// Step/pause used by the injected auto-scroll script.
const SCROLL_SCRIPT: &str = "(async () => { \
    for (let y = 0; y < 7000; y += 700) { \
        window.scrollBy(0, 700); \
        await new Promise(r => setTimeout(r, 220)); \
    } \
    window.scrollTo(0, 0); \
})();";

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML for a URL via the Browserless /content
    /// endpoint, with default render options.
    pub async fn content(&self, url: &str) -> Result<String> {
        self.content_with(url, &RenderOptions::default()).await
    }

    /// Fetch fully-rendered HTML with explicit render options.
    pub async fn content_with(&self, url: &str, opts: &RenderOptions) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        let mut query: Vec<String> = Vec::new();
        if let Some(ref token) = self.token {
            query.push(format!("token={token}"));
        }
        if !opts.launch.is_default() {
            let launch = serde_json::to_string(&opts.launch)
                .map_err(|e| BrowserlessError::Request(e.to_string()))?;
            query.push(format!("launch={launch}"));
        }
        if !query.is_empty() {
            endpoint.push('?');
            endpoint.push_str(&query.join("&"));
        }

        let mut body = serde_json::json!({
            "url": url,
            "gotoOptions": {
                "waitUntil": opts.wait_until,
                "timeout": opts.timeout_ms,
            },
        });
        if opts.settle_ms > 0 {
            body["waitForTimeout"] = serde_json::json!(opts.settle_ms);
        }
        if opts.scroll_page {
            body["addScriptTag"] = serde_json::json!([{ "content": SCROLL_SCRIPT }]);
        }
        if let Some(ref ua) = opts.user_agent {
            body["userAgent"] = serde_json::json!(ua);
        }

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
