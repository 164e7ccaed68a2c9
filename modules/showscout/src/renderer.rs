//! Page renderer seam.
//!
//! `PageRenderer` is the one external collaborator the pipeline navigates
//! through. The production impl drives a Browserless instance; tests swap
//! in a static in-memory renderer so the whole pipeline runs without a
//! browser or network.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use browserless_client::{
    BrowserlessClient, BrowserlessError, LaunchOptions, RenderOptions, WaitUntil,
};
use showscout_core::ShowScoutError;

/// Max retry attempts for transient render failures.
const RENDER_MAX_ATTEMPTS: u32 = 3;
/// Base backoff duration. Actual delay is base * 3^attempt + jitter.
const RENDER_RETRY_BASE: Duration = Duration::from_secs(3);

/// Desktop user agent sent with every render.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/117 Safari/537.36";

/// Per-navigation knobs the pipeline varies between listing and detail
/// pages. Everything else about rendering is an operational constant.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub timeout_ms: u64,
    /// Post-navigation settle delay for client-side hydration.
    pub settle_ms: u64,
    /// Scroll the page to trigger lazy-loaded cards before snapshotting.
    pub scroll_page: bool,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate to a URL and return the rendered HTML snapshot.
    async fn render(&self, url: &str, req: &RenderRequest) -> Result<String>;

    fn name(&self) -> &str;
}

/// Renderer backed by the Browserless /content API.
pub struct BrowserlessRenderer {
    client: BrowserlessClient,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        info!(base_url, "Using BrowserlessRenderer");
        Self {
            client: BrowserlessClient::new(base_url, token),
        }
    }

    fn options(req: &RenderRequest) -> RenderOptions {
        RenderOptions {
            wait_until: WaitUntil::DomContentLoaded,
            timeout_ms: req.timeout_ms,
            settle_ms: req.settle_ms,
            scroll_page: req.scroll_page,
            user_agent: Some(USER_AGENT.to_string()),
            // Marketplace sites fingerprint headless browsers aggressively.
            // Kept as an opaque launch hook; not part of any extraction
            // contract and expected to need re-tuning over time.
            launch: LaunchOptions {
                stealth: true,
                args: vec![
                    "--disable-blink-features=AutomationControlled".to_string(),
                    "--lang=en-US,en".to_string(),
                    "--window-size=1366,900".to_string(),
                ],
            },
        }
    }

    fn is_transient(err: &BrowserlessError) -> bool {
        matches!(
            err,
            BrowserlessError::Timeout(_)
                | BrowserlessError::Network(_)
                | BrowserlessError::Api { status: 429, .. }
                | BrowserlessError::Api { status: 503, .. }
        )
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    async fn render(&self, url: &str, req: &RenderRequest) -> Result<String> {
        let opts = Self::options(req);

        for attempt in 0..RENDER_MAX_ATTEMPTS {
            match self.client.content_with(url, &opts).await {
                Ok(html) if !html.trim().is_empty() => {
                    info!(url, renderer = "browserless", bytes = html.len(), "Rendered page");
                    return Ok(html);
                }
                Ok(_) => {
                    warn!(url, attempt = attempt + 1, "Empty render output");
                }
                Err(ref e) if Self::is_transient(e) && attempt + 1 < RENDER_MAX_ATTEMPTS => {
                    let backoff = RENDER_RETRY_BASE * 3u32.pow(attempt);
                    let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
                    warn!(
                        url,
                        attempt = attempt + 1,
                        backoff_secs = backoff.as_secs(),
                        error = %e,
                        "Transient render failure, retrying after backoff"
                    );
                    tokio::time::sleep(backoff + jitter).await;
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Browserless render failed for {url}"));
                }
            }

            // Empty output: retry with backoff, fail after the last attempt.
            if attempt + 1 < RENDER_MAX_ATTEMPTS {
                let backoff = RENDER_RETRY_BASE * 3u32.pow(attempt);
                let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
                tokio::time::sleep(backoff + jitter).await;
            }
        }

        Err(ShowScoutError::Render(format!(
            "Empty render output after {RENDER_MAX_ATTEMPTS} attempts for {url}"
        ))
        .into())
    }

    fn name(&self) -> &str {
        "browserless"
    }
}
