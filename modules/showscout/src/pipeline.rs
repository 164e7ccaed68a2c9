//! Run orchestration.
//!
//! Each target is folded into an independent list of records; the run
//! concatenates, normalizes, and publishes as explicit final steps. A
//! target that fails contributes nothing and the run continues — the only
//! run-level failure mode is the deadline, which stops visiting and
//! publishes whatever was collected.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{error, info, warn};

use showscout_core::{Config, ShowRecord};

use crate::enrich::Enricher;
use crate::extract::extract_candidates;
use crate::filter::TitleFilter;
use crate::normalize::normalize;
use crate::publish;
use crate::renderer::{PageRenderer, RenderRequest};
use crate::targets::{self, Mode, Target};

/// Settle delay for listing pages, which keep hydrating cards well after
/// domcontentloaded.
const LISTING_SETTLE_MS: u64 = 2500;

/// Execute the full scrape and return the normalized record list.
pub async fn run(config: &Config, renderer: &dyn PageRenderer) -> Result<Vec<ShowRecord>> {
    let targets = targets::resolve(config);
    let filter = TitleFilter::new(&config.title_aliases);
    let output_dir = Path::new(&config.output_dir);
    let deadline = Instant::now() + Duration::from_secs(config.run_deadline_secs);

    let mut collected: Vec<ShowRecord> = Vec::new();
    for target in &targets {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!(target = target.label.as_str(), "Run deadline reached, skipping remaining targets");
            break;
        }

        match tokio::time::timeout(
            remaining,
            collect_target(config, renderer, &filter, target, output_dir),
        )
        .await
        {
            Ok(records) => collected.extend(records),
            Err(_) => {
                warn!(
                    target = target.label.as_str(),
                    "Run deadline reached mid-target, publishing what was collected"
                );
                break;
            }
        }
    }

    Ok(normalize(collected))
}

/// Fold one target into records. Per-target and per-candidate failures
/// are recovered here; this never errors.
async fn collect_target(
    config: &Config,
    renderer: &dyn PageRenderer,
    filter: &TitleFilter,
    target: &Target,
    output_dir: &Path,
) -> Vec<ShowRecord> {
    let req = RenderRequest {
        timeout_ms: config.nav_timeout_ms,
        settle_ms: LISTING_SETTLE_MS,
        scroll_page: true,
    };

    let html = match renderer.render(&target.url, &req).await {
        Ok(html) => html,
        Err(e) => {
            warn!(target = target.label.as_str(), error = %e, "Listing page failed to render");
            publish::write_raw_dump(
                output_dir,
                &target.label,
                &serde_json::json!({ "error": e.to_string() }),
            );
            return Vec::new();
        }
    };

    let candidates = extract_candidates(&html, &target.url);
    info!(
        target = target.label.as_str(),
        candidates = candidates.len(),
        "Listing page extracted"
    );
    publish::write_raw_dump(
        output_dir,
        &target.label,
        &serde_json::to_value(&candidates).unwrap_or(serde_json::Value::Null),
    );

    let chosen = match target.mode {
        Mode::Listing => filter.apply(candidates),
        // A seller's own page is curated: every candidate is in scope.
        Mode::Seller => candidates,
    };

    let enricher = Enricher::new(renderer, filter, target.mode, config.nav_timeout_ms);
    enricher.enrich_all(&chosen, config.max_enrich).await
}

/// Run and publish, never failing from the caller's perspective. A run
/// error or panic publishes an empty feed: downstream consumers must
/// always find valid JSON at the well-known location.
pub async fn run_and_publish(config: Arc<Config>, renderer: Arc<dyn PageRenderer>) {
    let output_dir = PathBuf::from(&config.output_dir);
    let labels: Vec<String> = targets::resolve(&config)
        .iter()
        .map(|t| t.label.clone())
        .collect();

    let run_config = Arc::clone(&config);
    let run_renderer = Arc::clone(&renderer);
    let result =
        tokio::spawn(async move { run(&run_config, run_renderer.as_ref()).await }).await;

    match result {
        Ok(Ok(records)) => {
            if let Err(e) = publish::publish_feed(&output_dir, &records) {
                error!(error = %e, "Publish failed, falling back to empty feed");
                publish::publish_empty(&output_dir);
                return;
            }
            publish::write_index(&output_dir, records.len(), &labels);
        }
        Ok(Err(e)) => {
            error!(error = %e, "Run failed, publishing empty feed");
            publish::publish_empty(&output_dir);
        }
        Err(e) => {
            error!(error = %e, "Run panicked, publishing empty feed");
            publish::publish_empty(&output_dir);
        }
    }
}
