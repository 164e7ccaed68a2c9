//! Feed publishing.
//!
//! The published contract is a single pretty-printed JSON array written
//! atomically (temp file + rename in the same directory), so downstream
//! consumers never observe a torn file and always find valid JSON — an
//! empty array on a failed run, never a missing file. The debug index and
//! per-target raw dumps are best-effort diagnostics that must never fail
//! the main publish.

use std::io::Write;
use std::path::Path;

use showscout_core::{ShowRecord, ShowScoutError};
use tracing::{info, warn};

type Result<T> = std::result::Result<T, ShowScoutError>;

pub const FEED_FILE: &str = "schedule.json";
pub const INDEX_FILE: &str = "index.html";

/// Write the final feed atomically.
pub fn publish_feed(output_dir: &Path, records: &[ShowRecord]) -> Result<()> {
    let json = serde_json::to_vec_pretty(records)
        .map_err(|e| ShowScoutError::Publish(format!("Failed to serialize feed: {e}")))?;
    write_atomic(output_dir, FEED_FILE, &json)?;
    info!(
        records = records.len(),
        path = %output_dir.join(FEED_FILE).display(),
        "Feed published"
    );
    Ok(())
}

/// Last-resort publish: an empty feed plus an error index. Best-effort —
/// this runs on the failure path and must not introduce a new failure.
pub fn publish_empty(output_dir: &Path) {
    if let Err(e) = publish_feed(output_dir, &[]) {
        warn!(error = %e, "Failed to publish empty feed");
    }
    let html = "<!doctype html><meta charset=\"utf-8\">\
        <body style=\"background:#0b0b0b;color:#fff;font:16px system-ui;padding:24px\">\
        <h1>Scraper error</h1><p>See operator logs for details.</p>";
    if let Err(e) = write_atomic(output_dir, INDEX_FILE, html.as_bytes()) {
        warn!(error = %e, "Failed to write error index");
    }
}

/// Per-target raw candidate dump (`raw-<label>.json`). Best-effort.
pub fn write_raw_dump(output_dir: &Path, label: &str, payload: &serde_json::Value) {
    let name = format!("raw-{label}.json");
    match serde_json::to_vec_pretty(payload) {
        Ok(json) => {
            if let Err(e) = write_atomic(output_dir, &name, &json) {
                warn!(label, error = %e, "Failed to write raw dump");
            }
        }
        Err(e) => warn!(label, error = %e, "Failed to serialize raw dump"),
    }
}

/// Human-readable index linking the feed and per-target dumps. Best-effort.
pub fn write_index(output_dir: &Path, record_count: usize, labels: &[String]) {
    let items: String = labels
        .iter()
        .map(|label| {
            format!(
                "<li><a style=\"color:#ED67A1\" href=\"raw-{label}.json\">raw {label}</a></li>"
            )
        })
        .collect();
    let html = format!(
        "<!doctype html><meta charset=\"utf-8\">\
         <body style=\"background:#0b0b0b;color:#fff;font:16px/1.5 system-ui;padding:24px\">\
         <h1>Show schedule ({record_count} items)</h1>\
         <p><a style=\"color:#ED67A1\" href=\"{FEED_FILE}\">{FEED_FILE}</a></p>\
         <ul>{items}</ul>"
    );
    if let Err(e) = write_atomic(output_dir, INDEX_FILE, html.as_bytes()) {
        warn!(error = %e, "Failed to write debug index");
    }
}

fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ShowScoutError::Publish(format!("Failed to create output dir {}: {e}", dir.display()))
    })?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        ShowScoutError::Publish(format!("Failed to create temp file in {}: {e}", dir.display()))
    })?;
    tmp.write_all(bytes)
        .map_err(|e| ShowScoutError::Publish(format!("Failed to write temp file: {e}")))?;
    tmp.persist(dir.join(name))
        .map_err(|e| ShowScoutError::Publish(format!("Failed to persist {name}: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, start: Option<i64>) -> ShowRecord {
        ShowRecord {
            title: title.to_string(),
            url: "https://x/live/1".to_string(),
            host: Some("seller".to_string()),
            thumbnail: "t.png".to_string(),
            start,
        }
    }

    #[test]
    fn feed_round_trips_as_json_array() {
        let dir = tempfile::tempdir().unwrap();
        publish_feed(dir.path(), &[record("a", Some(1_717_264_800_000))]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(FEED_FILE)).unwrap();
        let parsed: Vec<ShowRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].start, Some(1_717_264_800_000));
    }

    #[test]
    fn empty_publish_still_writes_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        publish_empty(dir.path());

        let raw = std::fs::read_to_string(dir.path().join(FEED_FILE)).unwrap();
        assert_eq!(raw.trim(), "[]");
        assert!(dir.path().join(INDEX_FILE).exists());
    }

    #[test]
    fn publish_overwrites_previous_feed() {
        let dir = tempfile::tempdir().unwrap();
        publish_feed(dir.path(), &[record("a", None), record("b", None)]).unwrap();
        publish_feed(dir.path(), &[record("c", None)]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(FEED_FILE)).unwrap();
        let parsed: Vec<ShowRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "c");
    }

    #[test]
    fn index_links_feed_and_dumps() {
        let dir = tempfile::tempdir().unwrap();
        write_index(dir.path(), 3, &["boba".to_string()]);

        let html = std::fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert!(html.contains("schedule.json"));
        assert!(html.contains("raw-boba.json"));
        assert!(html.contains("3 items"));
    }
}
