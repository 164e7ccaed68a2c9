//! Final dedupe and ordering of enriched records.
//!
//! Pure function of its input: no I/O, idempotent. Identity is the
//! `(url, start)` pair — a show rescheduled to a new time is a distinct
//! record, while two sightings of the same URL with no start collapse.

use std::cmp::Ordering;
use std::collections::HashSet;

use showscout_core::ShowRecord;

/// Dedupe by `(url, start)` (first occurrence wins) and sort into the
/// published order.
pub fn normalize(records: Vec<ShowRecord>) -> Vec<ShowRecord> {
    let mut seen: HashSet<(String, Option<i64>)> = HashSet::new();
    let mut out: Vec<ShowRecord> = records
        .into_iter()
        .filter(|r| seen.insert((r.url.clone(), r.start)))
        .collect();

    out.sort_by(compare);
    out
}

/// Total order over records: dated before undated, dated ascending by
/// time, ties and undated pairs ascending by title.
pub fn compare(a: &ShowRecord, b: &ShowRecord) -> Ordering {
    match (a.start, b.start) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.title.cmp(&b.title)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    }
}
