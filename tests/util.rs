//! Shared test utilities for integration tests
//!
//! Provides history fixtures and helpers used across
//! multiple test files.

#![allow(dead_code)]

use assert_fs::prelude::*;
use chrono::{Duration, NaiveDate};
use freshness::{ContentRecord, HistoryStore, Thresholds, Tracker};

/// Fixed "today" so date windows are deterministic
pub fn today() -> NaiveDate
{
    NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid date")
}

/// `today()` shifted back by `days`
pub fn days_ago(days: i64) -> NaiveDate
{
    today() - Duration::days(days)
}

/// A tracker over an empty store inside a fresh temp dir.
/// Keep the returned TempDir alive for the duration of the test.
pub fn empty_tracker() -> (assert_fs::TempDir, Tracker)
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let store = HistoryStore::load(tmp.path().join("content_tracker.json"));
    (tmp, Tracker::new(store, Thresholds::default()))
}

/// Record `record` on `date`, panicking on persistence errors
pub fn record_on(
    tracker: &mut Tracker,
    record: ContentRecord,
    date: NaiveDate,
)
{
    tracker
        .record_on(&record.with_date(date), today())
        .expect("record");
}

/// Write a generator-shaped record file into `dir` and return its path
pub fn write_record_json(
    dir: &assert_fs::TempDir,
    name: &str,
    title: &str,
    body: &str,
    method: &str,
) -> std::path::PathBuf
{
    let json = serde_json::json!({
        "title": title,
        "devotional_text": body,
        "scripture": { "verse": "Psalm 46:10" },
        "coffee_fact": format!("{title} pairs well with {method}."),
        "brewing_method": method,
        "origin_story": "Ethiopia: where coffee began",
        "theme": "stillness",
    });

    let child = dir.child(name);
    child
        .write_str(&serde_json::to_string_pretty(&json).expect("json"))
        .expect("write record");
    child
        .path()
        .to_path_buf()
}
