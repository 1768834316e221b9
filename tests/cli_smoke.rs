//! Smoke tests for the `fresh` binary: record, check,
//! report, suggest and prune against a temp store.

use std::process::Command;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

mod util;
use util::write_record_json;

/// `fresh` with the store pinned inside `dir` and no ambient config
fn fresh(dir: &assert_fs::TempDir) -> Command
{
    let mut cmd = Command::cargo_bin("fresh").expect("bin");
    cmd.current_dir(dir.path())
        .env_remove("FRESHNESS_LOG")
        .args(["--no-color", "--store"])
        .arg(dir.path().join("history.json"));
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value
{
    let out = cmd.output().expect("run");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).expect("json stdout")
}

#[test]
fn record_then_check_flags_repeats()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let rec = write_record_json(
        &tmp,
        "day1.json",
        "Be Still and Brew",
        "Stillness settles over the kitchen table. Quiet mornings invite patient prayer.",
        "French Press",
    );

    fresh(&tmp).arg("record").arg(&rec).assert().success().stdout(
        predicate::str::contains("Recorded").and(predicate::str::contains("Be Still and Brew")),
    );
    tmp.child("history.json").assert(predicate::path::exists());

    // Exact title repeat is reported but advisory by default
    fresh(&tmp)
        .args(["check", "title", "be still and brew"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exact title match"));

    // --strict turns a failed check into exit status 2
    fresh(&tmp)
        .args(["check", "title", "Be Still and Brew", "--strict"])
        .assert()
        .code(2);

    fresh(&tmp)
        .args(["check", "title", "Harvest of Joy", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unique"));
}

#[test]
fn check_record_reports_every_part_as_json()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let rec = write_record_json(&tmp, "r.json", "Morning Grace", "Short body.", "V60");
    fresh(&tmp).arg("record").arg(&rec).assert().success();

    let v = json_stdout(fresh(&tmp).args(["--format", "json", "check", "record"]).arg(&rec));
    assert_eq!(v["unique"], false);
    assert_eq!(v["title"]["rejection"], "exact_match");
    assert_eq!(v["content"]["unique"], true);
    assert_eq!(v["shortFact"]["unique"], false);
}

#[test]
fn report_and_suggest_as_json()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    for (i, method) in ["Espresso", "Espresso", "Chemex"].into_iter().enumerate() {
        let rec = write_record_json(&tmp, &format!("r{i}.json"), &format!("Title {i}"), "", method);
        fresh(&tmp).arg("record").arg(&rec).assert().success();
    }

    let report = json_stdout(fresh(&tmp).args(["--format", "json", "report", "--limit", "1"]));
    assert_eq!(report["overview"]["totalRecords"], 3);
    assert_eq!(report["overview"]["uniqueMethodCount"], 2);
    assert_eq!(report["recentActivity"]["topMethods"][0]["value"], "Espresso");
    assert_eq!(report["recentActivity"]["topMethods"][0]["timesUsed"], 2);
    assert_eq!(report["recentActivity"]["topMethods"].as_array().map(Vec::len), Some(1));

    let suggest = json_stdout(
        fresh(&tmp).args(["--format", "json", "suggest", "--known", "Espresso", "--known", "Siphon"]),
    );
    assert_eq!(suggest["suggested"], serde_json::json!(["Siphon"]));
    assert_eq!(suggest["windowDays"], 30);
}

#[test]
fn dry_run_record_does_not_write()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let rec = write_record_json(&tmp, "r.json", "Untouched", "", "V60");

    fresh(&tmp)
        .args(["--dry-run", "record"])
        .arg(&rec)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would record"));
    tmp.child("history.json").assert(predicate::path::missing());
}

#[test]
fn prune_reports_removed_counts()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("old.json")
        .write_str(r#"{"title": "Ancient", "date": "2001-01-01", "brewing_method": "Siphon"}"#)
        .expect("write");
    fresh(&tmp).args(["record", "old.json"]).assert().success();

    let preview = json_stdout(fresh(&tmp).args(["--format", "json", "--dry-run", "prune"]));
    assert_eq!(preview["dryRun"], true);
    assert_eq!(preview["summary"]["removed"]["titles"], 1);

    let done = json_stdout(fresh(&tmp).args(["--format", "json", "prune", "--days", "365"]));
    assert_eq!(done["summary"]["removed"]["methods"], 1);
    assert_eq!(done["summary"]["remaining"]["titles"], 0);
}

#[test]
fn corrupt_store_starts_fresh_with_warning()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("history.json").write_str("{ definitely not json").expect("write");

    fresh(&tmp)
        .args(["check", "title", "Anything"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unique"))
        .stderr(predicate::str::contains("starting fresh"));
}

#[test]
fn init_writes_default_config()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    fresh(&tmp).args(["init", "."]).assert().success();
    tmp.child("freshness.toml")
        .assert(predicate::str::contains("title_similarity = 0.7"));

    // Second run refuses without --force
    fresh(&tmp).args(["init", "."]).assert().failure();
}

#[test]
fn loose_record_with_mixed_spellings_is_recorded()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("loose.json")
        .write_str(
            r#"{
                "title": "Quiet Harvest",
                "devotional_text": "Gratitude gathers slowly around the morning table.",
                "content": "ignored second spelling",
                "brewing_method": "Chemex",
                "method": 42,
                "date": 20261015
            }"#,
        )
        .expect("write");

    let summary = json_stdout(fresh(&tmp).args(["--format", "json", "record", "loose.json"]));
    assert_eq!(summary["method"], true);

    let report = json_stdout(fresh(&tmp).args(["--format", "json", "report"]));
    assert_eq!(report["recentActivity"]["topMethods"][0]["value"], "Chemex");
    assert_eq!(report["recentActivity"]["recentTitles"], serde_json::json!(["Quiet Harvest"]));
}

#[test]
fn prune_with_huge_window_keeps_everything()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("old.json")
        .write_str(r#"{"title": "Ancient", "date": "2001-01-01"}"#)
        .expect("write");
    fresh(&tmp).args(["record", "old.json"]).assert().success();

    let done = json_stdout(fresh(&tmp).args(["--format", "json", "prune", "--days", "4294967295"]));
    assert_eq!(done["summary"]["removed"]["titles"], 0);
    assert_eq!(done["summary"]["remaining"]["titles"], 1);
}
