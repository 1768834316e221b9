//! `fresh record` and `fresh prune`: the two commands that mutate history.
//!
//! Both run load → mutate → persist under the store's exclusive lock so two
//! invocations never interleave their read-modify-write.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};
use tracing::{info, instrument};

use crate::cli::{AppContext, PruneArgs, RecordArgs};
use crate::cli_ext::{StoreOptions, accent, dim, good, is_json, print_json};
use crate::core::evaluator::{RecordSummary, Tracker};
use crate::core::phrases::extract_phrases;
use crate::core::record::{ContentRecord, today};
use crate::core::store::{CategoryCounts, HistoryStore, PruneSummary, with_exclusive_lock};

#[instrument(skip_all)]
pub fn record(args: RecordArgs, opts: &StoreOptions, ctx: &AppContext) -> Result<()> {
    let resolved = opts.resolve()?;
    let mut record = ContentRecord::read(&args.input)?;
    if record.date.is_none() {
        record.date = args.date;
    }

    if ctx.dry_run {
        let date_used = record.date_or(today());
        let phrases = extract_phrases(&record.body).len();
        if is_json(ctx) {
            print_json(&json!({
                "dryRun": true,
                "title": record.title,
                "dateUsed": date_used,
                "phrases": phrases,
            }))?;
        } else {
            println!(
                "Would record {} on {} ({} phrases)",
                accent(ctx, &record.title),
                date_used,
                phrases
            );
        }
        return Ok(());
    }

    let store_path = resolved.store_path.clone();
    let summary = with_exclusive_lock(&store_path, || -> Result<RecordSummary> {
        let mut tracker =
            Tracker::new(HistoryStore::load(&store_path), resolved.config.thresholds);
        tracker
            .record(&record)
            .with_context(|| format!("save history: {}", store_path.display()))
    })?;

    if is_json(ctx) {
        print_json(&summary)?;
    } else if !ctx.quiet {
        println!(
            "{} {} on {} ({} phrases, {} records total)",
            good(ctx, "Recorded"),
            accent(ctx, &record.title),
            summary.date_used,
            summary.phrases,
            summary.total_records
        );
    }
    Ok(())
}

#[instrument(skip_all)]
pub fn prune(args: PruneArgs, opts: &StoreOptions, ctx: &AppContext) -> Result<()> {
    let resolved = opts.resolve()?;
    let days = args.days.unwrap_or(resolved.config.retention.days_to_keep);
    let store_path = resolved.store_path;

    let summary = if ctx.dry_run {
        HistoryStore::load(&store_path).preview_prune(Utc::now(), days)
    } else {
        with_exclusive_lock(&store_path, || -> Result<PruneSummary> {
            let mut store = HistoryStore::load(&store_path);
            store
                .prune(days)
                .with_context(|| format!("save history: {}", store_path.display()))
        })?
    };
    info!(days, removed = summary.removed.total(), dry_run = ctx.dry_run, "prune finished");

    if is_json(ctx) {
        print_json(&json!({ "dryRun": ctx.dry_run, "summary": summary }))?;
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    let verb = if ctx.dry_run { "Would remove" } else { "Removed" };
    println!(
        "{} {} entries dated on or before {}",
        good(ctx, verb),
        summary.removed.total(),
        dim(ctx, &summary.cutoff.date_naive().to_string())
    );
    println!("{}", counts_table(&summary.removed, &summary.remaining));
    Ok(())
}

#[derive(Tabled)]
struct CountRow {
    category: &'static str,
    removed: usize,
    remaining: usize,
}

fn counts_table(removed: &CategoryCounts, remaining: &CategoryCounts) -> String {
    let rows = [
        ("titles", removed.titles, remaining.titles),
        ("key phrases", removed.key_phrases, remaining.key_phrases),
        ("citations", removed.citations, remaining.citations),
        ("short facts", removed.short_facts, remaining.short_facts),
        ("methods", removed.methods, remaining.methods),
        ("origins", removed.origins, remaining.origins),
        ("themes", removed.themes, remaining.themes),
    ]
    .into_iter()
    .map(|(category, removed, remaining)| CountRow { category, removed, remaining });

    Table::new(rows).to_string()
}
