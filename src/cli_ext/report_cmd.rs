//! `fresh report` and `fresh suggest`: read-only views over history.

use anyhow::Result;
use serde_json::json;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::{AppContext, ReportArgs, SuggestArgs};
use crate::cli_ext::{StoreOptions, accent, dim, is_json, print_json};
use crate::core::report::{Report, Reporter, UsageCount};
use crate::core::store::HistoryStore;

#[derive(Tabled)]
struct UsageRow {
    value: String,
    #[tabled(rename = "times used")]
    times_used: usize,
}

#[derive(Tabled)]
struct StatRow {
    stat: &'static str,
    value: usize,
}

#[instrument(skip_all)]
pub fn report(args: ReportArgs, opts: &StoreOptions, ctx: &AppContext) -> Result<()> {
    let resolved = opts.resolve()?;
    let limit = args.limit.unwrap_or(resolved.config.report.top_limit);
    let store = HistoryStore::load(&resolved.store_path);
    let report = Reporter::new(&store).report(limit);

    if is_json(ctx) {
        return print_json(&report);
    }

    print_report(&report, ctx);
    Ok(())
}

fn print_report(report: &Report, ctx: &AppContext) {
    let o = &report.overview;

    println!("{}", accent(ctx, "Overview"));
    let stats = vec![
        StatRow { stat: "total records", value: o.total_records },
        StatRow { stat: "unique titles", value: o.unique_title_count },
        StatRow { stat: "unique citations", value: o.unique_citation_count },
        StatRow { stat: "short facts", value: o.short_fact_count },
        StatRow { stat: "unique methods", value: o.unique_method_count },
        StatRow { stat: "unique origins", value: o.unique_origin_count },
    ];
    println!("{}", Table::new(stats));

    if !o.theme_distribution.is_empty() {
        println!("\n{}", accent(ctx, "Themes"));
        let rows = o.theme_distribution.iter().map(|(theme, n)| UsageRow {
            value: theme.clone(),
            times_used: *n,
        });
        println!("{}", Table::new(rows));
    }

    let recent = &report.recent_activity;
    println!("\n{}", accent(ctx, "Titles from the last week"));
    if recent.recent_titles.is_empty() {
        println!("  {}", dim(ctx, "(none)"));
    }
    for title in &recent.recent_titles {
        println!("  {title}");
    }

    print_usage(ctx, "Most used citations", &recent.top_citations);
    print_usage(ctx, "Most used methods", &recent.top_methods);
    print_usage(ctx, "Most used origins", &recent.top_origins);

    println!(
        "\n{}",
        dim(ctx, &format!("History last updated {}", report.last_updated.to_rfc3339()))
    );
}

fn print_usage(ctx: &AppContext, heading: &str, usage: &[UsageCount]) {
    if usage.is_empty() {
        return;
    }

    println!("\n{}", accent(ctx, heading));
    let rows = usage.iter().map(|u| UsageRow {
        value: u.value.clone(),
        times_used: u.times_used,
    });
    println!("{}", Table::new(rows));
}

#[instrument(skip_all)]
pub fn suggest(args: SuggestArgs, opts: &StoreOptions, ctx: &AppContext) -> Result<()> {
    let resolved = opts.resolve()?;
    let window = args.window.unwrap_or(resolved.config.report.method_window_days);
    let known = if args.known.is_empty() {
        resolved.config.report.known_methods
    } else {
        args.known
    };

    let store = HistoryStore::load(&resolved.store_path);
    let suggested = Reporter::new(&store).suggested_unused_methods(&known, window);

    if is_json(ctx) {
        return print_json(&json!({ "windowDays": window, "suggested": suggested }));
    }

    if suggested.is_empty() {
        println!("Every known method was used in the last {window} days");
        return Ok(());
    }
    println!(
        "{}",
        accent(ctx, &format!("Not used in the last {window} days"))
    );
    for method in &suggested {
        println!("  {method}");
    }
    Ok(())
}
