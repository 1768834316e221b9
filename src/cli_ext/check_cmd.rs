//! `fresh check`: advisory uniqueness checks.

use std::{fs, io::Read, path::Path, process::ExitCode};

use anyhow::{Context, Result};
use tracing::instrument;

use crate::cli::{AppContext, CheckArgs, CheckTarget};
use crate::cli_ext::{StoreOptions, accent, bad, dim, good, is_json, print_json};
use crate::core::evaluator::{Tracker, Verdict};
use crate::core::record::ContentRecord;
use crate::core::store::HistoryStore;

/// Exit status when `--strict` is set and a check fails
pub const STRICT_FAILURE: u8 = 2;

#[instrument(skip_all)]
pub fn run(args: CheckArgs, opts: &StoreOptions, ctx: &AppContext) -> Result<ExitCode> {
    let resolved = opts.resolve()?;
    let tracker = Tracker::new(
        HistoryStore::load(&resolved.store_path),
        resolved.config.thresholds,
    );

    let unique = match &args.target {
        CheckTarget::Title { text } => {
            let verdict = tracker.check_title(text);
            emit("title", &verdict, ctx)?;
            verdict.unique
        }
        CheckTarget::Fact { text } => {
            let verdict = tracker.check_short_fact(text);
            emit("short fact", &verdict, ctx)?;
            verdict.unique
        }
        CheckTarget::Content { input } => {
            let body = read_text(input)?;
            let verdict = tracker.check_content_phrases(&body);
            emit("content", &verdict, ctx)?;
            verdict.unique
        }
        CheckTarget::Record { input } => {
            let record = ContentRecord::read(input)?;
            let verdict = tracker.check_record(&record);

            if is_json(ctx) {
                print_json(&verdict)?;
            } else {
                print_verdict("title", &verdict.title, ctx);
                print_verdict("content", &verdict.content, ctx);
                if let Some(fact) = &verdict.short_fact {
                    print_verdict("short fact", fact, ctx);
                }
            }
            verdict.unique
        }
    };

    if args.strict && !unique {
        Ok(ExitCode::from(STRICT_FAILURE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Body text from a file, or stdin for `-`.
fn read_text(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read body from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("read body: {}", input.display()))
    }
}

fn emit(subject: &str, verdict: &Verdict, ctx: &AppContext) -> Result<()> {
    if is_json(ctx) {
        print_json(verdict)
    } else {
        print_verdict(subject, verdict, ctx);
        Ok(())
    }
}

fn print_verdict(subject: &str, verdict: &Verdict, ctx: &AppContext) {
    if verdict.unique {
        println!("{} {}", good(ctx, "Unique"), subject);
        return;
    }

    let reason = verdict.reason.as_deref().unwrap_or("Not unique");
    println!("{} {}: {}", bad(ctx, "Repeated"), subject, reason);

    if let Some(similar) = &verdict.similar {
        println!("  Similar to: {}", accent(ctx, similar));
    }
    for overused in &verdict.overused_phrases {
        println!(
            "  \"{}\" {}",
            accent(ctx, &overused.phrase),
            dim(ctx, &format!("(used {} times)", overused.times_used))
        );
    }
}
