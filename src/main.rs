use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use freshness::cli::{AppContext, Cli, Commands};
use freshness::cli_ext::{StoreOptions, check_cmd, history_cmd, report_cmd};
use tracing_subscriber::EnvFilter;

/// Overrides the verbosity flags when set, e.g. `FRESHNESS_LOG=debug`
const LOG_ENV: &str = "FRESHNESS_LOG";

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "off",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
        format: cli.format,
    };
    let opts = StoreOptions {
        store: cli.store,
        config: cli.config,
    };

    match cli.command {
        Commands::Check(args) => check_cmd::run(args, &opts, &ctx),
        Commands::Record(args) => history_cmd::record(args, &opts, &ctx).map(|_| ExitCode::SUCCESS),
        Commands::Prune(args) => history_cmd::prune(args, &opts, &ctx).map(|_| ExitCode::SUCCESS),
        Commands::Report(args) => report_cmd::report(args, &opts, &ctx).map(|_| ExitCode::SUCCESS),
        Commands::Suggest(args) => report_cmd::suggest(args, &opts, &ctx).map(|_| ExitCode::SUCCESS),
        Commands::Init(args) => {
            freshness::infra::config::init(args, &ctx).map(|_| ExitCode::SUCCESS)
        }
        Commands::Completions(args) => {
            freshness::completion::run(args, &ctx).map(|_| ExitCode::SUCCESS)
        }
    }
}
