use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,           // global --quiet
    pub no_color: bool,        // global --no-color
    pub dry_run: bool,         // global --dry-run
    pub format: OutputFormat,  // global --format
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "fresh")]
#[command(
    about = "Track generated content history and flag repeated titles, facts and phrases"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// History store to use (overrides config `store_path`)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Config file (defaults to ./freshness.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress logs and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without writing the store
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check proposed content against history (advisory)
    Check(CheckArgs),

    /// Record an accepted content item in the history
    Record(RecordArgs),

    /// Summarize history usage
    Report(ReportArgs),

    /// Suggest preparation methods not used recently
    Suggest(SuggestArgs),

    /// Drop history entries older than the retention window
    Prune(PruneArgs),

    /// Initialize a freshness.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(subcommand)]
    pub target: CheckTarget,

    /// Exit with status 2 when the check does not pass
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Debug, Subcommand)]
pub enum CheckTarget {
    /// Compare a title against recorded titles
    Title {
        /// Proposed title
        text: String,
    },

    /// Compare a short fact against recorded facts
    Fact {
        /// Proposed short fact
        text: String,
    },

    /// Look for overused phrases in body text
    Content {
        /// File with body text, or - for stdin
        input: PathBuf,
    },

    /// Run every check on a content record (JSON)
    Record {
        /// Record file, or - for stdin
        input: PathBuf,
    },
}

#[derive(Debug, Parser)]
pub struct RecordArgs {
    /// Content record (JSON), or - for stdin
    pub input: PathBuf,

    /// Date to record under when the record has none (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Entries in each top-N list (defaults to config `report.top_limit`)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Parser)]
pub struct SuggestArgs {
    /// Look-back window in days (defaults to config `report.method_window_days`)
    #[arg(short, long)]
    pub window: Option<u32>,

    /// Candidate methods (defaults to config `report.known_methods`)
    #[arg(long = "known", value_name = "NAME")]
    pub known: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct PruneArgs {
    /// Days of history to keep (defaults to config `retention.days_to_keep`)
    #[arg(short, long)]
    pub days: Option<u32>,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
