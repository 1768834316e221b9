//! **freshness** - Content-uniqueness tracking for long-running generated series
//!
//! Keeps an append-only history of accepted titles, key phrases, short facts and
//! tags, and answers "is this new enough?" with lexical similarity and phrase
//! overuse checks. History is a single JSON document, rewritten atomically.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Command handlers (check, record, report, suggest, prune)
pub mod cli_ext;

/// Core engine - normalization, phrases, similarity, history, checks and reports
pub mod core {
    /// Lower-case, punctuation-free, whitespace-collapsed canonical text
    pub mod normalize;
    pub use normalize::normalize;

    /// 4-6 word key-phrase windows with a significance filter
    pub mod phrases;
    pub use phrases::{extract_phrases, is_significant};

    /// Jaccard overlap of significant tokens
    pub mod similarity;
    pub use similarity::similarity;

    /// Input schema for finished content items
    pub mod record;
    pub use record::ContentRecord;

    /// Persisted append-only history with retention pruning
    pub mod store;
    pub use store::{History, HistoryStore, StoreError};

    /// Advisory uniqueness checks and recording
    pub mod evaluator;
    pub use evaluator::{Thresholds, Tracker, Verdict};

    /// Usage statistics and suggestions
    pub mod report;
    pub use report::{Report, Reporter};
}

/// Infrastructure - Configuration
pub mod infra {
    /// Layered configuration (defaults, file, environment)
    pub mod config;
    pub use self::config::{Config, init as config_init, load_config};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use self::core::{
    ContentRecord, History, HistoryStore, Report, Reporter, StoreError, Thresholds, Tracker,
    Verdict, extract_phrases, normalize, similarity,
};
pub use infra::{Config, load_config};
