//! Command handlers behind the `fresh` subcommands.
//!
//! Each handler resolves configuration, opens the history store, calls into
//! `core`, and renders the result as text or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::{AppContext, OutputFormat};
use crate::infra::config::{Config, load_config};

pub mod check_cmd;
pub mod history_cmd;
pub mod report_cmd;

/// Global flags that select configuration and the store.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub store: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Configuration plus the store path it resolves to.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Config,
    pub store_path: PathBuf,
}

impl StoreOptions {
    /// Load configuration; `--store` wins over `store_path`.
    pub fn resolve(&self) -> Result<Resolved> {
        let config = load_config(self.config.as_deref())?;
        let store_path = match &self.store {
            Some(p) => p.clone(),
            None => config.resolved_store_path(),
        };
        Ok(Resolved { config, store_path })
    }
}

/// Pretty JSON to stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

pub(crate) fn is_json(ctx: &AppContext) -> bool {
    ctx.format == OutputFormat::Json
}

pub(crate) fn good(ctx: &AppContext, s: &str) -> String {
    if ctx.no_color { s.to_string() } else { s.green().bold().to_string() }
}

pub(crate) fn bad(ctx: &AppContext, s: &str) -> String {
    if ctx.no_color { s.to_string() } else { s.red().bold().to_string() }
}

pub(crate) fn accent(ctx: &AppContext, s: &str) -> String {
    if ctx.no_color { s.to_string() } else { s.cyan().to_string() }
}

pub(crate) fn dim(ctx: &AppContext, s: &str) -> String {
    if ctx.no_color { s.to_string() } else { s.dimmed().to_string() }
}
