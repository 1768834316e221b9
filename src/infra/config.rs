use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::evaluator::Thresholds;
use crate::core::report::{DEFAULT_KNOWN_METHODS, DEFAULT_METHOD_WINDOW_DAYS, DEFAULT_TOP_LIMIT};
use crate::core::store::DEFAULT_DAYS_TO_KEEP;

/// Config files probed in the working directory, first match wins
pub const CONFIG_FILES: [&str; 4] =
    ["freshness.toml", "freshness.yaml", "freshness.json", ".freshness.toml"];

/// Environment prefix; nested keys use `__`, e.g. `FRESHNESS__RETENTION__DAYS_TO_KEEP`
pub const ENV_PREFIX: &str = "FRESHNESS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config
{
    /// History document location (`~` and `$VAR` are expanded)
    pub store_path: PathBuf,

    /// Similarity and overuse limits
    pub thresholds: Thresholds,

    /// Retention settings for `prune`
    pub retention: RetentionConfig,

    /// Usage report settings
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionConfig
{
    pub days_to_keep: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig
{
    pub top_limit: usize,
    pub method_window_days: u32,
    pub known_methods: Vec<String>,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            store_path: PathBuf::from("content_tracker.json"),
            thresholds: Thresholds::default(),
            retention: RetentionConfig { days_to_keep: DEFAULT_DAYS_TO_KEEP },
            report: ReportConfig {
                top_limit: DEFAULT_TOP_LIMIT,
                method_window_days: DEFAULT_METHOD_WINDOW_DAYS,
                known_methods: DEFAULT_KNOWN_METHODS
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
            },
        }
    }
}

impl Config
{
    /// Store path with `~` and environment variables expanded.
    pub fn resolved_store_path(&self) -> PathBuf
    {
        let raw = self
            .store_path
            .to_string_lossy();

        match shellexpand::full(&raw)
        {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => self
                .store_path
                .clone(),
        }
    }
}

/// Layer defaults, then a config file, then `FRESHNESS__*` variables.
///
/// `explicit` must exist when given; otherwise the first of
/// [`CONFIG_FILES`] found in the working directory is used, if any.
pub fn load_config(explicit: Option<&Path>) -> Result<Config>
{
    let defaults = config::Config::try_from(&Config::default())
        .context("Failed to build default configuration")?;
    let mut builder = config::Config::builder().add_source(defaults);

    match explicit
    {
        Some(path) =>
        {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None =>
        {
            // Load from config files in priority order
            for path in &CONFIG_FILES
            {
                if Path::new(path).exists()
                {
                    builder = builder.add_source(config::File::with_name(path));
                    break;
                }
            }
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if ctx.dry_run
    {
        println!("Would create config file at {}", config_path.display());
        return Ok(());
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::create_dir_all(&args.path).context("Failed to create config directory")?;
    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
