//! Append-only history of everything the tracker has accepted.
//!
//! The store is a single JSON document with one array per category. Every
//! mutation is followed by a full rewrite: the document is serialized into a
//! temp file next to the target, fsynced, then renamed into place so readers
//! never observe a half-written file. A missing or corrupt document loads as
//! an empty history.

use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::core::record::parse_date;

/// Default retention window for [`HistoryStore::prune`].
pub const DEFAULT_DAYS_TO_KEEP: u32 = 365;

/// Failures while writing or locking the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("lock store at {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Dates are written as `YYYY-MM-DD`; older documents may carry timestamps.
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleEntry {
    pub title: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_used: NaiveDate,
    #[serde(default = "default_theme")]
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseEntry {
    pub phrase: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_used: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationEntry {
    pub reference: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_used: NaiveDate,
    #[serde(default = "default_theme")]
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortFactEntry {
    pub fact: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_used: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodEntry {
    pub method: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_used: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginEntry {
    pub origin: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_used: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEntry {
    pub category: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_used: NaiveDate,
    #[serde(default)]
    pub title: String,
}

fn default_theme() -> String {
    crate::core::record::DEFAULT_THEME.to_string()
}

/// Anything stamped with the date it was used.
pub trait Dated {
    fn date_used(&self) -> NaiveDate;
}

macro_rules! impl_dated {
    ($($ty:ty),+ $(,)?) => {
        $(impl Dated for $ty {
            fn date_used(&self) -> NaiveDate {
                self.date_used
            }
        })+
    };
}

impl_dated!(
    TitleEntry,
    PhraseEntry,
    CitationEntry,
    ShortFactEntry,
    MethodEntry,
    OriginEntry,
    ThemeEntry,
);

/// A date as the instant it starts (UTC midnight).
pub fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// The seven category sequences, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    #[serde(default)]
    pub titles: Vec<TitleEntry>,
    #[serde(default)]
    pub key_phrases: Vec<PhraseEntry>,
    #[serde(default, alias = "scriptureReferences")]
    pub citations: Vec<CitationEntry>,
    #[serde(default, alias = "coffeeFacts")]
    pub short_facts: Vec<ShortFactEntry>,
    #[serde(default, alias = "brewingMethods")]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub origins: Vec<OriginEntry>,
    #[serde(default)]
    pub themes: Vec<ThemeEntry>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            titles: Vec::new(),
            key_phrases: Vec::new(),
            citations: Vec::new(),
            short_facts: Vec::new(),
            methods: Vec::new(),
            origins: Vec::new(),
            themes: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

/// Entry counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub titles: usize,
    pub key_phrases: usize,
    pub citations: usize,
    pub short_facts: usize,
    pub methods: usize,
    pub origins: usize,
    pub themes: usize,
}

impl CategoryCounts {
    pub fn total(&self) -> usize {
        self.titles
            + self.key_phrases
            + self.citations
            + self.short_facts
            + self.methods
            + self.origins
            + self.themes
    }

    fn saturating_sub(self, other: Self) -> Self {
        Self {
            titles: self.titles.saturating_sub(other.titles),
            key_phrases: self.key_phrases.saturating_sub(other.key_phrases),
            citations: self.citations.saturating_sub(other.citations),
            short_facts: self.short_facts.saturating_sub(other.short_facts),
            methods: self.methods.saturating_sub(other.methods),
            origins: self.origins.saturating_sub(other.origins),
            themes: self.themes.saturating_sub(other.themes),
        }
    }
}

/// Outcome of a retention pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneSummary {
    pub days_to_keep: u32,
    pub cutoff: DateTime<Utc>,
    pub removed: CategoryCounts,
    pub remaining: CategoryCounts,
}

impl History {
    /// Derived, never stored independently.
    pub fn total_records(&self) -> usize {
        self.titles.len()
    }

    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts {
            titles: self.titles.len(),
            key_phrases: self.key_phrases.len(),
            citations: self.citations.len(),
            short_facts: self.short_facts.len(),
            methods: self.methods.len(),
            origins: self.origins.len(),
            themes: self.themes.len(),
        }
    }

    /// Drop every entry whose date does not start strictly after `cutoff`.
    fn retain_after(&mut self, cutoff: DateTime<Utc>) {
        fn keep<T: Dated>(entries: &mut Vec<T>, cutoff: DateTime<Utc>) {
            entries.retain(|e| start_of(e.date_used()) > cutoff);
        }

        keep(&mut self.titles, cutoff);
        keep(&mut self.key_phrases, cutoff);
        keep(&mut self.citations, cutoff);
        keep(&mut self.short_facts, cutoff);
        keep(&mut self.methods, cutoff);
        keep(&mut self.origins, cutoff);
        keep(&mut self.themes, cutoff);
    }
}

/// On-disk shape: the history plus the derived record count.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedHistory<'a> {
    #[serde(flatten)]
    history: &'a History,
    total_records: usize,
}

/// History bound to the file it persists to.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    history: History,
}

impl HistoryStore {
    /// Load the store at `path`, starting fresh when the file is missing or
    /// unreadable. Never fails.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let history = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<History>(&text) {
                Ok(history) => {
                    debug!(records = history.total_records(), "loaded content history");
                    history
                }
                Err(e) => {
                    warn!(error = %e, "could not parse content history, starting fresh");
                    History::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no content history yet, starting fresh");
                History::default()
            }
            Err(e) => {
                warn!(error = %e, "could not read content history, starting fresh");
                History::default()
            }
        };

        Self { path, history }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn total_records(&self) -> usize {
        self.history.total_records()
    }

    /// Stamp `last_updated` and atomically rewrite the whole document.
    ///
    /// On error the in-memory history is untouched, so calling `persist`
    /// again after fixing the cause loses nothing.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn persist(&mut self) -> Result<(), StoreError> {
        self.history.last_updated = Utc::now();

        let doc = PersistedHistory {
            history: &self.history,
            total_records: self.history.total_records(),
        };
        let text = serde_json::to_string_pretty(&doc)?;

        let dir = parent_dir(&self.path);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(text.as_bytes())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        // Durably record the rename
        let _ = sync_dir(&dir);

        info!(records = doc.total_records, "content history saved");
        Ok(())
    }

    /// Remove entries older than `days_to_keep` days, then persist.
    pub fn prune(&mut self, days_to_keep: u32) -> Result<PruneSummary, StoreError> {
        self.prune_at(Utc::now(), days_to_keep)
    }

    /// [`prune`](Self::prune) against an explicit clock.
    #[instrument(skip(self, now))]
    pub fn prune_at(
        &mut self,
        now: DateTime<Utc>,
        days_to_keep: u32,
    ) -> Result<PruneSummary, StoreError> {
        let summary = self.apply_retention(now, days_to_keep);
        self.persist()?;

        info!(
            days_to_keep,
            removed = summary.removed.total(),
            "pruned content history"
        );
        Ok(summary)
    }

    /// What [`prune_at`](Self::prune_at) would remove, without touching the store.
    pub fn preview_prune(&self, now: DateTime<Utc>, days_to_keep: u32) -> PruneSummary {
        let mut scratch = self.history.clone();
        retention(&mut scratch, now, days_to_keep)
    }

    fn apply_retention(&mut self, now: DateTime<Utc>, days_to_keep: u32) -> PruneSummary {
        retention(&mut self.history, now, days_to_keep)
    }
}

fn retention(history: &mut History, now: DateTime<Utc>, days_to_keep: u32) -> PruneSummary {
    let cutoff = cutoff_for(now, days_to_keep);
    let before = history.counts();
    history.retain_after(cutoff);
    let remaining = history.counts();

    PruneSummary {
        days_to_keep,
        cutoff,
        removed: before.saturating_sub(remaining),
        remaining,
    }
}

/// `now - days`, clamped to the earliest representable instant.
fn cutoff_for(now: DateTime<Utc>, days_to_keep: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(days_to_keep))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `<store>.lock`, next to the store itself.
pub fn lock_path(store_path: &Path) -> PathBuf {
    let mut name = OsString::from(store_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Run `f` while holding an exclusive advisory lock on the store.
///
/// Guards load-modify-persist sequences against a concurrent writer; the
/// lock is released when `f` returns.
pub fn with_exclusive_lock<T, E>(
    store_path: &Path,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<StoreError>,
{
    let path = lock_path(store_path);
    let dir = parent_dir(&path);
    fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(|source| StoreError::Lock {
            path: path.clone(),
            source,
        })?;

    let mut lock = fd_lock::RwLock::new(file);
    let _guard = lock.write().map_err(|source| StoreError::Lock {
        path: path.clone(),
        source,
    })?;
    debug!(lock = %path.display(), "acquired store lock");

    f()
}

#[cfg(unix)]
fn sync_dir(p: &Path) -> std::io::Result<()> {
    File::open(p)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_p: &Path) -> std::io::Result<()> {
    // No reliable directory fsync; best-effort no-op
    Ok(())
}
