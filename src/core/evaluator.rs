//! Uniqueness checks and recording.
//!
//! Checks are advisory: they report whether a proposed title, short fact or
//! body repeats history, and the caller decides whether to regenerate.
//! [`Tracker::record`] never consults them.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::core::{
    normalize::normalize,
    phrases::extract_phrases,
    record::{ContentRecord, today},
    similarity::similarity,
    store::{
        CitationEntry, HistoryStore, MethodEntry, OriginEntry, PhraseEntry, ShortFactEntry,
        StoreError, ThemeEntry, TitleEntry,
    },
};

/// Tunable limits for every check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Titles scoring strictly above this are near-duplicates
    pub title_similarity: f64,
    /// Short facts scoring strictly above this are near-duplicates
    pub fact_similarity: f64,
    /// A phrase used at least this many times is overused
    pub phrase_overuse: usize,
    /// Overused phrases listed in a rejection
    pub max_reported_phrases: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title_similarity: 0.7,
            fact_similarity: 0.6,
            phrase_overuse: 3,
            max_reported_phrases: 3,
        }
    }
}

/// Why a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    ExactMatch,
    TooSimilar,
    OverusedPhrases,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverusedPhrase {
    pub phrase: String,
    pub times_used: usize,
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The historical entry that triggered the rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overused_phrases: Vec<OverusedPhrase>,
}

impl Verdict {
    pub fn unique() -> Self {
        Self {
            unique: true,
            rejection: None,
            reason: None,
            similar: None,
            score: None,
            overused_phrases: Vec::new(),
        }
    }

    fn rejected(rejection: Rejection, reason: String) -> Self {
        Self {
            unique: false,
            rejection: Some(rejection),
            reason: Some(reason),
            ..Self::unique()
        }
    }
}

/// Verdicts for every checkable part of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVerdict {
    pub unique: bool,
    pub title: Verdict,
    pub content: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_fact: Option<Verdict>,
}

/// What [`Tracker::record`] appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub date_used: NaiveDate,
    pub phrases: usize,
    pub citation: bool,
    pub short_fact: bool,
    pub method: bool,
    pub origin: bool,
    pub theme: bool,
    pub total_records: usize,
}

/// Which history a similarity check scans.
#[derive(Clone, Copy)]
enum Subject {
    Title,
    ShortFact,
}

impl Subject {
    fn label(self) -> &'static str {
        match self {
            Subject::Title => "title",
            Subject::ShortFact => "short fact",
        }
    }

    fn capitalized(self) -> &'static str {
        match self {
            Subject::Title => "Title",
            Subject::ShortFact => "Short fact",
        }
    }
}

/// Percentage shown in rejection reasons, rounded half up.
fn percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// Owns the history store and answers "is this new?" / "record it".
#[derive(Debug)]
pub struct Tracker {
    store: HistoryStore,
    thresholds: Thresholds,
}

impl Tracker {
    pub fn new(store: HistoryStore, thresholds: Thresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HistoryStore {
        &mut self.store
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn into_store(self) -> HistoryStore {
        self.store
    }

    /// Compare a proposed title against every recorded title.
    #[instrument(skip(self))]
    pub fn check_title(&self, new_title: &str) -> Verdict {
        let existing = self.store.history().titles.iter().map(|t| t.title.as_str());
        self.check_against(Subject::Title, new_title, existing, self.thresholds.title_similarity)
    }

    /// Compare a proposed short fact against every recorded fact.
    #[instrument(skip(self))]
    pub fn check_short_fact(&self, new_fact: &str) -> Verdict {
        let existing = self.store.history().short_facts.iter().map(|f| f.fact.as_str());
        self.check_against(
            Subject::ShortFact,
            new_fact,
            existing,
            self.thresholds.fact_similarity,
        )
    }

    /// First exact (normalized) match wins; otherwise the first entry scoring
    /// above `threshold`.
    fn check_against<'a>(
        &self,
        subject: Subject,
        candidate: &str,
        existing: impl Iterator<Item = &'a str>,
        threshold: f64,
    ) -> Verdict {
        let normalized = normalize(candidate);

        for entry in existing {
            let other = normalize(entry);

            if normalized == other {
                debug!(subject = subject.label(), similar = entry, "exact match");
                return Verdict {
                    similar: Some(entry.to_string()),
                    score: Some(1.0),
                    ..Verdict::rejected(
                        Rejection::ExactMatch,
                        format!("Exact {} match", subject.label()),
                    )
                };
            }

            let score = similarity(&normalized, &other);
            if score > threshold {
                debug!(subject = subject.label(), similar = entry, score, "near duplicate");
                return Verdict {
                    similar: Some(entry.to_string()),
                    score: Some(score),
                    ..Verdict::rejected(
                        Rejection::TooSimilar,
                        format!(
                            "{} too similar ({}% match)",
                            subject.capitalized(),
                            percent(score)
                        ),
                    )
                };
            }
        }

        Verdict::unique()
    }

    /// Flag phrases of `body` that history has already used too often.
    #[instrument(skip_all)]
    pub fn check_content_phrases(&self, body: &str) -> Verdict {
        let usage = self.phrase_usage();

        let overused: Vec<OverusedPhrase> = extract_phrases(body)
            .into_iter()
            .filter_map(|phrase| {
                let times_used = usage.get(&normalize(&phrase)).copied().unwrap_or(0);
                (times_used >= self.thresholds.phrase_overuse)
                    .then_some(OverusedPhrase { phrase, times_used })
            })
            .collect();

        if overused.is_empty() {
            return Verdict::unique();
        }

        debug!(count = overused.len(), "overused phrases found");
        Verdict {
            overused_phrases: overused
                .into_iter()
                .take(self.thresholds.max_reported_phrases)
                .collect(),
            ..Verdict::rejected(
                Rejection::OverusedPhrases,
                "Contains overused phrases".to_string(),
            )
        }
    }

    /// Normalized phrase → number of recorded uses.
    fn phrase_usage(&self) -> HashMap<String, usize> {
        let mut usage = HashMap::new();
        for entry in &self.store.history().key_phrases {
            *usage.entry(normalize(&entry.phrase)).or_insert(0) += 1;
        }
        usage
    }

    /// Run every applicable check on a full record.
    pub fn check_record(&self, record: &ContentRecord) -> RecordVerdict {
        let title = self.check_title(&record.title);
        let content = self.check_content_phrases(&record.body);
        let short_fact = record.short_fact().map(|f| self.check_short_fact(f));

        let unique = title.unique
            && content.unique
            && short_fact.as_ref().is_none_or(|v| v.unique);

        RecordVerdict {
            unique,
            title,
            content,
            short_fact,
        }
    }

    /// Append everything derived from `record`, dated with its date or
    /// today, then persist.
    pub fn record(&mut self, record: &ContentRecord) -> Result<RecordSummary, StoreError> {
        self.record_on(record, today())
    }

    /// [`record`](Self::record) with an explicit "today".
    #[instrument(skip(self, record), fields(title = %record.title))]
    pub fn record_on(
        &mut self,
        record: &ContentRecord,
        today: NaiveDate,
    ) -> Result<RecordSummary, StoreError> {
        let date_used = record.date_or(today);
        let phrases = extract_phrases(&record.body);
        let theme = record.theme_or_default().to_string();

        let history = self.store.history_mut();

        history.titles.push(TitleEntry {
            title: record.title.clone(),
            date_used,
            theme: theme.clone(),
        });

        let phrase_count = phrases.len();
        history
            .key_phrases
            .extend(phrases.into_iter().map(|phrase| PhraseEntry { phrase, date_used }));

        if let Some(reference) = record.citation() {
            history.citations.push(CitationEntry {
                reference: reference.to_string(),
                date_used,
                theme,
            });
        }
        if let Some(fact) = record.short_fact() {
            history.short_facts.push(ShortFactEntry {
                fact: fact.to_string(),
                date_used,
            });
        }
        if let Some(method) = record.method() {
            history.methods.push(MethodEntry {
                method: method.to_string(),
                date_used,
            });
        }
        if let Some(origin) = record.origin() {
            history.origins.push(OriginEntry {
                origin: origin.to_string(),
                date_used,
            });
        }
        if let Some(category) = record.theme() {
            history.themes.push(ThemeEntry {
                category: category.to_string(),
                date_used,
                title: record.title.clone(),
            });
        }

        let summary = RecordSummary {
            date_used,
            phrases: phrase_count,
            citation: record.citation().is_some(),
            short_fact: record.short_fact().is_some(),
            method: record.method().is_some(),
            origin: record.origin().is_some(),
            theme: record.theme().is_some(),
            total_records: history.total_records(),
        };

        self.store.persist()?;
        info!(date = %date_used, phrases = phrase_count, "recorded content");
        Ok(summary)
    }
}
