//! Content record accepted by the evaluator.
//!
//! Generators emit loosely shaped JSON. Every field the tracker consumes is
//! read under its current and historical names; unknown fields are ignored.

use std::{fs, io::Read, path::Path};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Theme recorded when a record carries none.
pub const DEFAULT_THEME: &str = "general";

/// Errors raised while reading a record from disk or stdin.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("read record {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse record {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One finished content item.
///
/// Deserialization goes through [`RawRecord`] so that every historical field
/// spelling can appear at once and malformed optional fields degrade to absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct ContentRecord {
    pub title: String,

    /// Main body text; phrases are extracted from here
    pub body: String,

    pub citation: Option<String>,

    pub short_fact: Option<String>,

    pub method: Option<String>,

    pub origin: Option<String>,

    pub theme: Option<String>,

    /// `YYYY-MM-DD` or RFC 3339; anything else falls back to today
    pub date: Option<String>,
}

/// Wire shape of a record: every accepted spelling as its own field.
///
/// When several spellings are present the first non-blank one wins:
/// `body` > `devotional_text` > `content`, `citation` > `scripture`,
/// `short_fact` > `coffee_fact`, `method` > `brewing_method`,
/// `origin` > `origin_story`.
#[derive(Deserialize)]
struct RawRecord {
    title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    body: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    devotional_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    content: Option<String>,
    #[serde(default, deserialize_with = "lenient_citation")]
    citation: Option<String>,
    #[serde(default, deserialize_with = "lenient_citation")]
    scripture: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    short_fact: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    coffee_fact: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    method: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    brewing_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    origin: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    origin_story: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    theme: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date: Option<String>,
}

impl From<RawRecord> for ContentRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            title: raw.title,
            body: first_present([raw.body, raw.devotional_text, raw.content]).unwrap_or_default(),
            citation: first_present([raw.citation, raw.scripture]),
            short_fact: first_present([raw.short_fact, raw.coffee_fact]),
            method: first_present([raw.method, raw.brewing_method]),
            origin: first_present([raw.origin, raw.origin_story]),
            theme: raw.theme,
            date: raw.date,
        }
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

/// Strings pass through; `null` is absent; any other JSON value is dropped with a warning.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            warn!(value = %other, "ignoring non-text record field");
            None
        }
    })
}

/// Citation arrives either as a plain string or as `{"verse": "..."}`.
fn lenient_citation<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Object(mut map) => match map.remove("verse") {
            Some(Value::String(verse)) => Some(verse),
            _ => None,
        },
        Value::Null => None,
        other => {
            warn!(value = %other, "ignoring unrecognized citation");
            None
        }
    })
}

/// Treat blank optional strings as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ContentRecord {
    /// Record with only a title and body.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date.format("%Y-%m-%d").to_string());
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.citation = Some(citation.into());
        self
    }

    pub fn with_short_fact(mut self, fact: impl Into<String>) -> Self {
        self.short_fact = Some(fact.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn citation(&self) -> Option<&str> {
        present(&self.citation)
    }

    pub fn short_fact(&self) -> Option<&str> {
        present(&self.short_fact)
    }

    pub fn method(&self) -> Option<&str> {
        present(&self.method)
    }

    pub fn origin(&self) -> Option<&str> {
        present(&self.origin)
    }

    pub fn theme(&self) -> Option<&str> {
        present(&self.theme)
    }

    /// Theme for title and citation entries.
    pub fn theme_or_default(&self) -> &str {
        self.theme().unwrap_or(DEFAULT_THEME)
    }

    /// Date used for every entry derived from this record.
    pub fn date_or(&self, today: NaiveDate) -> NaiveDate {
        match present(&self.date) {
            None => today,
            Some(raw) => parse_date(raw).unwrap_or_else(|| {
                warn!(date = raw, "unparseable record date, using today");
                today
            }),
        }
    }

    /// Parse a record from JSON text.
    pub fn from_json(text: &str, origin: &str) -> Result<Self, RecordError> {
        serde_json::from_str(text).map_err(|source| RecordError::Json {
            path: origin.to_string(),
            source,
        })
    }

    /// Read a record from a file, or from stdin when `path` is `-`.
    pub fn read(path: &Path) -> Result<Self, RecordError> {
        let label = path.display().to_string();
        let io_err = |source| RecordError::Io {
            path: label.clone(),
            source,
        };

        let text = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(io_err)?;
            buf
        } else {
            fs::read_to_string(path).map_err(io_err)?
        };

        Self::from_json(&text, &label)
    }
}

/// Accept `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// UTC calendar date; report windows and retention use the same clock.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn generator_field_names_are_accepted() {
        let json = r#"{
            "title": "Morning Grace",
            "devotional_text": "Grace flows through every morning.",
            "scripture": { "verse": "Lamentations 3:22-23", "text": "..." },
            "coffee_fact": "Coffee cherries ripen unevenly.",
            "brewing_method": "Pour Over",
            "origin_story": "Ethiopia: birthplace of coffee",
            "theme": "grace",
            "date": "2025-03-01",
            "prayer": "ignored"
        }"#;
        let rec = ContentRecord::from_json(json, "inline").unwrap();

        assert_eq!(rec.body, "Grace flows through every morning.");
        assert_eq!(rec.citation(), Some("Lamentations 3:22-23"));
        assert_eq!(rec.short_fact(), Some("Coffee cherries ripen unevenly."));
        assert_eq!(rec.method(), Some("Pour Over"));
        assert_eq!(rec.origin(), Some("Ethiopia: birthplace of coffee"));
        assert_eq!(rec.date_or(d("2030-01-01")), d("2025-03-01"));
    }

    #[test]
    fn plain_citation_and_missing_fields() {
        let rec = ContentRecord::from_json(r#"{"title":"T","citation":"John 1:1"}"#, "x").unwrap();
        assert_eq!(rec.citation(), Some("John 1:1"));
        assert_eq!(rec.short_fact(), None);
        assert_eq!(rec.theme_or_default(), DEFAULT_THEME);
        assert!(rec.body.is_empty());
    }

    #[test]
    fn scripture_without_verse_is_absent() {
        let rec = ContentRecord::from_json(r#"{"title":"T","scripture":{}}"#, "x").unwrap();
        assert_eq!(rec.citation(), None);
    }

    #[test]
    fn bad_or_missing_date_falls_back_to_today() {
        let today = d("2026-10-15");
        assert_eq!(ContentRecord::new("T", "").date_or(today), today);

        let mut rec = ContentRecord::new("T", "");
        rec.date = Some("next tuesday".into());
        assert_eq!(rec.date_or(today), today);

        rec.date = Some("2026-10-01T08:30:00Z".into());
        assert_eq!(rec.date_or(today), d("2026-10-01"));
    }

    #[test]
    fn blank_optionals_count_as_absent() {
        let rec = ContentRecord::new("T", "").with_method("  ").with_theme("");
        assert_eq!(rec.method(), None);
        assert_eq!(rec.theme(), None);
    }

    #[test]
    fn every_spelling_at_once_prefers_the_canonical_one() {
        let json = r#"{
            "title": "T",
            "body": "  ",
            "devotional_text": "Grace flows through every morning.",
            "content": "other",
            "citation": "John 1:1",
            "scripture": { "verse": "Psalm 23:1" },
            "short_fact": "Beans are seeds.",
            "coffee_fact": "Coffee cherries ripen unevenly.",
            "method": "V60",
            "brewing_method": "Pour Over",
            "origin": "Kenya",
            "origin_story": "Ethiopia"
        }"#;
        let rec = ContentRecord::from_json(json, "inline").unwrap();

        // Blank `body` falls through to `devotional_text`
        assert_eq!(rec.body, "Grace flows through every morning.");
        assert_eq!(rec.citation(), Some("John 1:1"));
        assert_eq!(rec.short_fact(), Some("Beans are seeds."));
        assert_eq!(rec.method(), Some("V60"));
        assert_eq!(rec.origin(), Some("Kenya"));
    }

    #[test]
    fn mistyped_optionals_degrade_to_absent() {
        let json = r#"{"title":"T","date":20261015,"theme":["a"],"method":3,"scripture":7}"#;
        let rec = ContentRecord::from_json(json, "inline").unwrap();

        let today = d("2026-10-15");
        assert_eq!(rec.date, None);
        assert_eq!(rec.date_or(today), today);
        assert_eq!(rec.theme_or_default(), DEFAULT_THEME);
        assert_eq!(rec.method(), None);
        assert_eq!(rec.citation(), None);
    }

    #[test]
    fn missing_title_is_still_an_error() {
        let err = ContentRecord::from_json(r#"{"body":"text"}"#, "x").unwrap_err();
        assert!(matches!(err, RecordError::Json { .. }));
    }

    #[test]
    fn non_json_is_an_error() {
        let err = ContentRecord::from_json("not json", "stdin").unwrap_err();
        assert!(matches!(err, RecordError::Json { .. }));
    }
}
