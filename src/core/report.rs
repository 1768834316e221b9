//! Read-only aggregation of the history into usage statistics.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use crate::core::store::HistoryStore;

/// Default size of top-N lists.
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Titles used within this many days count as recent.
pub const RECENT_TITLE_DAYS: u32 = 7;

/// Methods used within this many days are not suggested.
pub const DEFAULT_METHOD_WINDOW_DAYS: u32 = 30;

/// Preparation methods suggested when none are configured.
pub const DEFAULT_KNOWN_METHODS: &[&str] = &[
    "Pour Over",
    "French Press",
    "Espresso",
    "Cold Brew",
    "AeroPress",
    "Chemex",
    "V60",
    "Drip Coffee",
    "Turkish Coffee",
    "Moka Pot",
    "Siphon",
    "Percolator",
];

/// A distinct value and how often it was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCount {
    pub value: String,
    pub times_used: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_records: usize,
    pub unique_title_count: usize,
    pub unique_citation_count: usize,
    pub short_fact_count: usize,
    pub unique_method_count: usize,
    pub unique_origin_count: usize,
    pub theme_distribution: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub recent_titles: Vec<String>,
    pub top_citations: Vec<UsageCount>,
    pub top_methods: Vec<UsageCount>,
    pub top_origins: Vec<UsageCount>,
}

/// Full usage report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub overview: Overview,
    pub recent_activity: RecentActivity,
}

/// Count occurrences, most used first; ties keep first-seen order.
pub fn rank<'a>(values: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<UsageCount> {
    let mut usage: IndexMap<&str, usize> = IndexMap::new();
    for v in values {
        *usage.entry(v).or_insert(0) += 1;
    }

    usage
        .into_iter()
        // Stable sort keeps insertion order among equal counts
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .take(limit)
        .map(|(value, times_used)| UsageCount {
            value: value.to_string(),
            times_used,
        })
        .collect()
}

/// Usage statistics over one store, evaluated at a fixed instant.
pub struct Reporter<'a> {
    store: &'a HistoryStore,
    now: DateTime<Utc>,
}

impl<'a> Reporter<'a> {
    pub fn new(store: &'a HistoryStore) -> Self {
        Self::at(store, Utc::now())
    }

    /// Report relative to `now` instead of the wall clock.
    pub fn at(store: &'a HistoryStore, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    /// Calendar-day window, inclusive at both ends; future dates count.
    fn within(&self, date: NaiveDate, days: u32) -> bool {
        (self.now.date_naive() - date).num_days() <= i64::from(days)
    }

    pub fn report(&self, limit: usize) -> Report {
        let h = self.store.history();

        let overview = Overview {
            total_records: h.total_records(),
            unique_title_count: h
                .titles
                .iter()
                .map(|t| t.title.to_lowercase())
                .collect::<HashSet<_>>()
                .len(),
            unique_citation_count: h.citations.iter().map(|c| &c.reference).unique().count(),
            short_fact_count: h.short_facts.len(),
            unique_method_count: h.methods.iter().map(|m| &m.method).unique().count(),
            unique_origin_count: h.origins.iter().map(|o| &o.origin).unique().count(),
            theme_distribution: self.theme_distribution(),
        };

        let recent_activity = RecentActivity {
            recent_titles: self.recent_titles(RECENT_TITLE_DAYS),
            top_citations: self.top_citations(limit),
            top_methods: self.top_methods(limit),
            top_origins: self.top_origins(limit),
        };

        Report {
            generated_at: self.now,
            last_updated: h.last_updated,
            overview,
            recent_activity,
        }
    }

    /// Theme category → number of records tagged with it.
    pub fn theme_distribution(&self) -> IndexMap<String, usize> {
        let mut dist = IndexMap::new();
        for theme in &self.store.history().themes {
            *dist.entry(theme.category.clone()).or_insert(0) += 1;
        }
        dist
    }

    /// Titles used within the last `days` days, in recorded order.
    pub fn recent_titles(&self, days: u32) -> Vec<String> {
        self.store
            .history()
            .titles
            .iter()
            .filter(|t| self.within(t.date_used, days))
            .map(|t| t.title.clone())
            .collect()
    }

    pub fn top_citations(&self, limit: usize) -> Vec<UsageCount> {
        rank(
            self.store.history().citations.iter().map(|c| c.reference.as_str()),
            limit,
        )
    }

    pub fn top_methods(&self, limit: usize) -> Vec<UsageCount> {
        rank(
            self.store.history().methods.iter().map(|m| m.method.as_str()),
            limit,
        )
    }

    pub fn top_origins(&self, limit: usize) -> Vec<UsageCount> {
        rank(
            self.store.history().origins.iter().map(|o| o.origin.as_str()),
            limit,
        )
    }

    /// Known methods not used in the last `window_days` days, in catalogue
    /// order.
    pub fn suggested_unused_methods<S: AsRef<str>>(
        &self,
        all_known: &[S],
        window_days: u32,
    ) -> Vec<String> {
        let recent: HashSet<&str> = self
            .store
            .history()
            .methods
            .iter()
            .filter(|m| self.within(m.date_used, window_days))
            .map(|m| m.method.as_str())
            .collect();

        all_known
            .iter()
            .map(|m| m.as_ref())
            .filter(|m| !recent.contains(m))
            .map(str::to_owned)
            .collect()
    }
}
