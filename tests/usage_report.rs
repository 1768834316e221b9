//! Usage report aggregation over recorded history.

use chrono::Duration;
use freshness::core::report::{DEFAULT_KNOWN_METHODS, UsageCount};
use freshness::core::store::start_of;
use freshness::{ContentRecord, Reporter};

mod util;
use util::{days_ago, empty_tracker, record_on, today};

fn usage(value: &str, times_used: usize) -> UsageCount
{
    UsageCount { value: value.to_string(), times_used }
}

#[test]
fn top_methods_rank_by_count()
{
    let (_tmp, mut tracker) = empty_tracker();
    for (i, method) in ["A", "A", "B", "B", "B", "C"].into_iter().enumerate() {
        record_on(
            &mut tracker,
            ContentRecord::new(format!("t{i}"), "").with_method(method),
            days_ago(1),
        );
    }

    let reporter = Reporter::at(tracker.store(), start_of(today()));
    assert_eq!(reporter.top_methods(2), vec![usage("B", 3), usage("A", 2)]);
    assert_eq!(reporter.top_methods(5).len(), 3);
}

#[test]
fn overview_counts_distinct_values()
{
    let (_tmp, mut tracker) = empty_tracker();
    let entries = [
        ("Morning Grace", "John 1:5", "light"),
        ("morning grace", "John 1:5", "light"),
        ("Still Waters", "Psalm 23:2", "rest"),
    ];
    for (title, verse, theme) in entries {
        record_on(
            &mut tracker,
            ContentRecord::new(title, "")
                .with_citation(verse)
                .with_short_fact(format!("{title} fact"))
                .with_method("Moka Pot")
                .with_theme(theme),
            days_ago(2),
        );
    }

    let report = Reporter::at(tracker.store(), start_of(today())).report(5);
    let o = &report.overview;
    assert_eq!(o.total_records, 3);
    assert_eq!(o.unique_title_count, 2);
    assert_eq!(o.unique_citation_count, 2);
    assert_eq!(o.short_fact_count, 3);
    assert_eq!(o.unique_method_count, 1);
    assert_eq!(o.theme_distribution.get("light"), Some(&2));
    assert_eq!(o.theme_distribution.get("rest"), Some(&1));
    assert_eq!(
        report.recent_activity.top_citations,
        vec![usage("John 1:5", 2), usage("Psalm 23:2", 1)]
    );
}

#[test]
fn recent_titles_cover_the_last_seven_days_in_order()
{
    let (_tmp, mut tracker) = empty_tracker();
    for (title, days) in [("Old", 8), ("Week", 7), ("Yesterday", 1), ("Today", 0)] {
        record_on(&mut tracker, ContentRecord::new(title, ""), days_ago(days));
    }

    let now = start_of(today()) + Duration::hours(18);
    let reporter = Reporter::at(tracker.store(), now);
    assert_eq!(reporter.recent_titles(7), ["Week", "Yesterday", "Today"]);
    assert_eq!(reporter.report(5).recent_activity.recent_titles.len(), 3);
}

#[test]
fn suggested_methods_skip_recent_ones()
{
    let (_tmp, mut tracker) = empty_tracker();
    record_on(&mut tracker, ContentRecord::new("a", "").with_method("Espresso"), days_ago(3));
    record_on(&mut tracker, ContentRecord::new("b", "").with_method("Chemex"), days_ago(45));

    let reporter = Reporter::at(tracker.store(), start_of(today()));
    let suggested = reporter.suggested_unused_methods(DEFAULT_KNOWN_METHODS, 30);

    assert!(!suggested.iter().any(|m| m == "Espresso"));
    assert!(suggested.iter().any(|m| m == "Chemex"));
    assert_eq!(suggested.len(), DEFAULT_KNOWN_METHODS.len() - 1);
    assert_eq!(suggested.first().map(String::as_str), Some("Pour Over"));

    // A wider window catches Chemex too
    let wider = reporter.suggested_unused_methods(&["Espresso", "Chemex", "Siphon"], 60);
    assert_eq!(wider, ["Siphon"]);
}

#[test]
fn empty_history_reports_zeroes()
{
    let (_tmp, tracker) = empty_tracker();
    let report = Reporter::new(tracker.store()).report(5);

    assert_eq!(report.overview.total_records, 0);
    assert!(report.overview.theme_distribution.is_empty());
    assert!(report.recent_activity.recent_titles.is_empty());
    assert!(report.recent_activity.top_methods.is_empty());
}
