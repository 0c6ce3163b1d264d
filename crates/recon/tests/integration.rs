use std::collections::HashSet;

use proptest::prelude::*;

use millcard_recon::model::{CellValue, HistoryRecord, ServiceBand, StatusOutcome};
use millcard_recon::{evaluate, normalize, reconcile, MemorySource, ViewSelection, Vocabulary};

const SERVICES: &[&str] = &["Oil", "Filter", "Belt", "Brake", "Grease", "Air Filter", "تغيير الزيت"];

fn event(min: f64, max: f64, done: &[(&str, &str)]) -> HistoryRecord {
    let mut record = HistoryRecord::new();
    record.push("Min_Tones", CellValue::Number(min));
    record.push("Max_Tones", CellValue::Number(max));
    for (service, value) in done {
        record.push(*service, CellValue::text(*value));
    }
    record
}

fn split_list(s: &str, sep: &str) -> Vec<String> {
    if s == "-" {
        return Vec::new();
    }
    s.split(sep).map(String::from).collect()
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn card_history_across_all_bands() {
    let plan = vec![
        ServiceBand::new(0.0, 1000.0, "Oil + Filter"),
        ServiceBand::new(1000.0, 2000.0, "Oil\nBelt"),
        ServiceBand::new(2000.0, 3000.0, "Brake; Grease"),
    ];
    let history = vec![
        event(0.0, 1000.0, &[("Oil", "done"), ("Filter", "done")]),
        event(1000.0, 1900.0, &[("oil", "yes"), ("Belt", "لم تتم")]),
    ];
    let source = MemorySource::new(plan).with_history("12", history);

    let report = evaluate(&source, "12", 1500.0, &ViewSelection::All, &Vocabulary::default()).unwrap();
    assert_eq!(report.outcome, StatusOutcome::Evaluated);

    // Both events share the 1000 boundary with the first two bands.
    let shapes: Vec<(f64, bool, &str)> = report
        .rows
        .iter()
        .map(|r| (r.min_tons, r.has_history, r.service_not_done.as_str()))
        .collect();
    assert_eq!(
        shapes,
        vec![
            (0.0, true, "-"),
            (0.0, true, "Filter"),
            (1000.0, true, "Belt"),
            (1000.0, true, "Belt"),
            (2000.0, false, "Brake + Grease"),
        ]
    );
    assert_eq!(report.summary.bands_selected, 3);
    assert_eq!(report.summary.bands_without_history, 1);
    assert_eq!(report.summary.rows_complete, 1);
}

#[test]
fn current_view_and_lower_view() {
    let plan = vec![ServiceBand::new(500.0, 1500.0, "Oil")];
    let source = MemorySource::new(plan).with_history("1", vec![]);
    let vocab = Vocabulary::default();

    let current = evaluate(&source, "1", 1000.0, &ViewSelection::Current, &vocab).unwrap();
    assert_eq!(current.rows.len(), 1);

    let lower = evaluate(&source, "1", 400.0, &ViewSelection::AllLower, &vocab).unwrap();
    assert!(lower.is_empty_selection());
}

#[test]
fn report_serializes_to_json() {
    let source = MemorySource::new(vec![ServiceBand::new(0.0, 1000.0, "Oil+Filter")])
        .with_history("7", vec![event(0.0, 1000.0, &[("Oil", "done"), ("Filter", "no")])]);
    let report = evaluate(&source, "7", 10.0, &ViewSelection::Current, &Vocabulary::default()).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "evaluated");
    assert_eq!(json["meta"]["view"], "current");
    assert_eq!(json["rows"][0]["service_done"], "Oil");
    assert_eq!(json["rows"][0]["service_not_done"], "Filter");
    assert_eq!(json["rows"][0]["service_needed"], "Oil + Filter");
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

fn service_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SERVICES)
}

fn done_value() -> impl Strategy<Value = &'static str> {
    prop::sample::select(&["done", "no", "", "x", "yes", "0", "1", "not done"][..])
}

proptest! {
    #[test]
    fn done_and_not_done_partition_required(
        required in prop::collection::vec(service_name(), 0..6),
        cells in prop::collection::vec((service_name(), done_value()), 0..6),
    ) {
        let band = ServiceBand::new(0.0, 100.0, required.join(" + "));
        let record = event(0.0, 100.0, &cells);
        let rows = reconcile("1", &[band], &[record], &Vocabulary::default());
        prop_assert_eq!(rows.len(), 1);

        let done: HashSet<String> = split_list(&rows[0].service_done, ", ")
            .iter()
            .map(|s| normalize(s))
            .collect();
        let not_done: Vec<String> = split_list(&rows[0].service_not_done, ", ");

        for service in &required {
            let in_done = done.contains(&normalize(service));
            let in_not_done = not_done.iter().any(|s| normalize(s) == normalize(service));
            prop_assert!(in_done != in_not_done, "{} must be in exactly one list", service);
        }
        prop_assert_eq!(rows[0].outstanding, not_done.len());
    }

    #[test]
    fn overlap_is_inclusive_interval_test(
        m1 in 0u32..50, w1 in 0u32..50,
        m2 in 0u32..50, w2 in 0u32..50,
    ) {
        let (m1, big1) = (f64::from(m1), f64::from(m1 + w1));
        let (m2, big2) = (f64::from(m2), f64::from(m2 + w2));
        let band = ServiceBand::new(m1, big1, "Oil");
        let rows = reconcile("1", &[band], &[event(m2, big2, &[])], &Vocabulary::default());
        prop_assert_eq!(rows[0].has_history, big2 >= m1 && m2 <= big1);
    }

    #[test]
    fn row_count_matches_overlapping_events(
        spans in prop::collection::vec((0u32..100, 0u32..40), 0..8),
    ) {
        let band = ServiceBand::new(30.0, 60.0, "Oil");
        let history: Vec<HistoryRecord> = spans
            .iter()
            .map(|(m, w)| event(f64::from(*m), f64::from(m + w), &[("Oil", "done")]))
            .collect();
        let expected = spans
            .iter()
            .filter(|(m, w)| m + w >= 30 && *m <= 60)
            .count();
        let rows = reconcile("1", &[band], &history, &Vocabulary::default());
        prop_assert_eq!(rows.len(), expected.max(1));
        prop_assert_eq!(rows.iter().all(|r| r.has_history), expected > 0);
    }
}
