use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::BaleRecord;

/// Totals for one bale type over a date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaleTypeStats {
    pub bale_type: String,
    /// Weighed bales only.
    pub count: usize,
    pub total_weight: f64,
    pub mean_weight: f64,
    /// First non-blank supervisor logged for this type in the window.
    pub supervisor: String,
}

/// Records dated within `[start, end]`, in log order.
pub fn in_window(records: &[BaleRecord], start: NaiveDate, end: NaiveDate) -> Vec<&BaleRecord> {
    records
        .iter()
        .filter(|r| start <= r.date && r.date <= end)
        .collect()
}

#[derive(Default)]
struct Group<'a> {
    count: usize,
    total: f64,
    supervisor: Option<&'a str>,
}

/// Per-type statistics for records dated within `[start, end]`, sorted by type.
/// Bales with no weight are left out.
pub fn statistics(records: &[BaleRecord], start: NaiveDate, end: NaiveDate) -> Vec<BaleTypeStats> {
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();

    for record in in_window(records, start, end) {
        let Some(weight) = record.weight else { continue };
        let group = groups.entry(record.bale_type.as_str()).or_default();
        group.count += 1;
        group.total += weight;
        let supervisor = record.supervisor.trim();
        if group.supervisor.is_none() && !supervisor.is_empty() {
            group.supervisor = Some(supervisor);
        }
    }

    groups
        .into_iter()
        .map(|(bale_type, group)| BaleTypeStats {
            bale_type: bale_type.to_string(),
            count: group.count,
            total_weight: round2(group.total),
            mean_weight: round2(group.total / group.count as f64),
            supervisor: group.supervisor.unwrap_or_default().to_string(),
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bale(day: u32, bale_type: &str, weight: f64, supervisor: &str) -> BaleRecord {
        BaleRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            time: None,
            shift: "أول".into(),
            supervisor: supervisor.into(),
            bale_type: bale_type.into(),
            weight: Some(weight),
            notes: String::new(),
        }
    }

    #[test]
    fn groups_by_type_within_window() {
        let records = vec![
            bale(1, "قطن خام", 200.0, "A"),
            bale(2, "برم", 150.0, "B"),
            bale(2, "قطن خام", 210.34, "C"),
            bale(5, "قطن خام", 999.0, "D"),
        ];
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let stats = statistics(&records, d(1), d(2));

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].bale_type, "برم");
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[1].bale_type, "قطن خام");
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[1].total_weight, 410.34);
        assert_eq!(stats[1].mean_weight, 205.17);
        assert_eq!(stats[1].supervisor, "A");
    }

    #[test]
    fn unweighed_bales_and_blank_supervisors_are_skipped() {
        let records = vec![
            bale(3, "ملح", 120.0, ""),
            BaleRecord { weight: None, ..bale(3, "ملح", 0.0, "X") },
            bale(4, "ملح", 130.0, "  "),
            bale(4, "ملح", 140.0, "عبدالحميدT.B"),
            BaleRecord { weight: None, ..bale(4, "مكس", 0.0, "Y") },
        ];
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let stats = statistics(&records, d(1), d(31));

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].bale_type, "ملح");
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].total_weight, 390.0);
        assert_eq!(stats[0].mean_weight, 130.0);
        assert_eq!(stats[0].supervisor, "عبدالحميدT.B");

        assert_eq!(in_window(&records, d(4), d(4)).len(), 3);
    }

    #[test]
    fn empty_window_gives_nothing() {
        let records = vec![bale(10, "برم", 150.0, "B")];
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        assert!(statistics(&records, d(1), d(9)).is_empty());
        assert!(statistics(&[], d(1), d(31)).is_empty());
    }
}
