use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{format_tons, parse_required, EMPTY_MARK};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The value of one cell in a plan or history sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    /// Cell rendered as text. Integral numbers print without decimals.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_tons(*n),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One row of a machine's history sheet, columns kept in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    cells: Vec<(String, CellValue)>,
}

impl HistoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.push((column.into(), value));
    }

    /// Exact (un-normalized) column lookup. First column with that name wins.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One row of the maintenance plan: an inclusive tonnage band and the raw
/// descriptor of the services it requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBand {
    pub min_tons: f64,
    pub max_tons: f64,
    pub required_raw: String,
}

impl ServiceBand {
    pub fn new(min_tons: f64, max_tons: f64, required_raw: impl Into<String>) -> Self {
        Self {
            min_tons,
            max_tons,
            required_raw: required_raw.into(),
        }
    }

    pub fn required_services(&self) -> Vec<String> {
        parse_required(&self.required_raw)
    }

    /// Inclusive interval overlap with `[min, max]`.
    pub fn overlaps(&self, min: f64, max: f64) -> bool {
        max >= self.min_tons && min <= self.max_tons
    }
}

/// A history record resolved against the column vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEvent {
    pub min_tons: f64,
    pub max_tons: f64,
    pub date: String,
    pub tons_at_event: String,
    pub other_note: String,
    pub event: String,
    pub correction: String,
    pub serviced_by: String,
    pub performed_services: BTreeSet<String>,
}

impl Default for ServiceEvent {
    fn default() -> Self {
        Self {
            min_tons: 0.0,
            max_tons: 0.0,
            date: EMPTY_MARK.into(),
            tons_at_event: EMPTY_MARK.into(),
            other_note: EMPTY_MARK.into(),
            event: EMPTY_MARK.into(),
            correction: EMPTY_MARK.into(),
            serviced_by: EMPTY_MARK.into(),
            performed_services: BTreeSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One reconciliation row: a band paired with one matching event, or a
/// band on its own when no event overlaps it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatusRow {
    pub card_number: String,
    pub min_tons: f64,
    pub max_tons: f64,
    pub service_needed: String,
    pub service_done: String,
    pub service_not_done: String,
    /// Required entries still outstanding for this row.
    pub outstanding: usize,
    pub has_history: bool,
    pub tons_at_event: String,
    pub event: String,
    pub correction: String,
    pub serviced_by: String,
    pub date: String,
    pub other_note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOutcome {
    Evaluated,
    NoMatchingBands,
}

impl std::fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evaluated => write!(f, "evaluated"),
            Self::NoMatchingBands => write!(f, "no_matching_bands"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusMeta {
    pub card_number: String,
    pub usage_tons: f64,
    pub view: String,
    pub engine_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub bands_selected: usize,
    pub rows: usize,
    pub bands_with_history: usize,
    pub bands_without_history: usize,
    pub rows_complete: usize,
    pub outstanding_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub meta: StatusMeta,
    pub outcome: StatusOutcome,
    pub summary: StatusSummary,
    pub rows: Vec<ServiceStatusRow>,
}

impl StatusReport {
    pub fn is_empty_selection(&self) -> bool {
        self.outcome == StatusOutcome::NoMatchingBands
    }
}
