use std::collections::{BTreeSet, HashMap};

use crate::config::Vocabulary;
use crate::model::{CellValue, HistoryRecord, ServiceEvent};
use crate::normalize::{metadata_text, normalize, parse_tons_or_zero, EMPTY_MARK};

/// What a history column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Card,
    Tons,
    MinTons,
    MaxTons,
    Date,
    Other,
    Event,
    Correction,
    ServicedBy,
    /// Header that normalizes to nothing (blank or punctuation only).
    Unnamed,
    /// Any other column: its name is a service, its cell is evidence of it.
    Service,
}

impl ColumnRole {
    pub fn is_service(self) -> bool {
        self == Self::Service
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Tons => write!(f, "tons"),
            Self::MinTons => write!(f, "min_tons"),
            Self::MaxTons => write!(f, "max_tons"),
            Self::Date => write!(f, "date"),
            Self::Other => write!(f, "other"),
            Self::Event => write!(f, "event"),
            Self::Correction => write!(f, "correction"),
            Self::ServicedBy => write!(f, "serviced_by"),
            Self::Unnamed => write!(f, "unnamed"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// Column roles for one history snapshot, computed once and reused for
/// every record in it.
#[derive(Debug)]
pub struct ColumnClassifier<'v> {
    vocabulary: &'v Vocabulary,
    roles: HashMap<String, ColumnRole>,
}

impl<'v> ColumnClassifier<'v> {
    pub fn build(records: &[HistoryRecord], vocabulary: &'v Vocabulary) -> Self {
        let mut roles = HashMap::new();
        for record in records {
            for column in record.columns() {
                if !roles.contains_key(column) {
                    roles.insert(column.to_string(), classify_column(column, vocabulary));
                }
            }
        }
        Self { vocabulary, roles }
    }

    pub fn role(&self, column: &str) -> ColumnRole {
        self.roles
            .get(column)
            .copied()
            .unwrap_or_else(|| classify_column(column, self.vocabulary))
    }

    /// Service column names, in first-seen order across the snapshot.
    pub fn service_columns<'r>(&self, records: &'r [HistoryRecord]) -> Vec<&'r str> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for record in records {
            for column in record.columns() {
                if self.role(column).is_service() && seen.insert(column) {
                    out.push(column);
                }
            }
        }
        out
    }

    /// Resolve a record into tonnage, metadata and performed services.
    pub fn event(&self, record: &HistoryRecord) -> ServiceEvent {
        let mut event = ServiceEvent::default();
        let mut min_tons = None;
        let mut max_tons = None;

        for (column, value) in record.iter() {
            match self.role(column) {
                ColumnRole::Service => {
                    if self.vocabulary.is_done_value(&value.as_text()) {
                        event.performed_services.insert(column.to_string());
                    }
                }
                ColumnRole::MinTons => fill_tons(&mut min_tons, value),
                ColumnRole::MaxTons => fill_tons(&mut max_tons, value),
                ColumnRole::Tons => fill_text(&mut event.tons_at_event, value),
                ColumnRole::Date => fill_text(&mut event.date, value),
                ColumnRole::Other => fill_text(&mut event.other_note, value),
                ColumnRole::Event => fill_text(&mut event.event, value),
                ColumnRole::Correction => fill_text(&mut event.correction, value),
                ColumnRole::ServicedBy | ColumnRole::Card | ColumnRole::Unnamed => {}
            }
        }

        event.min_tons = min_tons.unwrap_or(0.0);
        event.max_tons = max_tons.unwrap_or(0.0);
        event.serviced_by = self.serviced_by(record);
        event
    }

    /// Known spellings first, in priority order, then any column whose
    /// normalized name is a serviced-by spelling.
    fn serviced_by(&self, record: &HistoryRecord) -> String {
        for probe in self.vocabulary.serviced_by_probes() {
            if let Some(value) = record.get(probe) {
                let text = metadata_text(value);
                if text != EMPTY_MARK {
                    return text;
                }
            }
        }

        record
            .iter()
            .filter(|(column, _)| self.role(column) == ColumnRole::ServicedBy)
            .map(|(_, value)| metadata_text(value))
            .find(|text| text != EMPTY_MARK)
            .unwrap_or_else(|| EMPTY_MARK.to_string())
    }
}

fn classify_column(column: &str, vocabulary: &Vocabulary) -> ColumnRole {
    if normalize(column).is_empty() {
        return ColumnRole::Unnamed;
    }
    vocabulary.reserved_role(column).unwrap_or(ColumnRole::Service)
}

// First non-blank column wins; later duplicates don't overwrite it.
fn fill_tons(slot: &mut Option<f64>, value: &CellValue) {
    if slot.is_none() && !value.is_blank() {
        *slot = Some(parse_tons_or_zero(value));
    }
}

fn fill_text(slot: &mut String, value: &CellValue) {
    if slot == EMPTY_MARK {
        *slot = metadata_text(value);
    }
}
