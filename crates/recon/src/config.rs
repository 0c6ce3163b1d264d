use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::classify::ColumnRole;
use crate::error::ReconError;
use crate::normalize::normalize;

// ---------------------------------------------------------------------------
// Default spellings
// ---------------------------------------------------------------------------

const CARD: &[&str] = &["card", "card no", "card number", "card_no", "machine", "الكارت", "رقم الكارت", "رقم الماكينة"];
const TONS: &[&str] = &["tones", "tons", "tonnage", "الأطنان", "الاطنان", "طن"];
const MIN_TONS: &[&str] = &["min_tones", "min_tons", "min tones", "min tons", "min", "من", "الحد الأدنى"];
const MAX_TONS: &[&str] = &["max_tones", "max_tons", "max tones", "max tons", "max", "إلى", "الى", "الحد الأقصى"];
const DATE: &[&str] = &["date", "التاريخ"];
const OTHER: &[&str] = &["other", "other note", "notes", "ملاحظات", "أخرى", "اخرى"];
const EVENT: &[&str] = &["event", "الحدث", "الحدث/العطل"];
const CORRECTION: &[&str] = &["correction", "التصحيح", "الإصلاح"];

/// Probed in this order; the first non-blank cell wins.
const SERVICED_BY: &[&str] = &[
    "Servised by",
    "Serviced by",
    "Service by",
    "Services by",
    "Serviced_by",
    "Technician",
    "فني الخدمة",
    "تمت بواسطة",
    "بواسطة",
    "الفني",
];

/// Cell values that mean a service column was NOT done (trimmed, lowercased).
const NEGATIVE_VALUES: &[&str] = &["nan", "none", "null", "no", "false", "not done", "لم تتم", "x", "-", "0", ""];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// TOML form
// ---------------------------------------------------------------------------

/// Column spellings as written in a settings file. Omitted lists keep their
/// built-in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub card: Vec<String>,
    pub tons: Vec<String>,
    pub min_tons: Vec<String>,
    pub max_tons: Vec<String>,
    pub date: Vec<String>,
    pub other: Vec<String>,
    pub event: Vec<String>,
    pub correction: Vec<String>,
    pub serviced_by: Vec<String>,
    pub negative_values: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            card: owned(CARD),
            tons: owned(TONS),
            min_tons: owned(MIN_TONS),
            max_tons: owned(MAX_TONS),
            date: owned(DATE),
            other: owned(OTHER),
            event: owned(EVENT),
            correction: owned(CORRECTION),
            serviced_by: owned(SERVICED_BY),
            negative_values: owned(NEGATIVE_VALUES),
        }
    }
}

impl VocabularyConfig {
    pub fn from_toml(s: &str) -> Result<Self, ReconError> {
        toml::from_str(s).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    fn validate(&self) -> Result<(), ReconError> {
        let required = [
            ("card", &self.card),
            ("min_tons", &self.min_tons),
            ("max_tons", &self.max_tons),
            ("serviced_by", &self.serviced_by),
        ];
        for (name, list) in required {
            if list.iter().all(|s| normalize(s).is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "column list '{name}' must name at least one column"
                )));
            }
        }

        // A spelling claimed by two roles would make classification order-dependent.
        let mut seen: HashMap<String, ColumnRole> = HashMap::new();
        for (role, list) in self.role_lists() {
            for spelling in list {
                let key = normalize(spelling);
                if key.is_empty() {
                    continue;
                }
                if let Some(prev) = seen.insert(key.clone(), role) {
                    if prev != role {
                        return Err(ReconError::ConfigValidation(format!(
                            "column '{spelling}' is listed under both {prev} and {role}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn role_lists(&self) -> [(ColumnRole, &Vec<String>); 9] {
        [
            (ColumnRole::Card, &self.card),
            (ColumnRole::Tons, &self.tons),
            (ColumnRole::MinTons, &self.min_tons),
            (ColumnRole::MaxTons, &self.max_tons),
            (ColumnRole::Date, &self.date),
            (ColumnRole::Other, &self.other),
            (ColumnRole::Event, &self.event),
            (ColumnRole::Correction, &self.correction),
            (ColumnRole::ServicedBy, &self.serviced_by),
        ]
    }
}

// ---------------------------------------------------------------------------
// Resolved vocabulary
// ---------------------------------------------------------------------------

/// Reserved metadata columns, negative sentinels and serviced-by probes,
/// resolved into lookup tables keyed by normalized name.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    reserved: HashMap<String, ColumnRole>,
    negatives: HashSet<String>,
    serviced_by_probes: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::build(&VocabularyConfig::default())
    }
}

impl Vocabulary {
    pub fn from_config(config: &VocabularyConfig) -> Result<Self, ReconError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    pub fn from_toml(s: &str) -> Result<Self, ReconError> {
        Self::from_config(&VocabularyConfig::from_toml(s)?)
    }

    fn build(config: &VocabularyConfig) -> Self {
        let mut reserved = HashMap::new();
        for (role, list) in config.role_lists() {
            for spelling in list {
                let key = normalize(spelling);
                if !key.is_empty() {
                    reserved.entry(key).or_insert(role);
                }
            }
        }

        let negatives = config
            .negative_values
            .iter()
            .map(|v| v.trim().to_lowercase())
            .collect();

        Self {
            reserved,
            negatives,
            serviced_by_probes: config.serviced_by.clone(),
        }
    }

    /// Metadata role for a column, by normalized name. `None` means the
    /// column is a service column.
    pub fn reserved_role(&self, column: &str) -> Option<ColumnRole> {
        self.reserved.get(&normalize(column)).copied()
    }

    /// Whether a service cell counts as evidence that the service was done.
    /// Blank cells never do, whatever the configured negatives are.
    pub fn is_done_value(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        !value.is_empty() && !self.negatives.contains(&value)
    }

    pub fn serviced_by_probes(&self) -> &[String] {
        &self.serviced_by_probes
    }

    pub fn reserved_len(&self) -> usize {
        self.reserved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reserves_english_and_arabic_spellings() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.reserved_role("Min_Tones"), Some(ColumnRole::MinTons));
        assert_eq!(vocab.reserved_role("MAX TONS"), Some(ColumnRole::MaxTons));
        assert_eq!(vocab.reserved_role("Servised by"), Some(ColumnRole::ServicedBy));
        assert_eq!(vocab.reserved_role("التاريخ"), Some(ColumnRole::Date));
        assert_eq!(vocab.reserved_role("Event:"), Some(ColumnRole::Event));
        assert_eq!(vocab.reserved_role("Oil"), None);
    }

    #[test]
    fn negative_values() {
        let vocab = Vocabulary::default();
        for v in ["", " ", "nan", "NO", "False", "not done", "لم تتم", "X", "-", "0"] {
            assert!(!vocab.is_done_value(v), "{v:?} should not count as done");
        }
        for v in ["done", "yes", "1", "2024-01-01", "تمت"] {
            assert!(vocab.is_done_value(v), "{v:?} should count as done");
        }
    }

    #[test]
    fn toml_overrides_only_given_lists() {
        let vocab = Vocabulary::from_toml(
            r#"
serviced_by = ["Fitter"]
negative_values = ["pending", ""]
"#,
        )
        .unwrap();
        assert_eq!(vocab.serviced_by_probes(), ["Fitter".to_string()]);
        assert_eq!(vocab.reserved_role("fitter"), Some(ColumnRole::ServicedBy));
        assert_eq!(vocab.reserved_role("Servised by"), None);
        assert!(!vocab.is_done_value("Pending"));
        assert!(vocab.is_done_value("no"));
        // untouched lists keep defaults
        assert_eq!(vocab.reserved_role("Date"), Some(ColumnRole::Date));
    }

    #[test]
    fn blank_cells_stay_not_done_with_custom_negatives() {
        let vocab = Vocabulary::from_toml(r#"negative_values = ["pending"]"#).unwrap();
        assert!(!vocab.is_done_value(""));
        assert!(!vocab.is_done_value("   "));
        assert!(!vocab.is_done_value("PENDING"));
        assert!(vocab.is_done_value("done"));

        use crate::model::{CellValue, HistoryRecord, ServiceBand};
        let band = ServiceBand::new(0.0, 100.0, "Oil + Filter");
        let record = HistoryRecord::from_pairs([
            ("Min_Tones", CellValue::Number(0.0)),
            ("Max_Tones", CellValue::Number(100.0)),
            ("Oil", CellValue::text("done")),
            ("Filter", CellValue::Empty),
        ]);
        let rows = crate::engine::reconcile("1", &[band], &[record], &vocab);
        assert_eq!(rows[0].service_done, "Oil");
        assert_eq!(rows[0].service_not_done, "Filter");
    }

    #[test]
    fn empty_required_list_is_rejected() {
        let err = Vocabulary::from_toml("min_tons = []").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("min_tons"));
    }

    #[test]
    fn conflicting_spelling_is_rejected() {
        let err = Vocabulary::from_toml(r#"event = ["Date"]"#).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = Vocabulary::from_toml("serviced_by = 3").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
