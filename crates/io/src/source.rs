// ServiceSource implementations over a workbook file or a CSV directory

use std::path::PathBuf;

use tracing::debug;

use millcard_recon::{HistoryRecord, ReconError, ServiceBand, ServiceSource, Vocabulary};

use crate::plan::bands_from_table;
use crate::table::Table;
use crate::{csv, xlsx};

pub const DEFAULT_PLAN_SHEET: &str = "ServicePlan";
pub const DEFAULT_CARD_SHEET_PATTERN: &str = "Card{card}";
pub const DEFAULT_PLAN_FILE: &str = "plan.csv";
pub const DEFAULT_CARD_FILE_PATTERN: &str = "card_{card}.csv";

/// Substitute the card id into a sheet or file name pattern.
pub fn card_name(pattern: &str, card_id: &str) -> String {
    pattern.replace("{card}", card_id.trim())
}

/// Plan and card histories stored as sheets of one workbook (xlsx, xls, xlsb, ods).
///
/// The workbook is reopened on every call so edits made between calls are seen.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    pub path: PathBuf,
    pub plan_sheet: String,
    pub card_sheet_pattern: String,
    pub vocabulary: Vocabulary,
}

impl WorkbookSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            plan_sheet: DEFAULT_PLAN_SHEET.to_string(),
            card_sheet_pattern: DEFAULT_CARD_SHEET_PATTERN.to_string(),
            vocabulary: Vocabulary::default(),
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    fn read(&self, sheet: &str) -> Result<Option<Table>, ReconError> {
        let mut book = xlsx::SheetBook::open(&self.path).map_err(ReconError::Source)?;
        book.read_sheet(sheet).map_err(ReconError::Source)
    }

    /// Card sheet names in the workbook, i.e. those produced by the pattern.
    pub fn card_ids(&self) -> Result<Vec<String>, ReconError> {
        let book = xlsx::SheetBook::open(&self.path).map_err(ReconError::Source)?;
        Ok(match_pattern(&self.card_sheet_pattern, book.sheet_names()))
    }
}

impl ServiceSource for WorkbookSource {
    fn plan(&self) -> Result<Vec<ServiceBand>, ReconError> {
        let table = self
            .read(&self.plan_sheet)?
            .ok_or_else(|| ReconError::not_found(format!("service plan sheet '{}'", self.plan_sheet)))?;
        bands_from_table(&table, &self.vocabulary)
    }

    fn history(&self, card_id: &str) -> Result<Vec<HistoryRecord>, ReconError> {
        let sheet = card_name(&self.card_sheet_pattern, card_id);
        let table = self
            .read(&sheet)?
            .ok_or_else(|| ReconError::not_found(format!("history for card {} (sheet '{}')", card_id, sheet)))?;
        debug!(card = card_id, sheet = %table.name, records = table.rows.len(), "history loaded");
        Ok(table.records())
    }
}

/// Plan and card histories exported as one CSV file each.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    pub dir: PathBuf,
    pub plan_file: String,
    pub card_file_pattern: String,
    pub vocabulary: Vocabulary,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            plan_file: DEFAULT_PLAN_FILE.to_string(),
            card_file_pattern: DEFAULT_CARD_FILE_PATTERN.to_string(),
            vocabulary: Vocabulary::default(),
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    fn read(&self, file: &str) -> Result<Option<Table>, ReconError> {
        let path = self.dir.join(file);
        if !path.is_file() {
            return Ok(None);
        }
        csv::import(&path)
            .map(Some)
            .map_err(|e| ReconError::Source(format!("{}: {}", path.display(), e)))
    }

    pub fn card_ids(&self) -> Result<Vec<String>, ReconError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| ReconError::Source(format!("{}: {}", self.dir.display(), e)))?;
        let names = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        Ok(match_pattern(&self.card_file_pattern, names))
    }
}

impl ServiceSource for CsvDirSource {
    fn plan(&self) -> Result<Vec<ServiceBand>, ReconError> {
        let table = self
            .read(&self.plan_file)?
            .ok_or_else(|| ReconError::not_found(format!("service plan file '{}'", self.plan_file)))?;
        bands_from_table(&table, &self.vocabulary)
    }

    fn history(&self, card_id: &str) -> Result<Vec<HistoryRecord>, ReconError> {
        let file = card_name(&self.card_file_pattern, card_id);
        let table = self
            .read(&file)?
            .ok_or_else(|| ReconError::not_found(format!("history for card {} (file '{}')", card_id, file)))?;
        debug!(card = card_id, file = %file, records = table.rows.len(), "history loaded");
        Ok(table.records())
    }
}

/// Card ids for names matching `prefix{card}suffix`, sorted.
fn match_pattern(pattern: &str, names: Vec<String>) -> Vec<String> {
    let Some((prefix, suffix)) = pattern.split_once("{card}") else {
        return Vec::new();
    };
    let mut ids: Vec<String> = names
        .iter()
        .filter_map(|name| name.strip_prefix(prefix)?.strip_suffix(suffix))
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect();
    ids.sort();
    ids
}
