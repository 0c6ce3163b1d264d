// Cotton-press bale log: load from CSV or a workbook sheet, append to CSV

use std::fs::OpenOptions;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use millcard_press::BaleRecord;
use millcard_recon::normalize::{metadata_text, parse_number, EMPTY_MARK};

use crate::table::Table;
use crate::{csv, xlsx};

/// Header row written when a new log is created.
pub const LOG_HEADERS: [&str; 7] = ["التاريخ", "الوقت", "الوردية", "المشرف", "نوع البالة", "وزن البالة", "ملاحظات"];

const DATE: &[&str] = &["التاريخ", "date"];
const TIME: &[&str] = &["الوقت", "time"];
const SHIFT: &[&str] = &["الوردية", "shift"];
const SUPERVISOR: &[&str] = &["المشرف", "supervisor"];
const BALE_TYPE: &[&str] = &["نوع البالة", "bale type", "bale_type", "type"];
const WEIGHT: &[&str] = &["وزن البالة", "weight", "bale weight"];
const NOTES: &[&str] = &["ملاحظات", "notes"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

#[derive(Debug)]
pub enum BaleLogError {
    Missing(String),
    Read(String),
    Write(String),
}

impl std::fmt::Display for BaleLogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(what) => write!(f, "bale log not found: {}", what),
            Self::Read(msg) => write!(f, "cannot read bale log: {}", msg),
            Self::Write(msg) => write!(f, "cannot write bale log: {}", msg),
        }
    }
}

impl std::error::Error for BaleLogError {}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false)
}

/// Load every dated row of a bale log. `sheet` picks the workbook sheet;
/// `None` reads the first one. Rows without a readable date are skipped.
pub fn load(path: &Path, sheet: Option<&str>) -> Result<Vec<BaleRecord>, BaleLogError> {
    if !path.exists() {
        return Err(BaleLogError::Missing(path.display().to_string()));
    }

    let table = if is_csv(path) {
        csv::import(path).map_err(BaleLogError::Read)?
    } else {
        let mut book = xlsx::SheetBook::open(path).map_err(BaleLogError::Read)?;
        let wanted = match sheet {
            Some(name) => name.to_string(),
            None => book
                .sheet_names()
                .into_iter()
                .next()
                .ok_or_else(|| BaleLogError::Read("workbook has no sheets".into()))?,
        };
        book.read_sheet(&wanted)
            .map_err(BaleLogError::Read)?
            .ok_or_else(|| BaleLogError::Missing(format!("sheet '{}'", wanted)))?
    };

    records_from_table(&table)
}

fn records_from_table(table: &Table) -> Result<Vec<BaleRecord>, BaleLogError> {
    let date_col = table
        .find_column(DATE)
        .ok_or_else(|| BaleLogError::Read(format!("'{}' has no date column", table.name)))?;
    let time_col = table.find_column(TIME);
    let shift_col = table.find_column(SHIFT);
    let supervisor_col = table.find_column(SUPERVISOR);
    let type_col = table
        .find_column(BALE_TYPE)
        .ok_or_else(|| BaleLogError::Read(format!("'{}' has no bale type column", table.name)))?;
    let weight_col = table.find_column(WEIGHT);
    let notes_col = table.find_column(NOTES);

    let text = |row: usize, col: Option<usize>| -> String {
        match col {
            Some(c) => {
                let s = metadata_text(table.cell(row, c));
                if s == EMPTY_MARK { String::new() } else { s }
            }
            None => String::new(),
        }
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let raw_date = table.cell(row, date_col).as_text();
        let Some(date) = parse_date(&raw_date) else {
            warn!(log = %table.name, row = row + 2, value = %raw_date, "skipping bale row without a readable date");
            continue;
        };
        records.push(BaleRecord {
            date,
            time: time_col.and_then(|c| parse_time(&table.cell(row, c).as_text())),
            shift: text(row, shift_col),
            supervisor: text(row, supervisor_col),
            bale_type: text(row, Some(type_col)),
            weight: weight_col.and_then(|c| parse_number(table.cell(row, c))),
            notes: text(row, notes_col),
        });
    }

    debug!(log = %table.name, records = records.len(), "bale log loaded");
    Ok(records)
}

/// Dates as written by spreadsheets; a trailing time part is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.split([' ', 'T']).next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Times as written by spreadsheets; a leading date part is ignored.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim().rsplit([' ', 'T']).next()?;
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// Append one record to a CSV log, writing the header row first if the file is new.
pub fn append_csv(path: &Path, record: &BaleRecord) -> Result<(), BaleLogError> {
    if !is_csv(path) {
        return Err(BaleLogError::Write(format!(
            "{}: only CSV logs can be appended to",
            path.display()
        )));
    }
    let is_new = !path.exists() || std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BaleLogError::Write(e.to_string()))?;
    let mut writer = ::csv::Writer::from_writer(file);

    if is_new {
        writer.write_record(LOG_HEADERS).map_err(|e| BaleLogError::Write(e.to_string()))?;
    }
    writer
        .write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record.time.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default(),
            record.shift.clone(),
            record.supervisor.clone(),
            record.bale_type.clone(),
            record.weight.map(|w| w.to_string()).unwrap_or_default(),
            record.notes.clone(),
        ])
        .map_err(|e| BaleLogError::Write(e.to_string()))?;
    writer.flush().map_err(|e| BaleLogError::Write(e.to_string()))
}
