// Status rows and bale statistics written out as CSV or xlsx

use std::path::{Path, PathBuf};

use millcard_press::{BaleRecord, BaleTypeStats};
use millcard_recon::normalize::format_tons;
use millcard_recon::ServiceStatusRow;

use crate::bales::LOG_HEADERS;
use crate::xlsx::{OutCell, SheetOut};
use crate::{csv, xlsx};

pub const STATUS_HEADERS: [&str; 12] = [
    "Card Number",
    "Min_Tons",
    "Max_Tons",
    "Service Needed",
    "Service Done",
    "Service Didn't Done",
    "Tones",
    "Event",
    "Correction",
    "Serviced By",
    "Date",
    "Other",
];

pub const STATS_HEADERS: [&str; 5] = ["نوع البالة", "عدد البالات", "إجمالي الوزن", "متوسط الوزن", "المشرف"];

pub const STATS_SHEET: &str = "الإحصائيات";
pub const DETAILS_SHEET: &str = "البيانات_التفصيلية";

/// Output format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

fn status_cells(row: &ServiceStatusRow) -> Vec<OutCell> {
    vec![
        OutCell::Text(row.card_number.clone()),
        OutCell::Number(row.min_tons),
        OutCell::Number(row.max_tons),
        OutCell::Text(row.service_needed.clone()),
        OutCell::Text(row.service_done.clone()),
        OutCell::Text(row.service_not_done.clone()),
        OutCell::Text(row.tons_at_event.clone()),
        OutCell::Text(row.event.clone()),
        OutCell::Text(row.correction.clone()),
        OutCell::Text(row.serviced_by.clone()),
        OutCell::Text(row.date.clone()),
        OutCell::Text(row.other_note.clone()),
    ]
}

fn stats_cells(stats: &BaleTypeStats) -> Vec<OutCell> {
    vec![
        OutCell::Text(stats.bale_type.clone()),
        OutCell::Number(stats.count as f64),
        OutCell::Number(stats.total_weight),
        OutCell::Number(stats.mean_weight),
        OutCell::Text(stats.supervisor.clone()),
    ]
}

fn detail_cells(record: &BaleRecord) -> Vec<OutCell> {
    vec![
        OutCell::Text(record.date.format("%Y-%m-%d").to_string()),
        OutCell::Text(record.time.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default()),
        OutCell::Text(record.shift.clone()),
        OutCell::Text(record.supervisor.clone()),
        OutCell::Text(record.bale_type.clone()),
        match record.weight {
            Some(w) => OutCell::Number(w),
            None => OutCell::Text(String::new()),
        },
        OutCell::Text(record.notes.clone()),
    ]
}

fn as_strings(rows: Vec<Vec<OutCell>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    OutCell::Text(s) => s,
                    OutCell::Number(n) => format_tons(n),
                })
                .collect()
        })
        .collect()
}

pub fn export_csv(rows: &[ServiceStatusRow], path: &Path) -> Result<(), String> {
    let cells = rows.iter().map(status_cells).collect();
    csv::export(path, &STATUS_HEADERS, &as_strings(cells))
}

pub fn export_xlsx(rows: &[ServiceStatusRow], path: &Path) -> Result<(), String> {
    let cells: Vec<_> = rows.iter().map(status_cells).collect();
    xlsx::export(path, "Service Status", &STATUS_HEADERS, &cells)
}

/// Write status rows in the format named by the path's extension.
pub fn export_status(rows: &[ServiceStatusRow], path: &Path) -> Result<(), String> {
    match ExportFormat::from_path(path) {
        Some(ExportFormat::Csv) => export_csv(rows, path),
        Some(ExportFormat::Xlsx) => export_xlsx(rows, path),
        None => Err(format!("{}: expected a .csv or .xlsx file", path.display())),
    }
}

/// Companion file for the detail rows of a CSV statistics export:
/// `report.csv` gets `report_details.csv` next to it.
pub fn details_csv_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_details.csv"))
}

/// Write per-type statistics and the bale rows behind them. An xlsx file
/// gets both as sheets; a CSV export is split into two files. Returns the
/// paths written.
pub fn export_stats(stats: &[BaleTypeStats], details: &[&BaleRecord], path: &Path) -> Result<Vec<PathBuf>, String> {
    let stat_rows: Vec<_> = stats.iter().map(stats_cells).collect();
    let detail_rows: Vec<_> = details.iter().map(|r| detail_cells(r)).collect();
    match ExportFormat::from_path(path) {
        Some(ExportFormat::Csv) => {
            let details_path = details_csv_path(path);
            csv::export(path, &STATS_HEADERS, &as_strings(stat_rows))?;
            csv::export(&details_path, &LOG_HEADERS, &as_strings(detail_rows))?;
            Ok(vec![path.to_path_buf(), details_path])
        }
        Some(ExportFormat::Xlsx) => {
            xlsx::export_sheets(
                path,
                &[
                    SheetOut { name: STATS_SHEET, headers: &STATS_HEADERS, rows: &stat_rows },
                    SheetOut { name: DETAILS_SHEET, headers: &LOG_HEADERS, rows: &detail_rows },
                ],
            )?;
            Ok(vec![path.to_path_buf()])
        }
        None => Err(format!("{}: expected a .csv or .xlsx file", path.display())),
    }
}
