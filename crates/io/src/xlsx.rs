// Excel/ODS sheet import (xlsx, xls, xlsb, ods) and xlsx export
//
// Import reads one sheet at a time into a Table. Export writes header + rows
// sheets; it is a snapshot for sharing, not a round-trip format.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use millcard_recon::normalize::normalize;
use millcard_recon::CellValue;

use crate::table::Table;

/// An opened workbook. Sheets are read lazily by name.
pub struct SheetBook {
    sheets: Sheets<std::io::BufReader<std::fs::File>>,
}

impl SheetBook {
    pub fn open(path: &Path) -> Result<Self, String> {
        let sheets = open_workbook_auto(path)
            .map_err(|e| format!("Failed to open Excel file: {}", e))?;
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names().to_vec()
    }

    /// Exact sheet name first, then the first sheet whose normalized name matches.
    pub fn resolve_sheet(&self, wanted: &str) -> Option<String> {
        let names = self.sheet_names();
        if let Some(exact) = names.iter().find(|n| n.as_str() == wanted) {
            return Some(exact.clone());
        }
        let key = normalize(wanted);
        names.into_iter().find(|n| normalize(n) == key)
    }

    /// Read a sheet. `Ok(None)` when no sheet resolves to `wanted`.
    pub fn read_sheet(&mut self, wanted: &str) -> Result<Option<Table>, String> {
        let Some(name) = self.resolve_sheet(wanted) else {
            return Ok(None);
        };
        let range = self
            .sheets
            .worksheet_range(&name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", name, e))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(data_to_cell).collect())
            .collect();
        Ok(Some(Table::from_rows(name, rows)))
    }
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => CellValue::text(serial_to_text(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
        // #N/A, #REF! and friends carry no service evidence
        Data::Error(_) => CellValue::Empty,
    }
}

/// Excel serial date (1900 system) as `YYYY-MM-DD`, with the time appended
/// when the serial has a fractional part.
fn serial_to_text(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return serial.to_string();
    };
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    let Some(stamp) = epoch
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(Duration::days(days) + Duration::seconds(seconds)))
    else {
        return serial.to_string();
    };
    if seconds == 0 {
        stamp.date().format("%Y-%m-%d").to_string()
    } else {
        stamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// A cell to write. Numbers stay numeric in the exported sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum OutCell {
    Text(String),
    Number(f64),
}

/// One sheet to write: a bold header row followed by `rows`.
pub struct SheetOut<'a> {
    pub name: &'a str,
    pub headers: &'a [&'a str],
    pub rows: &'a [Vec<OutCell>],
}

/// Write one sheet with a bold header row.
pub fn export(path: &Path, sheet_name: &str, headers: &[&str], rows: &[Vec<OutCell>]) -> Result<(), String> {
    export_sheets(path, &[SheetOut { name: sheet_name, headers, rows }])
}

/// Write several sheets, in order, into one workbook.
pub fn export_sheets(path: &Path, sheets: &[SheetOut<'_>]) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet.name)
            .map_err(|e| format!("Invalid sheet name '{}': {}", sheet.name, e))?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &bold)
                .map_err(|e| e.to_string())?;
        }

        for (r, row) in sheet.rows.iter().enumerate() {
            let xl_row = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let result = match cell {
                    OutCell::Text(s) => worksheet.write_string(xl_row, col as u16, s.as_str()),
                    OutCell::Number(n) => worksheet.write_number(xl_row, col as u16, *n),
                };
                result.map_err(|e| e.to_string())?;
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to write Excel file: {}", e))
}
