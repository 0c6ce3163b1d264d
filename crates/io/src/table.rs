// Header + rows view of one sheet or CSV file

use millcard_recon::normalize::normalize;
use millcard_recon::{CellValue, HistoryRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build from raw rows, the first of which is the header row.
    /// Fully blank data rows are dropped.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        if rows.is_empty() {
            return Self { name: name.into(), ..Self::default() };
        }
        let headers = rows.remove(0).iter().map(|c| c.as_text().trim().to_string()).collect();
        rows.retain(|row| row.iter().any(|c| !c.is_blank()));
        Self { name: name.into(), headers, rows }
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    /// Index of the first header whose normalized name matches any of `names`.
    pub fn find_column<S: AsRef<str>>(&self, names: &[S]) -> Option<usize> {
        let wanted: Vec<String> = names.iter().map(|n| normalize(n.as_ref())).collect();
        self.headers
            .iter()
            .position(|h| wanted.contains(&normalize(h)))
    }

    /// One history record per data row, keyed by header.
    pub fn records(&self) -> Vec<HistoryRecord> {
        (0..self.rows.len())
            .map(|r| {
                let mut record = HistoryRecord::new();
                for (c, header) in self.headers.iter().enumerate() {
                    record.push(header.clone(), self.cell(r, c).clone());
                }
                record
            })
            .collect()
    }
}
