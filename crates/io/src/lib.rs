//! `millcard-io`: file access for plans, card histories and bale logs.
//!
//! Reads workbooks through calamine and CSV exports through csv, and
//! writes result tables back out as CSV or xlsx.

pub mod bales;
pub mod csv;
pub mod export;
pub mod plan;
pub mod source;
pub mod table;
pub mod xlsx;

pub use export::{export_csv, export_stats, export_status, export_xlsx, ExportFormat};
pub use source::{CsvDirSource, WorkbookSource};
pub use table::Table;
