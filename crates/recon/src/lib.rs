//! `millcard-recon`: machine service-status reconciliation engine.
//!
//! Pure engine crate: receives a plan and a history snapshot, returns one
//! status row per band and matching service event.
//! No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod select;
pub mod source;
pub mod summary;

pub use config::{Vocabulary, VocabularyConfig};
pub use engine::{evaluate, reconcile};
pub use error::ReconError;
pub use model::{
    CellValue, HistoryRecord, ServiceBand, ServiceStatusRow, StatusOutcome, StatusReport,
};
pub use normalize::{normalize, parse_required, parse_tons_or_zero};
pub use select::{select_bands, ViewSelection};
pub use source::{MemorySource, ServiceSource};
