//! `millcard-press`: cotton-press bale log.
//!
//! Shift resolution for new log entries and per-bale-type statistics over a
//! date window. Pure: records come in already loaded.

pub mod record;
pub mod shift;
pub mod stats;

pub use record::{new_record, BaleRecord};
pub use shift::{ShiftTable, ShiftWindow};
pub use stats::{in_window, statistics, BaleTypeStats};

/// Supervisors offered when logging a bale, unless configured otherwise.
pub const DEFAULT_SUPERVISORS: &[&str] = &["انسT.A", "عبدالحميدT.B", "محمود فتحيT.C", "احمد عبالعزيزT.D"];

/// Bale types offered when logging a bale, unless configured otherwise.
pub const DEFAULT_BALE_TYPES: &[&str] = &[
    "قماش",
    "تراب",
    "هبوه دست",
    "اسطبات تدویر",
    "برم",
    "برم انفاق",
    "بلاستيك",
    "هبوه تنظيف",
    "انفاق",
    "شرق الغزل",
    "تمشيط غير مغلف",
    "تمشيط مغلف",
    "مكس",
    "كرد",
    "قطن خام",
    "ملح",
];
