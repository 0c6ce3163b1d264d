use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::shift::ShiftTable;

/// One logged bale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaleRecord {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub shift: String,
    pub supervisor: String,
    pub bale_type: String,
    /// `None` when the log cell is blank or unreadable.
    pub weight: Option<f64>,
    pub notes: String,
}

/// A new log entry stamped with the date, time and shift of `now`.
pub fn new_record(
    now: NaiveDateTime,
    supervisor: &str,
    bale_type: &str,
    weight: f64,
    notes: &str,
    shifts: &ShiftTable,
) -> BaleRecord {
    BaleRecord {
        date: now.date(),
        time: Some(now.time()),
        shift: shifts.shift_at(now.time()).to_string(),
        supervisor: supervisor.to_string(),
        bale_type: bale_type.to_string(),
        weight: Some(weight),
        notes: notes.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_stamps_shift() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        let rec = new_record(now, "انسT.A", "قطن خام", 212.5, "", &ShiftTable::default());
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(rec.time, NaiveTime::from_hms_opt(17, 30, 0));
        assert_eq!(rec.shift, "ثاني");
        assert_eq!(rec.weight, Some(212.5));
    }
}
