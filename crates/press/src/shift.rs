use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A named `[start, end)` hour window of the working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

impl ShiftWindow {
    pub fn new(name: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }
}

/// Shift windows checked in order, with a fallback for hours none of them cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTable {
    pub windows: Vec<ShiftWindow>,
    pub fallback: String,
}

impl Default for ShiftTable {
    fn default() -> Self {
        Self {
            windows: vec![
                ShiftWindow::new("أول", 8, 16),
                ShiftWindow::new("ثاني", 16, 24),
                ShiftWindow::new("ثالث", 0, 8),
            ],
            fallback: "ثالث".into(),
        }
    }
}

impl ShiftTable {
    pub fn new(windows: Vec<ShiftWindow>, fallback: impl Into<String>) -> Self {
        Self {
            windows,
            fallback: fallback.into(),
        }
    }

    pub fn shift_for_hour(&self, hour: u32) -> &str {
        self.windows
            .iter()
            .find(|w| w.contains(hour))
            .map(|w| w.name.as_str())
            .unwrap_or(&self.fallback)
    }

    pub fn shift_at(&self, time: NaiveTime) -> &str {
        self.shift_for_hour(time.hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shift_boundaries() {
        let table = ShiftTable::default();
        assert_eq!(table.shift_for_hour(8), "أول");
        assert_eq!(table.shift_for_hour(15), "أول");
        assert_eq!(table.shift_for_hour(16), "ثاني");
        assert_eq!(table.shift_for_hour(23), "ثاني");
        assert_eq!(table.shift_for_hour(0), "ثالث");
        assert_eq!(table.shift_for_hour(7), "ثالث");
    }

    #[test]
    fn uncovered_hour_uses_fallback() {
        let table = ShiftTable::new(vec![ShiftWindow::new("day", 6, 18)], "night");
        assert_eq!(table.shift_for_hour(12), "day");
        assert_eq!(table.shift_for_hour(18), "night");
        assert_eq!(table.shift_for_hour(2), "night");
    }

    #[test]
    fn shift_at_time() {
        let table = ShiftTable::default();
        let t = NaiveTime::from_hms_opt(16, 0, 1).unwrap();
        assert_eq!(table.shift_at(t), "ثاني");
    }
}
