use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::ServiceBand;
use crate::normalize::format_tons;

/// Which plan bands to evaluate relative to the machine's current usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewSelection {
    /// Bands containing the usage value.
    #[default]
    Current,
    /// Bands that end at or below the usage value.
    AllLower,
    /// Bands that start at or above the usage value.
    AllHigher,
    /// Bands lying entirely inside `[min, max]`. Not validated: `min > max`
    /// simply selects nothing.
    CustomRange { min: f64, max: f64 },
    All,
}

impl ViewSelection {
    pub fn includes(&self, band: &ServiceBand, usage: f64) -> bool {
        match *self {
            Self::Current => band.min_tons <= usage && usage <= band.max_tons,
            Self::AllLower => band.max_tons <= usage,
            Self::AllHigher => band.min_tons >= usage,
            Self::CustomRange { min, max } => band.min_tons >= min && band.max_tons <= max,
            Self::All => true,
        }
    }
}

impl fmt::Display for ViewSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::AllLower => write!(f, "lower"),
            Self::AllHigher => write!(f, "higher"),
            Self::CustomRange { min, max } => {
                write!(f, "range:{}..{}", format_tons(*min), format_tons(*max))
            }
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for ViewSelection {
    type Err = String;

    /// Accepts `current`, `lower`, `higher`, `all` and `range:MIN..MAX`.
    /// The older `range:MIN-MAX` form is still read.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "current" => return Ok(Self::Current),
            "lower" | "all-lower" | "all_lower" => return Ok(Self::AllLower),
            "higher" | "all-higher" | "all_higher" => return Ok(Self::AllHigher),
            "all" => return Ok(Self::All),
            _ => {}
        }

        let bounds = s
            .strip_prefix("range:")
            .ok_or_else(|| format!("unknown view {s:?} (expected current, lower, higher, all or range:MIN..MAX)"))?;
        let (min, max) = split_range(bounds)
            .ok_or_else(|| format!("range {bounds:?} must look like MIN..MAX"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("range bound {v:?} is not a number"))
        };
        Ok(Self::CustomRange {
            min: parse(min)?,
            max: parse(max)?,
        })
    }
}

/// Split `MIN..MAX`, or `MIN-MAX` on the first dash that follows a digit so
/// negative bounds survive.
fn split_range(bounds: &str) -> Option<(&str, &str)> {
    if let Some(pair) = bounds.split_once("..") {
        return Some(pair);
    }
    let bytes = bounds.as_bytes();
    (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && (bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.'))
        .map(|i| (&bounds[..i], &bounds[i + 1..]))
}

/// Bands of `plan` selected by `view` for a machine at `usage` tons, in plan order.
pub fn select_bands(plan: &[ServiceBand], usage: f64, view: &ViewSelection) -> Vec<ServiceBand> {
    plan.iter()
        .filter(|band| view.includes(band, usage))
        .cloned()
        .collect()
}
