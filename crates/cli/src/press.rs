//! `millcard press`: cotton-press bale log commands.

use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Subcommand;
use serde::Serialize;

use millcard_io::bales::{self, BaleLogError};
use millcard_press::{in_window, new_record, statistics, BaleRecord, BaleTypeStats};

use crate::exit_codes::{EXIT_ERROR, EXIT_NOT_FOUND, EXIT_SOURCE};
use crate::{CliError, Context};

#[derive(Subcommand)]
pub enum PressCommands {
    /// Per-bale-type counts and weights over a date range
    #[command(after_help = "\
Examples:
  millcard press stats
  millcard press stats --from 2025-03-01 --to 2025-03-31 --json
  millcard press stats --log bales.xlsx --output report.xlsx")]
    Stats {
        /// First day (default: seven days before --to)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day, inclusive (default: today)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Bale log (.csv or workbook); overrides press.log in settings
        #[arg(long)]
        log: Option<PathBuf>,

        #[arg(long)]
        json: bool,

        /// Also write the statistics and bale rows to a .csv or .xlsx file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Shift name for a time of day (default: now)
    Shift {
        /// HH:MM or HH:MM:SS
        #[arg(long, value_parser = parse_clock)]
        at: Option<NaiveTime>,
    },

    /// Append a bale to a CSV log, stamped with the current date, time and shift
    #[command(after_help = "\
Examples:
  millcard press add --supervisor 'انسT.A' --type 'قطن خام' --weight 212.5")]
    Add {
        #[arg(long)]
        supervisor: String,

        /// Bale type
        #[arg(long = "type")]
        bale_type: String,

        /// Bale weight in kg
        #[arg(long)]
        weight: f64,

        #[arg(long, default_value = "")]
        notes: String,

        /// Bale log (.csv); overrides press.log in settings
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

pub fn cmd_press(ctx: &Context, cmd: PressCommands) -> Result<(), CliError> {
    match cmd {
        PressCommands::Stats { from, to, log, json, output } => cmd_stats(ctx, from, to, log, json, output),
        PressCommands::Shift { at } => cmd_shift(ctx, at),
        PressCommands::Add { supervisor, bale_type, weight, notes, log } => {
            cmd_add(ctx, &supervisor, &bale_type, weight, &notes, log)
        }
    }
}

fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s.trim(), fmt).ok())
        .ok_or_else(|| format!("{s:?} is not a time of day (HH:MM)"))
}

fn log_path(ctx: &Context, explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    explicit.or_else(|| ctx.settings.press_log()).ok_or_else(|| {
        CliError::args("no bale log configured").with_hint("pass --log or set press.log in settings.toml")
    })
}

fn log_err(err: BaleLogError) -> CliError {
    let code = match err {
        BaleLogError::Missing(_) => EXIT_NOT_FOUND,
        BaleLogError::Read(_) | BaleLogError::Write(_) => EXIT_SOURCE,
    };
    CliError::new(code, err.to_string())
}

/// Days covered when `--from` is not given.
const DEFAULT_WINDOW_DAYS: i64 = 7;

fn stats_window(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let to = to.unwrap_or(today);
    let from = from.unwrap_or(to - Duration::days(DEFAULT_WINDOW_DAYS));
    (from, to)
}

#[derive(Serialize)]
struct StatsReport<'a> {
    from: NaiveDate,
    to: NaiveDate,
    total_bales: usize,
    total_weight: f64,
    by_type: Vec<BaleTypeStats>,
    /// Every logged bale in the window, weighed or not.
    details: Vec<&'a BaleRecord>,
}

fn cmd_stats(
    ctx: &Context,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    log: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let (from, to) = stats_window(from, to, Local::now().date_naive());
    if from > to {
        return Err(CliError::args(format!("--from {from} is after --to {to}")));
    }

    let path = log_path(ctx, log)?;
    let records = bales::load(&path, ctx.settings.press.sheet.as_deref()).map_err(log_err)?;
    let by_type = statistics(&records, from, to);

    let report = StatsReport {
        from,
        to,
        total_bales: by_type.iter().map(|s| s.count).sum(),
        total_weight: by_type.iter().map(|s| s.total_weight).sum(),
        by_type,
        details: in_window(&records, from, to),
    };

    if let Some(ref out) = output {
        let written = millcard_io::export_stats(&report.by_type, &report.details, out).map_err(CliError::io)?;
        for path in written {
            eprintln!("wrote {}", path.display());
        }
    }

    if json {
        let s = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{s}");
    } else if report.details.is_empty() {
        println!("no bales logged between {from} and {to}");
    } else {
        for s in &report.by_type {
            println!(
                "{}\t{} bale(s)\t{:.2} kg total\t{:.2} kg mean\t{}",
                s.bale_type, s.count, s.total_weight, s.mean_weight, s.supervisor
            );
        }
        if report.total_bales > 0 {
            println!(
                "total\t{} bale(s)\t{:.1} kg\t{:.1} kg per bale",
                report.total_bales,
                report.total_weight,
                report.total_weight / report.total_bales as f64
            );
        }
        println!();
        for r in &report.details {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.date,
                r.time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
                r.shift,
                r.supervisor,
                r.bale_type,
                r.weight.map(|w| format!("{w} kg")).unwrap_or_else(|| "-".into()),
                r.notes
            );
        }
    }
    Ok(())
}

fn cmd_shift(ctx: &Context, at: Option<NaiveTime>) -> Result<(), CliError> {
    let time = at.unwrap_or_else(|| Local::now().time());
    let table = ctx.settings.press.shift_table();
    println!("{}", table.shift_at(time));
    Ok(())
}

fn cmd_add(
    ctx: &Context,
    supervisor: &str,
    bale_type: &str,
    weight: f64,
    notes: &str,
    log: Option<PathBuf>,
) -> Result<(), CliError> {
    let press = &ctx.settings.press;
    if !press.supervisors.iter().any(|s| s == supervisor) {
        return Err(CliError::args(format!("unknown supervisor '{supervisor}'"))
            .with_hint(format!("one of: {}", press.supervisors.join(", "))));
    }
    if !press.bale_types.iter().any(|t| t == bale_type) {
        return Err(CliError::args(format!("unknown bale type '{bale_type}'"))
            .with_hint(format!("one of: {}", press.bale_types.join(", "))));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(CliError::args(format!("--weight must be positive, got {weight}")));
    }

    let path = log_path(ctx, log)?;
    let record = new_record(Local::now().naive_local(), supervisor, bale_type, weight, notes, &press.shift_table());
    bales::append_csv(&path, &record).map_err(log_err)?;
    eprintln!(
        "logged {} kg {} ({} shift) to {}",
        weight,
        record.bale_type,
        record.shift,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats() {
        assert_eq!(parse_clock("08:00"), Ok(NaiveTime::from_hms_opt(8, 0, 0).unwrap()));
        assert_eq!(parse_clock("23:59:30"), Ok(NaiveTime::from_hms_opt(23, 59, 30).unwrap()));
        assert!(parse_clock("8am").is_err());
    }

    #[test]
    fn stats_window_defaults_to_last_week() {
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        assert_eq!(stats_window(None, None, d(3, 10)), (d(3, 3), d(3, 10)));
        assert_eq!(stats_window(None, Some(d(3, 5)), d(3, 10)), (d(2, 26), d(3, 5)));
        assert_eq!(stats_window(Some(d(3, 1)), None, d(3, 10)), (d(3, 1), d(3, 10)));
        assert_eq!(stats_window(Some(d(3, 1)), Some(d(3, 2)), d(3, 10)), (d(3, 1), d(3, 2)));
    }
}
