//! `millcard status`, `millcard bands`, `millcard validate`.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use millcard_recon::normalize::format_tons;
use millcard_recon::{evaluate, select_bands, ServiceBand, ServiceSource, ServiceStatusRow, ViewSelection};

use crate::exit_codes::{EXIT_ERROR, EXIT_NO_BANDS, EXIT_OUTSTANDING};
use crate::{CliError, Context};

pub struct StatusArgs {
    pub card: String,
    pub tons: f64,
    pub view: ViewSelection,
    pub outstanding_only: bool,
    pub fail_on_outstanding: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

pub fn cmd_status(ctx: &Context, args: StatusArgs) -> Result<(), CliError> {
    if !args.tons.is_finite() || args.tons < 0.0 {
        return Err(CliError::args(format!("--tons must be a non-negative number, got {}", args.tons)));
    }

    let source = ctx.source()?;
    let vocabulary = ctx.settings.vocabulary().map_err(CliError::config)?;
    let mut report = evaluate(source.service(), &args.card, args.tons, &args.view, &vocabulary)
        .map_err(CliError::recon)?;
    info!(card = %args.card, rows = report.rows.len(), source = %source.describe(), "status evaluated");

    if args.outstanding_only {
        report.rows.retain(|row| row.outstanding > 0);
    }

    if let Some(ref path) = args.output {
        millcard_io::export_status(&report.rows, path).map_err(CliError::io)?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        print_rows(&report.rows);
    }

    let s = &report.summary;
    eprintln!(
        "card {} at {} t ({}): {} band(s), {} row(s), {} complete, {} outstanding item(s)",
        report.meta.card_number,
        format_tons(report.meta.usage_tons),
        report.meta.view,
        s.bands_selected,
        s.rows,
        s.rows_complete,
        s.outstanding_items,
    );

    if report.is_empty_selection() {
        return Err(CliError::new(
            EXIT_NO_BANDS,
            format!("no plan band matches view '{}' at {} t", args.view, format_tons(args.tons)),
        )
        .with_hint("try --view all to list every band"));
    }
    if args.fail_on_outstanding && s.outstanding_items > 0 {
        return Err(CliError::new(
            EXIT_OUTSTANDING,
            format!("{} service(s) outstanding", s.outstanding_items),
        ));
    }
    Ok(())
}

pub fn cmd_bands(ctx: &Context, tons: Option<f64>, view: Option<ViewSelection>, json: bool) -> Result<(), CliError> {
    let source = ctx.source()?;
    let plan = source.service().plan().map_err(CliError::recon)?;
    let bands = match view {
        Some(view) => select_bands(&plan, tons.unwrap_or(0.0), &view),
        None => plan,
    };

    if json {
        #[derive(Serialize)]
        struct BandOut<'a> {
            min_tons: f64,
            max_tons: f64,
            required_services: Vec<String>,
            required_raw: &'a str,
        }
        let out: Vec<BandOut> = bands
            .iter()
            .map(|b| BandOut {
                min_tons: b.min_tons,
                max_tons: b.max_tons,
                required_services: b.required_services(),
                required_raw: &b.required_raw,
            })
            .collect();
        println!("{}", to_json(&out)?);
    } else {
        print_bands(&bands);
    }

    if bands.is_empty() {
        return Err(CliError::new(EXIT_NO_BANDS, "no plan band matches the requested view"));
    }
    Ok(())
}

pub fn cmd_validate(ctx: &Context) -> Result<(), CliError> {
    let vocabulary = ctx.settings.vocabulary().map_err(CliError::config)?;
    let source = ctx.source()?;
    let plan = source.service().plan().map_err(CliError::recon)?;
    let cards = source.card_ids().map_err(CliError::recon)?;

    let empty = plan.iter().filter(|b| b.required_services().is_empty()).count();
    eprintln!(
        "valid: {} with {} band(s) ({} without services), {} card(s), {} reserved column spelling(s)",
        source.describe(),
        plan.len(),
        empty,
        cards.len(),
        vocabulary.reserved_len(),
    );
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))
}

/// Pad to a display width counted in chars.
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        println!("{}", padded.join("  ").trim_end());
    };
    line(headers.iter().map(|h| h.to_string()).collect());
    line(widths.iter().map(|w| "-".repeat(*w)).collect());
    for row in rows {
        line(row.clone());
    }
}

fn print_rows(rows: &[ServiceStatusRow]) {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                format_tons(r.min_tons),
                format_tons(r.max_tons),
                r.service_needed.clone(),
                r.service_done.clone(),
                r.service_not_done.clone(),
                r.serviced_by.clone(),
                r.date.clone(),
            ]
        })
        .collect();
    print_table(&["Min", "Max", "Needed", "Done", "Not done", "By", "Date"], &cells);
}

fn print_bands(bands: &[ServiceBand]) {
    let cells: Vec<Vec<String>> = bands
        .iter()
        .map(|b| {
            vec![
                format_tons(b.min_tons),
                format_tons(b.max_tons),
                b.required_services().join(" + "),
            ]
        })
        .collect();
    print_table(&["Min", "Max", "Services"], &cells);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_counts_chars() {
        assert_eq!(pad("زيت", 5), "زيت  ");
        assert_eq!(pad("oil", 2), "oil");
    }
}
