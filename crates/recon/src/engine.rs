use std::collections::HashSet;

use tracing::debug;

use crate::classify::ColumnClassifier;
use crate::config::Vocabulary;
use crate::error::ReconError;
use crate::model::{
    HistoryRecord, ServiceBand, ServiceEvent, ServiceStatusRow, StatusMeta, StatusOutcome,
    StatusReport,
};
use crate::normalize::{join_or_mark, normalize, EMPTY_MARK};
use crate::select::{select_bands, ViewSelection};
use crate::source::ServiceSource;
use crate::summary::compute_summary;

/// Separator for the plan-ordered "needed" list.
pub const NEEDED_SEP: &str = " + ";
/// Separator for the done / not-done lists of an event row.
pub const LIST_SEP: &str = ", ";

/// Load plan and history for `card_id`, select bands for `usage` and
/// reconcile them.
///
/// A missing plan or history is an error. A selection with no bands is not:
/// the report comes back with [`StatusOutcome::NoMatchingBands`] and no rows.
pub fn evaluate<S: ServiceSource + ?Sized>(
    source: &S,
    card_id: &str,
    usage: f64,
    view: &ViewSelection,
    vocabulary: &Vocabulary,
) -> Result<StatusReport, ReconError> {
    let plan = source.plan()?;
    let history = source.history(card_id)?;
    let bands = select_bands(&plan, usage, view);

    let meta = StatusMeta {
        card_number: card_id.to_string(),
        usage_tons: usage,
        view: view.to_string(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if bands.is_empty() {
        debug!(card = card_id, usage, %view, plan_bands = plan.len(), "no bands selected");
        return Ok(StatusReport {
            meta,
            outcome: StatusOutcome::NoMatchingBands,
            summary: compute_summary(&[], &[]),
            rows: Vec::new(),
        });
    }

    let rows = reconcile(card_id, &bands, &history, vocabulary);
    let summary = compute_summary(&bands, &rows);

    Ok(StatusReport {
        meta,
        outcome: StatusOutcome::Evaluated,
        summary,
        rows,
    })
}

/// Reconcile each band against the history records overlapping it.
///
/// A band yields one row per overlapping record, in history order, or a
/// single row with no service evidence when nothing overlaps it.
pub fn reconcile(
    card_id: &str,
    bands: &[ServiceBand],
    history: &[HistoryRecord],
    vocabulary: &Vocabulary,
) -> Vec<ServiceStatusRow> {
    let classifier = ColumnClassifier::build(history, vocabulary);
    let events: Vec<ServiceEvent> = history.iter().map(|r| classifier.event(r)).collect();

    let mut rows = Vec::new();
    for band in bands {
        let required = band.required_services();
        let required_norm: Vec<String> = required.iter().map(|p| normalize(p)).collect();

        let matching: Vec<&ServiceEvent> = events
            .iter()
            .filter(|e| band.overlaps(e.min_tons, e.max_tons))
            .collect();

        debug!(
            card = card_id,
            min = band.min_tons,
            max = band.max_tons,
            required = required.len(),
            events = matching.len(),
            "reconciling band"
        );

        if matching.is_empty() {
            rows.push(unserviced_row(card_id, band, &required));
            continue;
        }

        for event in matching {
            rows.push(event_row(card_id, band, &required, &required_norm, event));
        }
    }
    rows
}

fn unserviced_row(card_id: &str, band: &ServiceBand, required: &[String]) -> ServiceStatusRow {
    let needed = join_or_mark(required, NEEDED_SEP);
    ServiceStatusRow {
        card_number: card_id.to_string(),
        min_tons: band.min_tons,
        max_tons: band.max_tons,
        service_needed: needed.clone(),
        service_done: EMPTY_MARK.to_string(),
        service_not_done: needed,
        outstanding: required.len(),
        has_history: false,
        tons_at_event: EMPTY_MARK.to_string(),
        event: EMPTY_MARK.to_string(),
        correction: EMPTY_MARK.to_string(),
        serviced_by: EMPTY_MARK.to_string(),
        date: EMPTY_MARK.to_string(),
        other_note: EMPTY_MARK.to_string(),
    }
}

fn event_row(
    card_id: &str,
    band: &ServiceBand,
    required: &[String],
    required_norm: &[String],
    event: &ServiceEvent,
) -> ServiceStatusRow {
    let done_norm: HashSet<String> = event
        .performed_services
        .iter()
        .map(|s| normalize(s))
        .collect();

    let not_done: Vec<&str> = required
        .iter()
        .zip(required_norm)
        .filter(|(_, norm)| !done_norm.contains(*norm))
        .map(|(part, _)| part.as_str())
        .collect();

    // performed_services is a BTreeSet, so this is already sorted.
    let done: Vec<&str> = event.performed_services.iter().map(String::as_str).collect();

    ServiceStatusRow {
        card_number: card_id.to_string(),
        min_tons: band.min_tons,
        max_tons: band.max_tons,
        service_needed: join_or_mark(required, NEEDED_SEP),
        service_done: join_or_mark(&done, LIST_SEP),
        service_not_done: join_or_mark(&not_done, LIST_SEP),
        outstanding: not_done.len(),
        has_history: true,
        tons_at_event: event.tons_at_event.clone(),
        event: event.event.clone(),
        correction: event.correction.clone(),
        serviced_by: event.serviced_by.clone(),
        date: event.date.clone(),
        other_note: event.other_note.clone(),
    }
}
