use crate::model::{ServiceBand, ServiceStatusRow, StatusSummary};

/// Summary counts for a reconciled selection.
pub fn compute_summary(bands: &[ServiceBand], rows: &[ServiceStatusRow]) -> StatusSummary {
    let mut summary = StatusSummary {
        bands_selected: bands.len(),
        rows: rows.len(),
        ..StatusSummary::default()
    };

    // Rows arrive grouped per band: the synthetic row of a band without
    // history is the only row with has_history == false.
    for row in rows {
        if row.has_history {
            if row.outstanding == 0 {
                summary.rows_complete += 1;
            }
        } else {
            summary.bands_without_history += 1;
        }
        summary.outstanding_items += row.outstanding;
    }
    summary.bands_with_history = summary.bands_selected.saturating_sub(summary.bands_without_history);

    summary
}
