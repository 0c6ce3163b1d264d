// Maintenance plan rows from a sheet or CSV table

use tracing::{debug, warn};

use millcard_recon::classify::ColumnRole;
use millcard_recon::normalize::parse_tons_or_zero;
use millcard_recon::{ReconError, ServiceBand, Vocabulary};

use crate::table::Table;

/// Header spellings for the required-services column of the plan.
pub const SERVICE_COLUMN: &[&str] = &[
    "service",
    "services",
    "required services",
    "service needed",
    "الخدمة",
    "الخدمات",
    "الصيانة المطلوبة",
];

fn role_column(table: &Table, vocabulary: &Vocabulary, role: ColumnRole) -> Option<usize> {
    table
        .headers
        .iter()
        .position(|h| vocabulary.reserved_role(h) == Some(role))
}

/// Read plan bands in sheet order.
///
/// Tonnage cells that are blank or non-numeric read as `0`. Rows whose
/// minimum exceeds their maximum are skipped with a warning.
pub fn bands_from_table(table: &Table, vocabulary: &Vocabulary) -> Result<Vec<ServiceBand>, ReconError> {
    let missing = |what: &str| {
        ReconError::Source(format!("plan '{}' has no {} column", table.name, what))
    };
    let min_col = role_column(table, vocabulary, ColumnRole::MinTons).ok_or_else(|| missing("minimum tonnage"))?;
    let max_col = role_column(table, vocabulary, ColumnRole::MaxTons).ok_or_else(|| missing("maximum tonnage"))?;
    let service_col = table.find_column(SERVICE_COLUMN).ok_or_else(|| missing("service"))?;

    let mut bands = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let min_tons = parse_tons_or_zero(table.cell(row, min_col));
        let max_tons = parse_tons_or_zero(table.cell(row, max_col));
        if min_tons > max_tons {
            warn!(plan = %table.name, row = row + 2, min_tons, max_tons, "skipping plan row with min above max");
            continue;
        }
        let required = table.cell(row, service_col).as_text();
        bands.push(ServiceBand::new(min_tons, max_tons, required));
    }

    debug!(plan = %table.name, bands = bands.len(), "plan loaded");
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use millcard_recon::CellValue;

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn reads_bands_leniently() {
        let table = Table::from_rows(
            "ServicePlan",
            vec![
                vec![t("Min_Tones"), t("Max_Tones"), t("Service")],
                vec![CellValue::Number(0.0), CellValue::Number(1000.0), t("Oil + Filter")],
                vec![t("1000"), t("abc"), t("Belt")],
                vec![t("1000"), t("2000"), t("")],
            ],
        );
        let bands = bands_from_table(&table, &Vocabulary::default()).unwrap();
        // "abc" reads as 0, so the second row has min > max and is skipped.
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].required_services(), vec!["Oil", "Filter"]);
        assert_eq!(bands[1].min_tons, 1000.0);
        assert_eq!(bands[1].max_tons, 2000.0);
        assert!(bands[1].required_services().is_empty());
    }

    #[test]
    fn arabic_headers() {
        let table = Table::from_rows(
            "plan",
            vec![
                vec![t("من"), t("إلى"), t("الخدمات")],
                vec![t("0"), t("500"), t("تغيير الزيت")],
            ],
        );
        let bands = bands_from_table(&table, &Vocabulary::default()).unwrap();
        assert_eq!(bands[0].max_tons, 500.0);
        assert_eq!(bands[0].required_raw, "تغيير الزيت");
    }

    #[test]
    fn missing_service_column() {
        let table = Table::from_rows("plan", vec![vec![t("Min_Tones"), t("Max_Tones")]]);
        let err = bands_from_table(&table, &Vocabulary::default()).unwrap_err();
        assert_eq!(err.to_string(), "source error: plan 'plan' has no service column");
    }
}
