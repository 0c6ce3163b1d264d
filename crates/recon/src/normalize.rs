//! Name normalization and lenient cell parsing.

use crate::model::CellValue;

/// Placeholder written wherever a value is unknown.
pub const EMPTY_MARK: &str = "-";

/// Texts that mean "no value" in a metadata cell (compared lowercased).
const NULL_TEXTS: &[&str] = &["nan", "none", "null"];

/// Canonical form of a service or column name.
///
/// Newlines become `+`, anything outside ASCII alphanumerics, Arabic script,
/// whitespace and `+ _ / . -` becomes a space, whitespace runs collapse to a
/// single space, and the result is trimmed and lowercased.
pub fn normalize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let cleaned: String = s
        .chars()
        .map(|c| if c == '\n' { '+' } else { c })
        .map(|c| if is_name_char(c) { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// [`normalize`] for optional input; `None` normalizes to `""`.
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || is_arabic_script(c)
        || c.is_whitespace()
        || matches!(c, '+' | '_' | '/' | '.' | '-')
}

fn is_arabic_script(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}'
    )
}

/// Split a plan descriptor such as `"Oil + Filter; Brake"` into its
/// service entries. Order is kept and repeated entries stay repeated.
pub fn parse_required(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(['+', ',', '\n', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// A finite number from a cell, or `None` for blank and non-numeric values.
pub fn parse_number(value: &CellValue) -> Option<f64> {
    let n = match value {
        CellValue::Empty => return None,
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    n.is_finite().then_some(n)
}

/// Tonnage from a cell. Missing or non-numeric values count as `0`.
pub fn parse_tons_or_zero(value: &CellValue) -> f64 {
    parse_number(value).unwrap_or(0.0)
}

/// Metadata text from a cell, or [`EMPTY_MARK`] for blank and null-like values.
pub fn metadata_text(value: &CellValue) -> String {
    let text = value.as_text();
    let trimmed = text.trim();
    if trimmed.is_empty() || NULL_TEXTS.contains(&trimmed.to_lowercase().as_str()) {
        EMPTY_MARK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Number rendered for display. Integral values print without decimals.
pub fn format_tons(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Join entries with `sep`, or return [`EMPTY_MARK`] when there are none.
pub fn join_or_mark<S: AsRef<str>>(parts: &[S], sep: &str) -> String {
    if parts.is_empty() {
        return EMPTY_MARK.to_string();
    }
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_case_and_punctuation() {
        assert_eq!(normalize("  Oil   Filter!! "), "oil filter");
        assert_eq!(normalize("OIL"), normalize(" oil "));
        assert_eq!(normalize("Oil:"), "oil");
        assert_ne!(normalize("OIL"), normalize("oil."), "trailing dot is kept");
        assert_eq!(normalize("Brake(s)"), "brake s");
    }

    #[test]
    fn normalize_keeps_arabic_and_allowed_symbols() {
        assert_eq!(normalize("تغيير  الزيت"), "تغيير الزيت");
        assert_eq!(normalize("Min_Tones"), "min_tones");
        assert_eq!(normalize("A/C-unit v1.2"), "a/c-unit v1.2");
    }

    #[test]
    fn normalize_newline_becomes_plus() {
        assert_eq!(normalize("Oil\nFilter"), "oil+filter");
        assert_eq!(normalize("Oil\r\nFilter"), "oil +filter");
    }

    #[test]
    fn normalize_empty_and_none() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" X ")), "x");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn parse_required_drops_empties_and_keeps_order() {
        assert_eq!(
            parse_required("Oil,, Filter ;; Brake\n"),
            vec!["Oil", "Filter", "Brake"]
        );
        assert_eq!(parse_required("Oil+Filter"), vec!["Oil", "Filter"]);
    }

    #[test]
    fn parse_required_keeps_duplicates() {
        assert_eq!(parse_required("Oil + oil + Oil"), vec!["Oil", "oil", "Oil"]);
    }

    #[test]
    fn parse_required_blank_is_empty() {
        assert!(parse_required("").is_empty());
        assert!(parse_required("  \n ").is_empty());
        assert!(parse_required("+ , ;").is_empty());
    }

    #[test]
    fn numbers_are_optional() {
        assert_eq!(parse_number(&CellValue::text(" 210.5 ")), Some(210.5));
        assert_eq!(parse_number(&CellValue::text("")), None);
        assert_eq!(parse_number(&CellValue::text("abc")), None);
        assert_eq!(parse_number(&CellValue::Number(f64::INFINITY)), None);
    }

    #[test]
    fn tons_fall_back_to_zero() {
        assert_eq!(parse_tons_or_zero(&CellValue::Empty), 0.0);
        assert_eq!(parse_tons_or_zero(&CellValue::text("abc")), 0.0);
        assert_eq!(parse_tons_or_zero(&CellValue::text(" 1500 ")), 1500.0);
        assert_eq!(parse_tons_or_zero(&CellValue::Number(250.5)), 250.5);
        assert_eq!(parse_tons_or_zero(&CellValue::Number(f64::NAN)), 0.0);
    }

    #[test]
    fn metadata_nulls_become_mark() {
        assert_eq!(metadata_text(&CellValue::Empty), "-");
        assert_eq!(metadata_text(&CellValue::text("NaN")), "-");
        assert_eq!(metadata_text(&CellValue::text(" None ")), "-");
        assert_eq!(metadata_text(&CellValue::text("null")), "-");
        assert_eq!(metadata_text(&CellValue::text(" Ahmed ")), "Ahmed");
        assert_eq!(metadata_text(&CellValue::Number(1200.0)), "1200");
    }

    #[test]
    fn join_or_mark_empty() {
        let none: [&str; 0] = [];
        assert_eq!(join_or_mark(&none, ", "), "-");
        assert_eq!(join_or_mark(&["a", "b"], " + "), "a + b");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_on_mixed_script(s in "[a-zA-Z0-9 \\n\\t+,;.!_/\\-ءاأبتثجحخدذرزسشصضطظعغفقكلمنهوي]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
