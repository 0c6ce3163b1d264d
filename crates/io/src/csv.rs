// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use millcard_recon::CellValue;

use crate::table::Table;

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    import_from_string(&name, &content, delimiter)
}

/// Pick the delimiter of a plan, card or bale-log export.
///
/// Regional Excel saves Arabic sheets with `;`, and some machines export
/// tab-separated text, so each candidate is scored by how many of the first
/// non-blank lines split into the same number of fields as the header line.
/// Blank lines are left out of the sample since the exports pad sheets with
/// them. Wider headers win ties; a single-field header never wins.
fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    let field_count = |line: &str, delim: u8| {
        csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes())
            .records()
            .next()
            .and_then(Result::ok)
            .map_or(1, |r| r.len())
    };

    let mut best = (b',', 0usize);
    for delim in CANDIDATES {
        let Some(header) = sample.first() else { break };
        let width = field_count(header, delim);
        if width <= 1 {
            continue;
        }
        let agreeing = sample.iter().filter(|line| field_count(line, delim) == width).count();
        let score = agreeing * width;
        if score > best.1 {
            best = (delim, score);
        }
    }
    best.0
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports from Excel)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Excel writes a BOM in front of UTF-8 CSVs
    let bytes = match bytes.strip_prefix(b"\xEF\xBB\xBF") {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("line {}: {}", row_idx + 1, e))?;
        rows.push(record.iter().map(CellValue::text).collect());
    }

    Ok(Table::from_rows(name, rows))
}

/// Write a header row and string rows.
pub fn export(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer.write_record(headers).map_err(|e| e.to_string())?;
    for row in rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_semicolons() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a,b\n1,2\n"), b',');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn sniffs_arabic_semicolon_exports() {
        let plan = "من;إلى;الخدمات\n0;1000;زيت, فلتر\n\n\n1000;2000;زيت\n";
        assert_eq!(sniff_delimiter(plan), b';');

        let table = import_from_string("plan", plan, sniff_delimiter(plan)).unwrap();
        assert_eq!(table.headers, vec!["من", "إلى", "الخدمات"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], CellValue::text("زيت, فلتر"));

        let log = "التاريخ\tالوقت\tنوع البالة\tالوزن\n2025-03-01\t08:15\tقطن خام\t200\n";
        assert_eq!(sniff_delimiter(log), b'\t');
    }

    #[test]
    fn import_keeps_text_cells() {
        let table = import_from_string("plan", "Min_Tones,Max_Tones,Service\n0,1000,\"Oil\nFilter\"\n", b',').unwrap();
        assert_eq!(table.headers, vec!["Min_Tones", "Max_Tones", "Service"]);
        assert_eq!(table.rows[0][2], CellValue::text("Oil\nFilter"));
    }

    #[test]
    fn bom_and_windows_1252() {
        let dir = tempfile::tempdir().unwrap();
        let bom = dir.path().join("bom.csv");
        std::fs::write(&bom, b"\xEF\xBB\xBFOil,Filter\nyes,no\n").unwrap();
        let table = import(&bom).unwrap();
        assert_eq!(table.headers[0], "Oil");
        assert_eq!(table.name, "bom");

        let latin = dir.path().join("latin.csv");
        std::fs::write(&latin, b"Caf\xe9,x\n1,2\n").unwrap();
        assert_eq!(import(&latin).unwrap().headers[0], "Café");
    }

    #[test]
    fn export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export(&path, &["A", "B"], &[vec!["1".into(), "x, y".into()]]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "A,B\n1,\"x, y\"\n");
    }
}
