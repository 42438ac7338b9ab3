use crate::error::StatementError;
use crate::extraction::TableData;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Parse delimited text (CSV and friends) into named-field rows.
///
/// The delimiter is sniffed from the first non-empty line; the first
/// record with any non-empty field becomes the header row.
pub fn parse_delimited(bytes: &[u8]) -> Result<TableData, StatementError> {
    let text = String::from_utf8_lossy(bytes);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for record in reader.records() {
        let record =
            record.map_err(|e| StatementError::ParseError(format!("bad delimited record: {e}")))?;
        let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        if headers.is_empty() {
            headers = fields;
        } else {
            rows.push(fields);
        }
    }

    if headers.is_empty() {
        return Err(StatementError::ParseError(
            "no rows in delimited input".into(),
        ));
    }

    Ok(TableData { headers, rows })
}

fn sniff_delimiter(text: &str) -> u8 {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    CANDIDATE_DELIMITERS
        .into_iter()
        .max_by_key(|d| first_line.matches(*d as char).count())
        .filter(|d| first_line.contains(*d as char))
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_delimited() {
        let data = b"Date,Description,Amount\n01/02/2024,Coffee,-4.50\n";
        let table = parse_delimited(data).unwrap();
        assert_eq!(table.headers, vec!["Date", "Description", "Amount"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "Coffee");
    }

    #[test]
    fn test_semicolon_sniffed() {
        let data = b"Datum;Omschrijving;Bedrag\n01-02-2024;Koffie;-4,50\n";
        let table = parse_delimited(data).unwrap();
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows[0][2], "-4,50");
    }

    #[test]
    fn test_tab_delimited() {
        let data = b"Date\tAmount\n01/02/2024\t12.00\n";
        let table = parse_delimited(data).unwrap();
        assert_eq!(table.headers, vec!["Date", "Amount"]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let data = b"Date,Amount\n\n01/02/2024,12.00\n,\n";
        let table = parse_delimited(data).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(parse_delimited(b"").is_err());
        assert!(parse_delimited(b"\n\n").is_err());
    }

    #[test]
    fn test_ragged_rows_allowed() {
        let data = b"Date,Description,Amount\n01/02/2024,Coffee\n";
        let table = parse_delimited(data).unwrap();
        assert_eq!(table.rows[0].len(), 2);
    }
}
