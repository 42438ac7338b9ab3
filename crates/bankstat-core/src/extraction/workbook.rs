use std::io::Cursor;

use calamine::{Data, Range, Reader};

use crate::error::StatementError;
use crate::extraction::TableData;
use crate::parsing::columns;

/// How many leading rows of a sheet are searched for a header row.
const HEADER_SEARCH_ROWS: usize = 10;

/// Parse a spreadsheet workbook into one TableData per usable sheet.
///
/// The container format (xlsx, legacy xls, xlsb, ods) is detected from the
/// bytes. Sheets without a recognizable header row are skipped; the caller
/// runs the extraction pipeline per sheet and keeps the richest result.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<TableData>, StatementError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| StatementError::Extraction(format!("failed to open workbook: {e}")))?;

    let names = workbook.sheet_names().to_owned();
    let mut tables = Vec::new();
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| StatementError::ParseError(format!("sheet '{name}' unreadable: {e}")))?;
        if let Some(table) = sheet_to_table(&range) {
            tables.push(table);
        }
    }

    if tables.is_empty() {
        return Err(StatementError::ColumnMapping(
            "no sheet with a date column and a money column".into(),
        ));
    }
    Ok(tables)
}

/// Convert a sheet to named-field rows by locating its header row.
fn sheet_to_table(range: &Range<Data>) -> Option<TableData> {
    let all_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_as_string).collect())
        .collect();

    let header_idx = all_rows
        .iter()
        .take(HEADER_SEARCH_ROWS)
        .position(|row| columns::map_headers(row).is_usable())?;

    let headers = all_rows[header_idx].clone();
    let rows: Vec<Vec<String>> = all_rows[header_idx + 1..]
        .iter()
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .cloned()
        .collect();

    Some(TableData { headers, rows })
}

/// Cell to text. Numeric cells keep their numeric form so date columns can
/// fall back to spreadsheet-serial parsing downstream.
fn cell_as_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format!("{f}"),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::Empty => String::new(),
        other => format!("{other}").trim().to_string(),
    }
}
