//! Deterministic extraction of transaction ledgers from bank statements.
//!
//! Three input shapes are supported: PDF (positioned text via `pdftotext`),
//! delimited text (CSV and friends) and spreadsheet workbooks. All three
//! converge on the same normalized [`model::Transaction`] records.

pub mod engine;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;

use chrono::Utc;

use error::StatementError;
use extraction::{layout, PdfExtractor};
use model::{DocumentFormat, ParsedStatement, SkippedLine, Transaction};

/// Parse statement bytes into a normalized ledger.
///
/// The extractor is only consulted for PDF input; delimited and workbook
/// parsing happen in-process.
pub fn parse_statement(
    bytes: &[u8],
    file_name: &str,
    format: DocumentFormat,
    extractor: &dyn PdfExtractor,
) -> Result<ParsedStatement, StatementError> {
    let mut skipped: Vec<SkippedLine> = Vec::new();

    let (transactions, text, full_text) = match format {
        DocumentFormat::Pdf => {
            let pages = extractor.extract_pages(bytes)?;
            let lines = layout::pages_to_lines(&pages);
            let text = layout::full_text(&lines);
            let transactions = engine::extract_from_lines(&lines, &mut skipped);
            (transactions, text.clone(), Some(text))
        }
        DocumentFormat::Delimited => {
            let table = extraction::delimited::parse_delimited(bytes)?;
            let transactions = engine::table_rows::extract_from_table(&table, &mut skipped)?;
            (transactions, String::from_utf8_lossy(bytes).into_owned(), None)
        }
        DocumentFormat::Workbook => {
            let tables = extraction::workbook::parse_workbook(bytes)?;
            let transactions = richest_sheet(&tables, &mut skipped)?;
            let text = tables
                .iter()
                .flat_map(|t| t.headers.iter().chain(t.rows.iter().flatten()))
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            (transactions, text, None)
        }
    };

    let transactions = engine::balance::validate(transactions);
    let currency = parsing::currency::detect(&text);

    Ok(ParsedStatement {
        transactions,
        currency,
        format,
        file_name: file_name.to_string(),
        parsed_at: Utc::now(),
        full_text,
        skipped_lines: skipped,
    })
}

/// Run extraction over every sheet and keep the one with the most
/// transactions. Errors only surface when no sheet succeeds.
fn richest_sheet(
    tables: &[extraction::TableData],
    skipped: &mut Vec<SkippedLine>,
) -> Result<Vec<Transaction>, StatementError> {
    let mut best: Option<Vec<Transaction>> = None;
    let mut last_err: Option<StatementError> = None;

    for table in tables {
        let mut sheet_skipped = Vec::new();
        match engine::table_rows::extract_from_table(table, &mut sheet_skipped) {
            Ok(transactions) => {
                if best.as_ref().map_or(true, |b| transactions.len() > b.len()) {
                    best = Some(transactions);
                    skipped.clear();
                    skipped.extend(sheet_skipped);
                }
            }
            Err(e) => last_err = Some(e),
        }
    }

    match best {
        Some(transactions) => Ok(transactions),
        None => Err(last_err.unwrap_or_else(|| {
            StatementError::ColumnMapping("no usable sheet in workbook".into())
        })),
    }
}
