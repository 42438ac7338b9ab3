use crate::engine::{build_transaction, dedup, resolve_amount, AmountParts};
use crate::error::StatementError;
use crate::extraction::TableData;
use crate::model::{SkippedLine, Transaction};
use crate::parsing::amounts::clean_amount;
use crate::parsing::columns::{self, ColumnMap, ColumnRole};
use crate::parsing::dates;

/// Extract transactions from a header-mapped table (CSV or workbook sheet).
///
/// Rows whose date or amount cannot be resolved are recorded in `skipped`
/// rather than failing the whole document.
pub fn extract_from_table(
    table: &TableData,
    skipped: &mut Vec<SkippedLine>,
) -> Result<Vec<Transaction>, StatementError> {
    let map = columns::map_headers(&table.headers);
    if !map.is_usable() {
        return Err(StatementError::ColumnMapping(format!(
            "headers lack a date column and a money column: {:?}",
            table.headers
        )));
    }

    let order = detect_order(table, &map);

    let mut out = Vec::new();
    for row in &table.rows {
        let source = row.join(" | ");

        let date = match cell(row, &map, ColumnRole::Date).and_then(|c| parse_date_cell(c, order)) {
            Some(d) => d,
            None => {
                skipped.push(SkippedLine {
                    line_text: source,
                    reason: "unparseable date".into(),
                });
                continue;
            }
        };

        let parts = AmountParts {
            debit: cell(row, &map, ColumnRole::Debit).and_then(clean_amount),
            credit: cell(row, &map, ColumnRole::Credit).and_then(clean_amount),
            amount: cell(row, &map, ColumnRole::Amount).and_then(clean_amount),
            has_debit_column: map.has(ColumnRole::Debit),
            has_credit_column: map.has(ColumnRole::Credit),
            has_amount_column: map.has(ColumnRole::Amount),
            type_text: cell(row, &map, ColumnRole::TxnType).map(str::to_string),
        };

        let (amount, txn_type) = match resolve_amount(&parts) {
            Some(resolved) => resolved,
            None => {
                skipped.push(SkippedLine {
                    line_text: source,
                    reason: "no resolvable nonzero amount".into(),
                });
                continue;
            }
        };

        let description = cell(row, &map, ColumnRole::Description).unwrap_or("");
        let balance = cell(row, &map, ColumnRole::Balance).and_then(clean_amount);

        out.push(build_transaction(
            out.len(),
            date,
            description,
            amount,
            txn_type,
            balance,
            &source,
        ));
    }

    Ok(dedup(out))
}

fn cell<'a>(row: &'a [String], map: &ColumnMap, role: ColumnRole) -> Option<&'a str> {
    let idx = map.index_of(role)?;
    let value = row.get(idx)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Date cells are usually text, but spreadsheet date cells arrive as
/// serial-number strings and get a numeric fallback.
fn parse_date_cell(raw: &str, order: dates::DateOrder) -> Option<chrono::NaiveDate> {
    if let Some(d) = dates::parse_with_order(raw, order) {
        return Some(d);
    }
    if let Some(d) = dates::extract_date_from_text(raw, order) {
        return Some(d);
    }
    raw.parse::<f64>().ok().and_then(dates::excel_serial_to_date)
}

fn detect_order(table: &TableData, map: &ColumnMap) -> dates::DateOrder {
    let samples: Vec<&str> = table
        .rows
        .iter()
        .filter_map(|row| cell(row, map, ColumnRole::Date))
        .take(40)
        .collect();
    dates::detect_date_order(&samples)
}
