pub mod balance;
pub mod column_scan;
pub mod heuristic;
pub mod table_rows;

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::extraction::layout::Line;
use crate::model::{SkippedLine, Transaction, TransactionType};
use crate::parsing::dates::{self, DateOrder};

/// Words that mark a row as money-in when they appear in a type indicator
/// or free text.
pub(crate) static CREDIT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(credit|cr|deposit|received|income|refund|cashback)\b").unwrap()
});

/// Words that mark a row as money-out.
pub(crate) static DEBIT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(debit|dr|withdrawal|paid|payment|purchase|spent|expense|sent)\b").unwrap()
});

pub(crate) fn is_credit_indicator(text: &str) -> bool {
    CREDIT_WORDS.is_match(text)
}

pub(crate) fn is_debit_indicator(text: &str) -> bool {
    DEBIT_WORDS.is_match(text)
}

const SOURCE_TEXT_CAP: usize = 200;
const DESCRIPTION_KEY_PREFIX: usize = 30;

/// Values gathered for one candidate row, plus which columns the source
/// document actually has. Resolution priority depends on both.
#[derive(Debug, Default)]
pub(crate) struct AmountParts {
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub amount: Option<f64>,
    pub has_debit_column: bool,
    pub has_credit_column: bool,
    pub has_amount_column: bool,
    pub type_text: Option<String>,
}

/// Resolve a signed amount and type from candidate values.
///
/// Priority: separate debit/credit columns, then an amount column (with a
/// type indicator overriding the amount's own sign), then a lone debit or
/// credit column. `None` means the candidate has no resolvable nonzero
/// amount and is discarded.
pub(crate) fn resolve_amount(parts: &AmountParts) -> Option<(f64, TransactionType)> {
    if parts.has_debit_column && parts.has_credit_column {
        if let Some(d) = parts.debit {
            return Some((-d.abs(), TransactionType::Expense));
        }
        if let Some(c) = parts.credit {
            return Some((c.abs(), TransactionType::Income));
        }
    }

    if parts.has_amount_column {
        if let Some(a) = parts.amount {
            let txn_type = match parts.type_text.as_deref() {
                Some(t) if is_debit_indicator(t) => TransactionType::Expense,
                Some(t) if is_credit_indicator(t) => TransactionType::Income,
                _ => {
                    if a < 0.0 {
                        TransactionType::Expense
                    } else {
                        TransactionType::Income
                    }
                }
            };
            let signed = match txn_type {
                TransactionType::Expense => -a.abs(),
                TransactionType::Income => a.abs(),
            };
            return Some((signed, txn_type));
        }
    }

    if parts.has_debit_column {
        if let Some(d) = parts.debit {
            return Some((-d.abs(), TransactionType::Expense));
        }
    }
    if parts.has_credit_column {
        if let Some(c) = parts.credit {
            return Some((c.abs(), TransactionType::Income));
        }
    }

    None
}

/// Assemble a finalized transaction, applying the field defaults and caps.
pub(crate) fn build_transaction(
    index: usize,
    date: NaiveDate,
    description: &str,
    amount: f64,
    txn_type: TransactionType,
    balance: Option<f64>,
    source_text: &str,
) -> Transaction {
    let description = description.trim();
    let description = if description.is_empty() {
        "Transaction".to_string()
    } else {
        description.to_string()
    };

    Transaction {
        id: format!("txn_{}_{}", date.format("%Y%m%d"), index),
        date,
        description,
        amount,
        txn_type,
        balance,
        category: "other".to_string(),
        merchant: None,
        source_text: source_text.chars().take(SOURCE_TEXT_CAP).collect(),
    }
}

/// Composite dedup key: calendar day, absolute amount to two decimals and
/// the first 30 description characters. Later matches are dropped.
pub(crate) fn dedup_key(txn: &Transaction) -> String {
    let prefix: String = txn
        .description
        .to_lowercase()
        .chars()
        .take(DESCRIPTION_KEY_PREFIX)
        .collect();
    format!("{}|{:.2}|{}", txn.date, txn.amount.abs(), prefix)
}

pub(crate) fn dedup(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    transactions
        .into_iter()
        .filter(|t| seen.insert(dedup_key(t)))
        .collect()
}

/// Numeric date-order vote over fragments shaped like bare numeric dates.
/// Shared by both line-based strategies.
pub(crate) fn detect_order(lines: &[Line]) -> DateOrder {
    let samples: Vec<&str> = lines
        .iter()
        .flat_map(|l| l.fragments.iter())
        .map(|f| f.text.as_str())
        .filter(|t| dates::looks_like_numeric_date(t))
        .take(40)
        .collect();
    dates::detect_date_order(&samples)
}

/// Minimum transaction count below which the fallback strategy is tried.
const STRATEGY_FALLBACK_THRESHOLD: usize = 3;

/// Extract transactions from reconstructed PDF lines.
///
/// The column-position strategy runs first; if it produces fewer than 3
/// transactions the text heuristic also runs and the larger list wins.
pub fn extract_from_lines(lines: &[Line], skipped: &mut Vec<SkippedLine>) -> Vec<Transaction> {
    let by_columns = column_scan::extract(lines, skipped);
    if by_columns.len() >= STRATEGY_FALLBACK_THRESHOLD {
        return by_columns;
    }
    let by_heuristic = heuristic::extract(lines);
    if by_heuristic.len() > by_columns.len() {
        by_heuristic
    } else {
        by_columns
    }
}
