use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Delimited,
    Workbook,
}

impl DocumentFormat {
    /// Guess the format from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<DocumentFormat> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "csv" | "txt" | "tsv" => Some(DocumentFormat::Delimited),
            "xlsx" | "xls" | "xlsm" => Some(DocumentFormat::Workbook),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Delimited => write!(f, "delimited"),
            DocumentFormat::Workbook => write!(f, "workbook"),
        }
    }
}

/// A detected statement currency, cloned out of the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub name: String,
    pub locale: String,
}

/// A normalized, finalized transaction.
///
/// Invariants: `amount` is never exactly zero and its sign agrees with
/// `txn_type` (negative for expense, positive for income); the date year
/// lies in 1990..=2100; `description` is non-empty; `source_text` is
/// capped at 200 characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub txn_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    /// Placeholder; real categorization happens downstream.
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    pub source_text: String,
}

/// A line or row excluded during extraction, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_text: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub transactions: Vec<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    pub format: DocumentFormat,
    pub file_name: String,
    pub parsed_at: DateTime<Utc>,
    /// Reconstructed document text (PDF path only), kept for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}
