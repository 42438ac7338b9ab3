use bankstat_core::model::ParsedStatement;
use std::fmt::Write;

pub fn format_parsed(parsed: &ParsedStatement) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "File:     {}", parsed.file_name);
    let _ = writeln!(out, "Format:   {}", parsed.format);
    match &parsed.currency {
        Some(c) => {
            let _ = writeln!(out, "Currency: {} ({})", c.code, c.symbol);
        }
        None => {
            let _ = writeln!(out, "Currency: unknown");
        }
    }
    let _ = writeln!(out);

    if parsed.transactions.is_empty() {
        let _ = writeln!(out, "No transactions found.");
    } else {
        let max_desc = parsed
            .transactions
            .iter()
            .map(|t| t.description.chars().count().min(40))
            .max()
            .unwrap_or(11)
            .max("Description".len());

        let _ = writeln!(
            out,
            "{:<10}  {:<7}  {:>12}  {:>12}  {:<width$}",
            "Date",
            "Type",
            "Amount",
            "Balance",
            "Description",
            width = max_desc
        );
        for t in &parsed.transactions {
            let desc: String = t.description.chars().take(40).collect();
            let balance = match t.balance {
                Some(b) => format!("{b:.2}"),
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "{:<10}  {:<7}  {:>12.2}  {:>12}  {:<width$}",
                t.date,
                t.txn_type.to_string(),
                t.amount,
                balance,
                desc,
                width = max_desc
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{} transaction(s)", parsed.transactions.len());
    }

    if !parsed.skipped_lines.is_empty() {
        let _ = writeln!(
            out,
            "{} line(s) skipped during parsing",
            parsed.skipped_lines.len()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankstat_core::model::{
        DocumentFormat, ParsedStatement, Transaction, TransactionType,
    };
    use chrono::NaiveDate;

    fn sample() -> ParsedStatement {
        ParsedStatement {
            transactions: vec![Transaction {
                id: "txn_20240101_0".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                description: "SALARY".into(),
                amount: 50000.0,
                txn_type: TransactionType::Income,
                balance: Some(50000.0),
                category: "other".into(),
                merchant: None,
                source_text: String::new(),
            }],
            currency: None,
            format: DocumentFormat::Delimited,
            file_name: "stmt.csv".into(),
            parsed_at: chrono::Utc::now(),
            full_text: None,
            skipped_lines: Vec::new(),
        }
    }

    #[test]
    fn test_table_contains_fields() {
        let text = format_parsed(&sample());
        assert!(text.contains("stmt.csv"));
        assert!(text.contains("2024-01-01"));
        assert!(text.contains("income"));
        assert!(text.contains("SALARY"));
        assert!(text.contains("1 transaction(s)"));
    }

    #[test]
    fn test_empty_statement() {
        let mut parsed = sample();
        parsed.transactions.clear();
        let text = format_parsed(&parsed);
        assert!(text.contains("No transactions found."));
    }
}
