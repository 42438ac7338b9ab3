use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::engine::{
    build_transaction, dedup, detect_order, is_credit_indicator, is_debit_indicator, CREDIT_WORDS,
    DEBIT_WORDS,
};
use crate::extraction::layout::Line;
use crate::model::{Transaction, TransactionType};
use crate::parsing::amounts::clean_amount;
use crate::parsing::dates;
use crate::parsing::dates::DateOrder;

/// How many undated lines after a dated one belong to the same entry.
const MAX_CONTEXT_LINES: usize = 4;
/// Balance-delta agreement is only checked over this many leading entries.
const VALIDATION_WINDOW: usize = 10;
const DELTA_TOLERANCE_RATIO: f64 = 0.01;
const DELTA_TOLERANCE_ABS: f64 = 0.02;

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(?-?\d+(?:[.,]\d+)*\)?").unwrap());

/// A dated line plus its absorbed context lines.
#[derive(Debug)]
struct Entry {
    date: NaiveDate,
    text: String,
    tokens: Vec<f64>,
}

/// Text-heuristic extraction: no column knowledge, just dated entries and
/// the numeric tokens inside them. Used as a fallback when the
/// column-position strategy finds too little.
pub(crate) fn extract(lines: &[Line]) -> Vec<Transaction> {
    let order = detect_order(lines);
    let entries = group_entries(lines, order);
    if entries.is_empty() {
        return Vec::new();
    }

    let transactions = match try_balance_tracking(&entries) {
        Some(tracked) => tracked,
        None => extract_by_keywords(&entries),
    };

    dedup(transactions)
}

fn group_entries(lines: &[Line], order: DateOrder) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut current: Option<(NaiveDate, String)> = None;
    let mut absorbed = 0usize;

    for line in lines {
        let text = line.text();
        if let Some(date) = dates::extract_date_from_text(&text, order) {
            if let Some((d, t)) = current.take() {
                entries.push(make_entry(d, t));
            }
            current = Some((date, text));
            absorbed = 0;
        } else if let Some((_, t)) = current.as_mut() {
            if absorbed < MAX_CONTEXT_LINES {
                t.push(' ');
                t.push_str(&text);
                absorbed += 1;
            }
        }
    }
    if let Some((d, t)) = current.take() {
        entries.push(make_entry(d, t));
    }
    entries
}

fn make_entry(date: NaiveDate, text: String) -> Entry {
    let tokens = numeric_tokens(&text);
    Entry { date, text, tokens }
}

/// Every amount-like token in the text, dates blanked out first.
fn numeric_tokens(text: &str) -> Vec<f64> {
    let dateless = dates::strip_dates(text);
    NUMERIC_TOKEN
        .find_iter(&dateless)
        .filter_map(|m| clean_amount(m.as_str()))
        .collect()
}

fn within_tolerance(candidate: f64, delta: f64) -> bool {
    (candidate.abs() - delta.abs()).abs() <= delta.abs() * DELTA_TOLERANCE_RATIO + DELTA_TOLERANCE_ABS
}

/// Assume the last token of each entry is a running balance and check that
/// consecutive deltas are explained by another token of the same entry.
///
/// Validation only covers the leading window, but a pass applies the
/// derived typing to the whole batch.
fn try_balance_tracking(entries: &[Entry]) -> Option<Vec<Transaction>> {
    if entries.len() < 3 {
        return None;
    }

    for i in 1..entries.len().min(VALIDATION_WINDOW) {
        let prev = *entries[i - 1].tokens.last()?;
        let tokens = &entries[i].tokens;
        let bal = *tokens.last()?;
        let delta = bal - prev;
        let matched = tokens[..tokens.len() - 1]
            .iter()
            .any(|t| within_tolerance(*t, delta));
        if !matched {
            return None;
        }
    }

    let mut out = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if entry.tokens.is_empty() {
            continue;
        }
        let balance = *entry.tokens.last().unwrap_or(&0.0);

        if i == 0 {
            // No previous balance to diff against; type by keywords.
            let (amount, txn_type) = keyword_typed_amount(entry);
            out.push(build_transaction(
                out.len(),
                entry.date,
                &scrub_description(&entry.text),
                amount,
                txn_type,
                (entry.tokens.len() >= 2).then_some(balance),
                &entry.text,
            ));
            continue;
        }

        let prev = match entries[i - 1].tokens.last() {
            Some(p) => *p,
            None => continue,
        };
        let delta = balance - prev;
        let txn_type = if delta > 0.0 {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };
        let others = &entry.tokens[..entry.tokens.len() - 1];
        let magnitude = others
            .iter()
            .find(|t| within_tolerance(**t, delta))
            .or_else(|| others.first())
            .map(|t| t.abs())
            .unwrap_or_else(|| delta.abs());
        if magnitude == 0.0 {
            continue;
        }
        let amount = match txn_type {
            TransactionType::Income => magnitude,
            TransactionType::Expense => -magnitude,
        };
        out.push(build_transaction(
            out.len(),
            entry.date,
            &scrub_description(&entry.text),
            amount,
            txn_type,
            Some(balance),
            &entry.text,
        ));
    }
    Some(out)
}

/// Keyword fallback: type from credit/debit words, amount from the first
/// numeric token, trailing token treated as balance when two or more exist.
fn extract_by_keywords(entries: &[Entry]) -> Vec<Transaction> {
    let mut out = Vec::new();
    for entry in entries {
        if entry.tokens.is_empty() {
            continue;
        }
        let (amount, txn_type) = keyword_typed_amount(entry);
        let balance = (entry.tokens.len() >= 2).then(|| *entry.tokens.last().unwrap_or(&0.0));
        out.push(build_transaction(
            out.len(),
            entry.date,
            &scrub_description(&entry.text),
            amount,
            txn_type,
            balance,
            &entry.text,
        ));
    }
    out
}

fn keyword_typed_amount(entry: &Entry) -> (f64, TransactionType) {
    let txn_type = if is_credit_indicator(&entry.text) && !is_debit_indicator(&entry.text) {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };
    let magnitude = entry.tokens.first().map(|t| t.abs()).unwrap_or(0.0);
    let amount = match txn_type {
        TransactionType::Income => magnitude,
        TransactionType::Expense => -magnitude,
    };
    (amount, txn_type)
}

/// Strip dates, numeric tokens and type keywords from entry text.
fn scrub_description(text: &str) -> String {
    let s = dates::strip_dates(text);
    let s = NUMERIC_TOKEN.replace_all(&s, " ");
    let s = CREDIT_WORDS.replace_all(&s, " ");
    let s = DEBIT_WORDS.replace_all(&s, " ");
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::layout::reconstruct_lines;
    use crate::extraction::PositionedFragment;

    fn lines_from(texts: &[&str]) -> Vec<Line> {
        let fragments: Vec<PositionedFragment> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| PositionedFragment {
                text: t.to_string(),
                x: 10.0,
                y: i as f32 * 20.0,
            })
            .collect();
        reconstruct_lines(&fragments)
    }

    #[test]
    fn test_keyword_typing() {
        let lines = lines_from(&[
            "01/01/2024 SALARY DEPOSIT 50000.00",
            "02/01/2024 RENT PAYMENT 15000.00",
            "03/01/2024 REFUND FROM STORE 250.00",
        ]);
        let txns = extract(&lines);
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].txn_type, TransactionType::Income);
        assert_eq!(txns[0].amount, 50000.0);
        assert_eq!(txns[1].txn_type, TransactionType::Expense);
        assert_eq!(txns[1].amount, -15000.0);
        assert_eq!(txns[2].txn_type, TransactionType::Income);
    }

    #[test]
    fn test_balance_tracking() {
        let lines = lines_from(&[
            "01/01/2024 OPENING 100.00 1000.00",
            "02/01/2024 GROCERIES 200.00 800.00",
            "03/01/2024 TRANSFER IN 300.00 1100.00",
            "04/01/2024 FUEL 50.00 1050.00",
        ]);
        let txns = extract(&lines);
        assert_eq!(txns.len(), 4);
        // Deltas: -200, +300, -50 for entries after the first.
        assert_eq!(txns[1].txn_type, TransactionType::Expense);
        assert_eq!(txns[1].amount, -200.0);
        assert_eq!(txns[1].balance, Some(800.0));
        assert_eq!(txns[2].txn_type, TransactionType::Income);
        assert_eq!(txns[2].amount, 300.0);
        assert_eq!(txns[3].txn_type, TransactionType::Expense);
        assert_eq!(txns[3].amount, -50.0);
    }

    #[test]
    fn test_balance_typing_applied_past_validated_prefix() {
        // Delta agreement is only checked over the first entries; a later
        // entry whose tokens disagree with its delta is still typed by the
        // delta sign, with the amount taken from its first token.
        let mut texts: Vec<String> = vec!["01/01/2024 OPENING 100.00 1000.00".into()];
        for i in 1..=9 {
            texts.push(format!(
                "{:02}/01/2024 PAYMENT 10.00 {}.00",
                i + 1,
                1000 - 10 * i
            ));
        }
        texts.push("11/01/2024 MYSTERY 500.00 950.00".into());
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let lines = lines_from(&refs);

        let txns = extract(&lines);
        assert_eq!(txns.len(), 11);
        assert_eq!(txns[5].txn_type, TransactionType::Expense);
        assert_eq!(txns[5].amount, -10.0);
        // Last entry: balance moved 910 -> 950 (+40), token says 500.
        assert_eq!(txns[10].txn_type, TransactionType::Income);
        assert_eq!(txns[10].amount, 500.0);
        assert_eq!(txns[10].balance, Some(950.0));
    }

    #[test]
    fn test_balance_tracking_rejected_on_mismatch() {
        // Deltas never match any other token, so keyword typing kicks in.
        let lines = lines_from(&[
            "01/01/2024 PAYMENT A 10.00 999.00",
            "02/01/2024 PAYMENT B 10.00 777.00",
            "03/01/2024 PAYMENT C 10.00 555.00",
        ]);
        let txns = extract(&lines);
        assert_eq!(txns.len(), 3);
        assert!(txns.iter().all(|t| t.txn_type == TransactionType::Expense));
        assert!(txns.iter().all(|t| t.amount == -10.0));
    }

    #[test]
    fn test_continuation_lines_absorbed() {
        let lines = lines_from(&[
            "01/01/2024 CARD PURCHASE",
            "GROCERY MART 42.50",
            "02/01/2024 CARD PURCHASE 10.00",
            "03/01/2024 CARD PURCHASE 11.00",
        ]);
        let txns = extract(&lines);
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].amount, -42.5);
        assert!(txns[0].description.contains("GROCERY MART"));
    }

    #[test]
    fn test_dateless_text_yields_nothing() {
        let lines = lines_from(&["hello world", "no transactions here"]);
        assert!(extract(&lines).is_empty());
    }

    #[test]
    fn test_description_scrubbed() {
        let lines = lines_from(&[
            "01/01/2024 COFFEE SHOP 4.50",
            "02/01/2024 BOOK STORE 12.00",
            "03/01/2024 BAKERY 3.25",
        ]);
        let txns = extract(&lines);
        assert_eq!(txns[0].description, "COFFEE SHOP");
        assert!(!txns[0].description.contains("4.50"));
    }
}
