use crate::model::{Transaction, TransactionType};

const DELTA_TOLERANCE_RATIO: f64 = 0.01;
const DELTA_TOLERANCE_ABS: f64 = 0.02;

/// Cross-check extracted amounts and types against running balances.
///
/// Runs only when at least half the transactions carry a balance. For each
/// consecutive balance pair, the delta's sign decides the type (flipping
/// the amount's sign on disagreement) and a delta magnitude outside
/// tolerance replaces the extracted magnitude.
pub fn validate(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    if transactions.len() < 2 {
        return transactions;
    }
    let with_balance = transactions.iter().filter(|t| t.balance.is_some()).count();
    if with_balance * 2 < transactions.len() {
        return transactions;
    }

    let mut prev_balance: Option<f64> = None;
    for txn in transactions.iter_mut() {
        let Some(balance) = txn.balance else {
            continue;
        };
        let Some(prev) = prev_balance else {
            prev_balance = Some(balance);
            continue;
        };
        prev_balance = Some(balance);

        let delta = balance - prev;
        if delta == 0.0 {
            continue;
        }

        let expected = if delta > 0.0 {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };
        if txn.txn_type != expected {
            txn.txn_type = expected;
            txn.amount = -txn.amount;
        }

        let tolerance = delta.abs() * DELTA_TOLERANCE_RATIO + DELTA_TOLERANCE_ABS;
        if (txn.amount.abs() - delta.abs()).abs() > tolerance {
            txn.amount = match expected {
                TransactionType::Income => delta.abs(),
                TransactionType::Expense => -delta.abs(),
            };
        }
    }

    transactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::build_transaction;
    use chrono::NaiveDate;

    fn txn(day: u32, amount: f64, txn_type: TransactionType, balance: Option<f64>) -> Transaction {
        build_transaction(
            day as usize,
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            "test",
            amount,
            txn_type,
            balance,
            "",
        )
    }

    #[test]
    fn test_sign_flip_on_disagreement() {
        let input = vec![
            txn(1, 100.0, TransactionType::Income, Some(100.0)),
            txn(2, 50.0, TransactionType::Income, Some(150.0)),
            txn(3, 30.0, TransactionType::Income, Some(120.0)),
        ];
        let out = validate(input);
        assert_eq!(out[1].txn_type, TransactionType::Income);
        assert_eq!(out[1].amount, 50.0);
        // Balance dropped, so the third entry is really an expense.
        assert_eq!(out[2].txn_type, TransactionType::Expense);
        assert_eq!(out[2].amount, -30.0);
    }

    #[test]
    fn test_magnitude_replaced_outside_tolerance() {
        let input = vec![
            txn(1, 100.0, TransactionType::Income, Some(100.0)),
            txn(2, 999.0, TransactionType::Income, Some(150.0)),
        ];
        let out = validate(input);
        assert_eq!(out[1].amount, 50.0);
    }

    #[test]
    fn test_small_rounding_kept() {
        let input = vec![
            txn(1, 100.0, TransactionType::Income, Some(100.0)),
            txn(2, 50.01, TransactionType::Income, Some(150.0)),
        ];
        let out = validate(input);
        assert_eq!(out[1].amount, 50.01);
    }

    #[test]
    fn test_skipped_without_enough_balances() {
        let input = vec![
            txn(1, 100.0, TransactionType::Income, None),
            txn(2, 50.0, TransactionType::Income, None),
            txn(3, 30.0, TransactionType::Income, Some(120.0)),
        ];
        let out = validate(input);
        assert_eq!(out[1].amount, 50.0);
        assert_eq!(out[2].txn_type, TransactionType::Income);
    }

    #[test]
    fn test_zero_delta_untouched() {
        let input = vec![
            txn(1, 100.0, TransactionType::Income, Some(100.0)),
            txn(2, 5.0, TransactionType::Income, Some(100.0)),
        ];
        let out = validate(input);
        assert_eq!(out[1].amount, 5.0);
        assert_eq!(out[1].txn_type, TransactionType::Income);
    }
}
