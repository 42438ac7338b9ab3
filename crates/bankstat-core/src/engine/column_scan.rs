use chrono::NaiveDate;

use crate::engine::{build_transaction, dedup, detect_order, resolve_amount, AmountParts};
use crate::extraction::layout::Line;
use crate::model::{SkippedLine, Transaction};
use crate::parsing::amounts::clean_amount;
use crate::parsing::columns::{classify_header, ColumnRole};
use crate::parsing::dates;
use crate::parsing::dates::DateOrder;

/// How many leading lines are scanned for a header row.
const HEADER_SCAN_LINES: usize = 60;
/// Estimated horizontal width per header character, in layout units.
const CHAR_WIDTH: f32 = 6.0;
/// Fragments within this margin of a column's span get a distance discount.
const IN_RANGE_MARGIN: f32 = 40.0;
const IN_RANGE_DISCOUNT: f32 = 0.5;
/// Effective distance beyond which a fragment stays unassigned.
const ASSIGNMENT_CAP: f32 = 100.0;

const VALUE_ROLES: &[ColumnRole] = &[
    ColumnRole::Debit,
    ColumnRole::Credit,
    ColumnRole::Amount,
    ColumnRole::Balance,
];

/// A detected statement column: role plus horizontal extent.
#[derive(Debug, Clone)]
pub(crate) struct ColumnDefinition {
    pub role: ColumnRole,
    pub start: f32,
    pub end: f32,
}

impl ColumnDefinition {
    fn center(&self) -> f32 {
        (self.start + self.end) / 2.0
    }
}

/// Pick the closest column among `roles` for a fragment at `x`.
///
/// Pure over its inputs: effective distance is the distance to the column
/// center, halved when x falls within the column span widened by the
/// margin; anything beyond the cap stays unassigned.
pub(crate) fn nearest_column<'a>(
    x: f32,
    columns: &'a [ColumnDefinition],
    roles: &[ColumnRole],
) -> Option<&'a ColumnDefinition> {
    let mut best: Option<(&ColumnDefinition, f32)> = None;
    for col in columns.iter().filter(|c| roles.contains(&c.role)) {
        let mut distance = (x - col.center()).abs();
        if x >= col.start - IN_RANGE_MARGIN && x <= col.end + IN_RANGE_MARGIN {
            distance *= IN_RANGE_DISCOUNT;
        }
        if distance <= ASSIGNMENT_CAP && best.map_or(true, |(_, d)| distance < d) {
            best = Some((col, distance));
        }
    }
    best.map(|(c, _)| c)
}

/// Mutable accumulator for the transaction currently being assembled.
#[derive(Debug)]
struct Candidate {
    date: NaiveDate,
    description: Vec<String>,
    debit: Option<f64>,
    credit: Option<f64>,
    amount: Option<f64>,
    balance: Option<f64>,
    type_text: Option<String>,
    source: String,
}

impl Candidate {
    fn new(date: NaiveDate, source: String) -> Self {
        Candidate {
            date,
            description: Vec::new(),
            debit: None,
            credit: None,
            amount: None,
            balance: None,
            type_text: None,
            source,
        }
    }
}

/// Line-scan state: either between transactions or accumulating one.
enum ScanState {
    NoPending,
    Pending(Candidate),
}

/// Column-position extraction over reconstructed lines.
///
/// Finds a header row, derives column spans from its fragments, then walks
/// the remaining lines with a two-state scan: a dated line finalizes any
/// open candidate and opens a new one; an undated line is a continuation
/// merged into the open candidate.
pub(crate) fn extract(lines: &[Line], skipped: &mut Vec<SkippedLine>) -> Vec<Transaction> {
    let Some((header_idx, columns)) = find_header(lines) else {
        return Vec::new();
    };

    let order = detect_order(&lines[header_idx + 1..]);

    let mut out = Vec::new();
    let mut state = ScanState::NoPending;

    for line in &lines[header_idx + 1..] {
        if let Some((date, date_idx)) = find_line_date(line, order) {
            if let ScanState::Pending(candidate) =
                std::mem::replace(&mut state, ScanState::NoPending)
            {
                finalize(candidate, &columns, &mut out, skipped);
            }
            let mut candidate = Candidate::new(date, line.text());
            distribute(&mut candidate, line, Some(date_idx), &columns);
            state = ScanState::Pending(candidate);
        } else if let ScanState::Pending(candidate) = &mut state {
            candidate.source.push(' ');
            candidate.source.push_str(&line.text());
            distribute(candidate, line, None, &columns);
        }
    }

    if let ScanState::Pending(candidate) = state {
        finalize(candidate, &columns, &mut out, skipped);
    }

    dedup(out)
}

/// Scan the leading lines for a header row: classifiable fragments that
/// include a date role, at least one money role and two classified
/// fragments in total.
fn find_header(lines: &[Line]) -> Option<(usize, Vec<ColumnDefinition>)> {
    for (i, line) in lines.iter().take(HEADER_SCAN_LINES).enumerate() {
        let mut columns: Vec<ColumnDefinition> = Vec::new();
        for frag in &line.fragments {
            if let Some(role) = classify_header(&frag.text) {
                if columns.iter().any(|c| c.role == role) {
                    continue;
                }
                columns.push(ColumnDefinition {
                    role,
                    start: frag.x,
                    end: frag.x + frag.text.chars().count() as f32 * CHAR_WIDTH,
                });
            }
        }
        let has_date = columns.iter().any(|c| c.role == ColumnRole::Date);
        let has_money = columns.iter().any(|c| {
            matches!(
                c.role,
                ColumnRole::Debit | ColumnRole::Credit | ColumnRole::Amount
            )
        });
        if columns.len() >= 2 && has_date && has_money {
            return Some((i, columns));
        }
    }
    None
}

fn find_line_date(line: &Line, order: DateOrder) -> Option<(NaiveDate, usize)> {
    for (i, frag) in line.fragments.iter().enumerate() {
        if let Some(date) = dates::parse_with_order(&frag.text, order)
            .or_else(|| dates::extract_date_from_text(&frag.text, order))
        {
            return Some((date, i));
        }
    }
    None
}

/// Assign a line's fragments to the open candidate. Numeric fragments go
/// to the nearest value column (unassignable ones, e.g. reference numbers,
/// are ignored); other fragments feed the type indicator or description.
fn distribute(
    candidate: &mut Candidate,
    line: &Line,
    date_idx: Option<usize>,
    columns: &[ColumnDefinition],
) {
    for (i, frag) in line.fragments.iter().enumerate() {
        if Some(i) == date_idx {
            continue;
        }

        if let Some(value) = clean_amount(&frag.text) {
            if let Some(col) = nearest_column(frag.x, columns, VALUE_ROLES) {
                let slot = match col.role {
                    ColumnRole::Debit => &mut candidate.debit,
                    ColumnRole::Credit => &mut candidate.credit,
                    ColumnRole::Amount => &mut candidate.amount,
                    ColumnRole::Balance => &mut candidate.balance,
                    _ => continue,
                };
                slot.get_or_insert(value);
            }
            continue;
        }

        if nearest_column(frag.x, columns, &[ColumnRole::TxnType]).is_some() {
            candidate
                .type_text
                .get_or_insert_with(|| frag.text.clone());
            continue;
        }

        candidate.description.push(frag.text.clone());
    }
}

fn finalize(
    candidate: Candidate,
    columns: &[ColumnDefinition],
    out: &mut Vec<Transaction>,
    skipped: &mut Vec<SkippedLine>,
) {
    let has = |role: ColumnRole| columns.iter().any(|c| c.role == role);
    let parts = AmountParts {
        debit: candidate.debit,
        credit: candidate.credit,
        amount: candidate.amount,
        has_debit_column: has(ColumnRole::Debit),
        has_credit_column: has(ColumnRole::Credit),
        has_amount_column: has(ColumnRole::Amount),
        type_text: candidate.type_text,
    };

    match resolve_amount(&parts) {
        Some((amount, txn_type)) => {
            out.push(build_transaction(
                out.len(),
                candidate.date,
                &candidate.description.join(" "),
                amount,
                txn_type,
                candidate.balance,
                &candidate.source,
            ));
        }
        None => skipped.push(SkippedLine {
            line_text: candidate.source.chars().take(200).collect(),
            reason: "no resolvable nonzero amount".into(),
        }),
    }
}
