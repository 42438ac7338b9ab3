use serde::{Deserialize, Serialize};

/// Semantic role of a statement column.
///
/// Closed enumeration so amount resolution can match exhaustively over the
/// debit/credit/amount combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Description,
    Debit,
    Credit,
    Amount,
    Balance,
    TxnType,
}

const DATE_KEYWORDS: &[&str] = &[
    "date",
    "datum",
    "fecha",
    "transaction date",
    "txn date",
    "value date",
    "posting date",
    "booking date",
    "boekdatum",
    "valuta",
];

const DESCRIPTION_KEYWORDS: &[&str] = &[
    "description",
    "narration",
    "particulars",
    "details",
    "omschrijving",
    "libelle",
    "descripcion",
    "beschreibung",
    "memo",
    "payee",
    "merchant",
    "transaction details",
    "concepto",
    "remarks",
    "naam",
];

const DEBIT_KEYWORDS: &[&str] = &[
    "debit",
    "withdrawal",
    "dr",
    "af",
    "debet",
    "paid out",
    "money out",
    "uitgave",
    "cargo",
    "soll",
    "retiro",
];

const CREDIT_KEYWORDS: &[&str] = &[
    "credit",
    "deposit",
    "cr",
    "bij",
    "paid in",
    "money in",
    "inkomst",
    "abono",
    "haben",
    "ingreso",
];

const AMOUNT_KEYWORDS: &[&str] = &[
    "amount",
    "bedrag",
    "montant",
    "importe",
    "betrag",
    "value",
    "amt",
];

const BALANCE_KEYWORDS: &[&str] = &[
    "balance",
    "saldo",
    "solde",
    "running balance",
    "closing balance",
    "bal",
];

const TYPE_KEYWORDS: &[&str] = &[
    "type",
    "dr/cr",
    "cr/dr",
    "transaction type",
    "mutatiesoort",
    "debit/credit",
];

/// Role probe order. A header matching several sets takes the first.
const ROLE_SETS: &[(ColumnRole, &[&str])] = &[
    (ColumnRole::Date, DATE_KEYWORDS),
    (ColumnRole::Description, DESCRIPTION_KEYWORDS),
    (ColumnRole::Debit, DEBIT_KEYWORDS),
    (ColumnRole::Credit, CREDIT_KEYWORDS),
    (ColumnRole::Amount, AMOUNT_KEYWORDS),
    (ColumnRole::Balance, BALANCE_KEYWORDS),
    (ColumnRole::TxnType, TYPE_KEYWORDS),
];

/// Lowercase and strip punctuation except `/ ( ) .`, collapsing whitespace.
pub fn normalize_header(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let kept: String = lower
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '/' | '(' | ')' | '.') {
                c
            } else {
                ' '
            }
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify a header into a column role, or `None` if nothing matches.
///
/// Short keywords (3 characters or fewer, e.g. "dr", "cr", "bal") only
/// match exactly so they cannot claim headers like "dr/cr" by substring.
pub fn classify_header(raw: &str) -> Option<ColumnRole> {
    let normalized = normalize_header(raw);
    if normalized.is_empty() {
        return None;
    }
    for (role, keywords) in ROLE_SETS {
        for kw in *keywords {
            let matched = if kw.len() <= 3 {
                normalized == *kw
            } else {
                normalized == *kw || normalized.contains(kw)
            };
            if matched {
                return Some(*role);
            }
        }
    }
    None
}

/// Header-to-role assignment for a whole header row.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub roles: Vec<Option<ColumnRole>>,
}

impl ColumnMap {
    pub fn index_of(&self, role: ColumnRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == Some(role))
    }

    pub fn has(&self, role: ColumnRole) -> bool {
        self.index_of(role).is_some()
    }

    /// A mapping is usable only with a date column and at least one
    /// money-bearing column.
    pub fn is_usable(&self) -> bool {
        self.has(ColumnRole::Date)
            && (self.has(ColumnRole::Amount)
                || self.has(ColumnRole::Debit)
                || self.has(ColumnRole::Credit))
    }
}

/// Map every header to a role. Each role is claimed once (first header
/// wins); if nothing claims description, the first unclaimed header is
/// used so every mapping has some description source when possible.
pub fn map_headers<S: AsRef<str>>(headers: &[S]) -> ColumnMap {
    let mut roles: Vec<Option<ColumnRole>> = Vec::with_capacity(headers.len());
    for header in headers {
        let candidate = classify_header(header.as_ref());
        let role = match candidate {
            Some(r) if roles.contains(&Some(r)) => None,
            other => other,
        };
        roles.push(role);
    }

    if !roles.contains(&Some(ColumnRole::Description)) {
        if let Some(slot) = roles.iter_mut().find(|r| r.is_none()) {
            *slot = Some(ColumnRole::Description);
        }
    }

    ColumnMap { roles }
}
