/// Normalize a locale-formatted amount string to a signed value.
///
/// Handles currency symbols, thousands separators in both comma and dot
/// conventions, parenthesized negatives and leading minus signs. Returns
/// `None` for empty, non-numeric and exactly-zero input; zero-amount rows
/// are not transactions.
pub fn clean_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut negative = false;
    let mut body = trimmed;
    if body.starts_with('(') && body.ends_with(')') && body.len() >= 2 {
        negative = true;
        body = body[1..body.len() - 1].trim();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = true;
        body = rest;
    }

    // Everything that is not a digit or a separator is a currency symbol,
    // group mark or whitespace.
    let digits: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let normalized = match (digits.rfind(','), digits.rfind('.')) {
        (Some(comma), dot) if dot.map_or(true, |d| comma > d) => {
            let after = &digits[comma + 1..];
            if (1..=2).contains(&after.len()) && after.chars().all(|c| c.is_ascii_digit()) {
                // Comma is the decimal mark; dots are thousands separators.
                let mut n = digits[..comma].replace('.', "");
                n.push('.');
                n.push_str(after);
                n
            } else {
                digits.replace(',', "")
            }
        }
        _ => digits.replace(',', ""),
    };

    let value: f64 = normalized.parse().ok()?;
    if value == 0.0 {
        return None;
    }
    Some(if negative { -value } else { value })
}
