use crate::model::Currency;

/// One way a currency can show up in statement text.
enum Pattern {
    /// Literal currency symbol, weight 3.
    Symbol(&'static str),
    /// ISO code on a word boundary, weight 2.
    Iso(&'static str),
    /// Descriptive word on a word boundary, weight 1.
    Word(&'static str),
}

struct Descriptor {
    code: &'static str,
    symbol: &'static str,
    name: &'static str,
    locale: &'static str,
    patterns: &'static [Pattern],
}

/// Static catalog. Order matters: ties keep the first entry examined.
static CATALOG: &[Descriptor] = &[
    Descriptor {
        code: "USD",
        symbol: "$",
        name: "US Dollar",
        locale: "en-US",
        patterns: &[
            Pattern::Symbol("$"),
            Pattern::Iso("USD"),
            Pattern::Word("dollar"),
            Pattern::Word("dollars"),
        ],
    },
    Descriptor {
        code: "EUR",
        symbol: "€",
        name: "Euro",
        locale: "de-DE",
        patterns: &[
            Pattern::Symbol("€"),
            Pattern::Iso("EUR"),
            Pattern::Word("euro"),
            Pattern::Word("euros"),
        ],
    },
    Descriptor {
        code: "GBP",
        symbol: "£",
        name: "British Pound",
        locale: "en-GB",
        patterns: &[
            Pattern::Symbol("£"),
            Pattern::Iso("GBP"),
            Pattern::Word("pound"),
            Pattern::Word("sterling"),
        ],
    },
    Descriptor {
        code: "INR",
        symbol: "₹",
        name: "Indian Rupee",
        locale: "en-IN",
        patterns: &[
            Pattern::Symbol("₹"),
            Pattern::Symbol("Rs."),
            Pattern::Iso("INR"),
            Pattern::Word("rupee"),
            Pattern::Word("rupees"),
        ],
    },
    Descriptor {
        code: "JPY",
        symbol: "¥",
        name: "Japanese Yen",
        locale: "ja-JP",
        patterns: &[Pattern::Symbol("¥"), Pattern::Iso("JPY"), Pattern::Word("yen")],
    },
    Descriptor {
        code: "CNY",
        symbol: "元",
        name: "Chinese Yuan",
        locale: "zh-CN",
        patterns: &[
            Pattern::Symbol("元"),
            Pattern::Iso("CNY"),
            Pattern::Iso("RMB"),
            Pattern::Word("yuan"),
        ],
    },
    Descriptor {
        code: "AUD",
        symbol: "A$",
        name: "Australian Dollar",
        locale: "en-AU",
        patterns: &[Pattern::Symbol("A$"), Pattern::Iso("AUD")],
    },
    Descriptor {
        code: "CAD",
        symbol: "C$",
        name: "Canadian Dollar",
        locale: "en-CA",
        patterns: &[Pattern::Symbol("C$"), Pattern::Iso("CAD")],
    },
    Descriptor {
        code: "CHF",
        symbol: "Fr.",
        name: "Swiss Franc",
        locale: "de-CH",
        patterns: &[Pattern::Iso("CHF"), Pattern::Word("franc")],
    },
    Descriptor {
        code: "SGD",
        symbol: "S$",
        name: "Singapore Dollar",
        locale: "en-SG",
        patterns: &[Pattern::Symbol("S$"), Pattern::Iso("SGD")],
    },
    Descriptor {
        code: "AED",
        symbol: "د.إ",
        name: "UAE Dirham",
        locale: "ar-AE",
        patterns: &[Pattern::Symbol("د.إ"), Pattern::Iso("AED"), Pattern::Word("dirham")],
    },
    Descriptor {
        code: "ZAR",
        symbol: "R",
        name: "South African Rand",
        locale: "en-ZA",
        patterns: &[Pattern::Iso("ZAR"), Pattern::Word("rand")],
    },
    Descriptor {
        code: "BRL",
        symbol: "R$",
        name: "Brazilian Real",
        locale: "pt-BR",
        patterns: &[Pattern::Symbol("R$"), Pattern::Iso("BRL"), Pattern::Word("real")],
    },
    Descriptor {
        code: "SEK",
        symbol: "kr",
        name: "Swedish Krona",
        locale: "sv-SE",
        patterns: &[Pattern::Symbol("kr"), Pattern::Iso("SEK"), Pattern::Word("krona")],
    },
    Descriptor {
        code: "NOK",
        symbol: "kr",
        name: "Norwegian Krone",
        locale: "nb-NO",
        patterns: &[Pattern::Iso("NOK"), Pattern::Word("krone")],
    },
    Descriptor {
        code: "DKK",
        symbol: "kr",
        name: "Danish Krone",
        locale: "da-DK",
        patterns: &[Pattern::Iso("DKK")],
    },
    Descriptor {
        code: "PLN",
        symbol: "zł",
        name: "Polish Zloty",
        locale: "pl-PL",
        patterns: &[Pattern::Symbol("zł"), Pattern::Iso("PLN"), Pattern::Word("zloty")],
    },
    Descriptor {
        code: "MXN",
        symbol: "Mex$",
        name: "Mexican Peso",
        locale: "es-MX",
        patterns: &[Pattern::Symbol("Mex$"), Pattern::Iso("MXN"), Pattern::Word("peso")],
    },
    Descriptor {
        code: "NGN",
        symbol: "₦",
        name: "Nigerian Naira",
        locale: "en-NG",
        patterns: &[Pattern::Symbol("₦"), Pattern::Iso("NGN"), Pattern::Word("naira")],
    },
    Descriptor {
        code: "KES",
        symbol: "KSh",
        name: "Kenyan Shilling",
        locale: "en-KE",
        patterns: &[Pattern::Symbol("KSh"), Pattern::Iso("KES"), Pattern::Word("shilling")],
    },
    Descriptor {
        code: "THB",
        symbol: "฿",
        name: "Thai Baht",
        locale: "th-TH",
        patterns: &[Pattern::Symbol("฿"), Pattern::Iso("THB"), Pattern::Word("baht")],
    },
    Descriptor {
        code: "IDR",
        symbol: "Rp",
        name: "Indonesian Rupiah",
        locale: "id-ID",
        patterns: &[Pattern::Symbol("Rp"), Pattern::Iso("IDR"), Pattern::Word("rupiah")],
    },
    Descriptor {
        code: "TRY",
        symbol: "₺",
        name: "Turkish Lira",
        locale: "tr-TR",
        patterns: &[Pattern::Symbol("₺"), Pattern::Iso("TRY"), Pattern::Word("lira")],
    },
    Descriptor {
        code: "RUB",
        symbol: "₽",
        name: "Russian Ruble",
        locale: "ru-RU",
        patterns: &[Pattern::Symbol("₽"), Pattern::Iso("RUB"), Pattern::Word("ruble")],
    },
    Descriptor {
        code: "KRW",
        symbol: "₩",
        name: "South Korean Won",
        locale: "ko-KR",
        patterns: &[Pattern::Symbol("₩"), Pattern::Iso("KRW"), Pattern::Word("won")],
    },
    Descriptor {
        code: "HKD",
        symbol: "HK$",
        name: "Hong Kong Dollar",
        locale: "zh-HK",
        patterns: &[Pattern::Symbol("HK$"), Pattern::Iso("HKD")],
    },
];

const HEAD_SAMPLE: usize = 5_000;
const TAIL_SAMPLE: usize = 2_000;

const SYMBOL_WEIGHT: usize = 3;
const ISO_WEIGHT: usize = 2;
const WORD_WEIGHT: usize = 1;

/// Detect the statement currency from sampled document text.
///
/// Samples the first 5,000 and last 2,000 characters to bound cost on
/// large documents, then scores every catalog entry by weighted pattern
/// occurrence counts. Ties keep the first entry; a best score of zero
/// means no detection.
pub fn detect(text: &str) -> Option<Currency> {
    let sample = sample_text(text);
    let lower = sample.to_lowercase();

    let mut best: Option<(&Descriptor, usize)> = None;
    for descriptor in CATALOG {
        let mut score = 0;
        for pattern in descriptor.patterns {
            score += match pattern {
                Pattern::Symbol(sym) => sample.matches(sym).count() * SYMBOL_WEIGHT,
                Pattern::Iso(code) => count_word(&lower, &code.to_lowercase()) * ISO_WEIGHT,
                Pattern::Word(word) => count_word(&lower, word) * WORD_WEIGHT,
            };
        }
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((descriptor, score));
        }
    }

    best.map(|(d, _)| Currency {
        code: d.code.to_string(),
        symbol: d.symbol.to_string(),
        name: d.name.to_string(),
        locale: d.locale.to_string(),
    })
}

fn sample_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= HEAD_SAMPLE + TAIL_SAMPLE {
        return text.to_string();
    }
    let head: String = chars[..HEAD_SAMPLE].iter().collect();
    let tail: String = chars[chars.len() - TAIL_SAMPLE..].iter().collect();
    format!("{head} {tail}")
}

/// Count word-boundary occurrences of `word` in lowercased `haystack`.
fn count_word(haystack: &str, word: &str) -> usize {
    if word.is_empty() {
        return 0;
    }
    haystack
        .match_indices(word)
        .filter(|(idx, m)| {
            let before_ok = haystack[..*idx]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let after_ok = haystack[idx + m.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            before_ok && after_ok
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_detection() {
        let c = detect("Paid ₹500 via UPI").unwrap();
        assert_eq!(c.code, "INR");
    }

    #[test]
    fn test_iso_code_detection() {
        let c = detect("Closing balance 1,240.00 GBP").unwrap();
        assert_eq!(c.code, "GBP");
    }

    #[test]
    fn test_word_detection() {
        let c = detect("All amounts in euros unless stated").unwrap();
        assert_eq!(c.code, "EUR");
    }

    #[test]
    fn test_symbol_outweighs_word() {
        // Two $ symbols (6) beat one mention of rupees (1).
        let c = detect("$100 and $200, not rupees").unwrap();
        assert_eq!(c.code, "USD");
    }

    #[test]
    fn test_no_match() {
        assert!(detect("nothing monetary here").is_none());
    }

    #[test]
    fn test_iso_word_boundary() {
        // "USDA" must not count as USD.
        assert!(detect("USDA report").is_none());
    }

    #[test]
    fn test_large_document_sampled() {
        let mut text = "x".repeat(20_000);
        text.push_str(" total in EUR");
        let c = detect(&text).unwrap();
        assert_eq!(c.code, "EUR");
    }
}
