use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

/// Element selectors scanned for balance-like text, in priority order.
///
/// Class-substring selectors first, then generic text-bearing elements as a
/// catch-all; the target page's markup is unstable across releases and the
/// broad tail keeps minor redesigns survivable.
pub const BALANCE_SELECTORS: &[&str] = &[
    "[class*=\"balance\"]",
    "[class*=\"credit\"]",
    "[class*=\"amount\"]",
    "[class*=\"quota\"]",
    "h1, h2, h3, strong, b",
    "span, td, li, p, div",
];

/// URL substrings that mark an intercepted request as a balance candidate.
pub const ENDPOINT_KEYWORDS: &[&str] = &["balance", "credit", "quota"];

/// JSON keys considered to hold a balance amount.
const AMOUNT_KEYS: &[&str] = &["balance", "credit", "quota", "amount"];

/// Maximum length, in chars, of a raw page-text sample.
pub const RAW_SAMPLE_MAX: usize = 500;

lazy_static! {
    static ref CURRENCY_RE: Regex =
        Regex::new(r"[$€£¥￥]\s*\d[\d,]*(?:\.\d+)?").unwrap();
    static ref DECIMAL_RE: Regex = Regex::new(r"\b\d+(?:,\d{3})*\.\d{2}\b").unwrap();
}

/// A balance-like fragment found in rendered text.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSignal {
    pub amount: f64,
    /// The exact matched substring, glyph included; recorded as the source.
    pub matched: String,
}

/// Inspect one rendered text for a balance signal.
///
/// A currency glyph wins over a bare decimal amount; the bare form requires
/// exactly two fractional digits so timestamps and version strings don't
/// qualify.
pub fn balance_signal(text: &str) -> Option<BalanceSignal> {
    if let Some(m) = CURRENCY_RE.find(text) {
        if let Some(amount) = parse_amount(m.as_str()) {
            return Some(BalanceSignal {
                amount,
                matched: m.as_str().to_string(),
            });
        }
    }

    if let Some(m) = DECIMAL_RE.find(text) {
        if let Some(amount) = parse_amount(m.as_str()) {
            return Some(BalanceSignal {
                amount,
                matched: m.as_str().to_string(),
            });
        }
    }

    None
}

/// First accepted signal wins; the chain never aggregates matches.
///
/// Callers supply texts already ordered by selector priority and document
/// order, which is the tie-break.
pub fn first_signal<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<BalanceSignal> {
    texts.into_iter().find_map(balance_signal)
}

/// Whether an intercepted request URL looks like the platform's balance API.
pub fn is_balance_endpoint(url: &str) -> bool {
    let url = url.to_lowercase();
    ENDPOINT_KEYWORDS.iter().any(|kw| url.contains(kw))
}

/// Search a structured response for a balance amount.
///
/// Numbers (or numeric strings) are only accepted once the walk has passed
/// through a key containing one of [`AMOUNT_KEYS`]; a bare top-level number
/// counts as well. Object keys are visited in serde_json's deterministic
/// order.
pub fn amount_from_json(value: &Value) -> Option<f64> {
    if let Value::Number(n) = value {
        return n.as_f64();
    }
    walk(value, false)
}

fn walk(value: &Value, keyed: bool) -> Option<f64> {
    match value {
        Value::Number(n) if keyed => n.as_f64(),
        Value::String(s) if keyed => parse_amount(s),
        Value::Object(map) => map.iter().find_map(|(key, nested)| {
            let key = key.to_lowercase();
            let keyed = keyed || AMOUNT_KEYS.iter().any(|k| key.contains(k));
            walk(nested, keyed)
        }),
        Value::Array(items) => items.iter().find_map(|item| walk(item, keyed)),
        _ => None,
    }
}

/// Char-boundary-safe prefix of at most `max_chars` characters.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn parse_amount(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}
