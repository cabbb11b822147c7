use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("number pattern is valid"));

/// Returns the first number (optionally with a decimal part) found in the raw SNMP output.
///
/// ```rust
/// # use check_storsafe::extract_number;
/// assert_eq!(extract_number("\"96.5 %\""), Some(96.5));
/// assert_eq!(extract_number("No Such Object"), None);
/// ```
pub fn extract_number(raw: &str) -> Option<f64> {
    NUMBER
        .find(raw)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Returns the text after the last colon with surrounding whitespace and quotes removed. Output
/// without a colon is taken as a whole. Empty results are treated as missing.
pub fn extract_text(raw: &str) -> Option<String> {
    let tail = match raw.rfind(':') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };

    let text = tail.trim().trim_matches('"').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}
