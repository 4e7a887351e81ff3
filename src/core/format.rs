use super::normalizer::finite_or_zero;

/// Two-decimal currency with thousands separators, e.g. `$1,234,567.89`.
/// Non-finite amounts render as `$0.00`.
pub fn format_currency(amount: f64) -> String {
    let amount = finite_or_zero(amount);
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // Rounding can turn a tiny negative into "0.00"; never print "-$0.00".
    let sign = if amount < 0.0 && fixed != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

/// A value already in percent units, e.g. `12.5` -> `12.50%`.
pub fn format_percent(pct: f64) -> String {
    format!("{:.2}%", finite_or_zero(pct))
}

/// A fraction rendered as a percentage, e.g. `0.0125` -> `1.25%`.
pub fn format_rate(fraction: f64) -> String {
    format_percent(finite_or_zero(fraction) * 100.0)
}

/// Longest leading decimal number in `text`, ignoring leading whitespace.
/// Accepts an optional sign, digits, one decimal point and more digits.
fn parse_numeric_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }
    text[..end].parse::<f64>().ok()
}

/// Lenient currency parsing for masked input: keeps digits, `.`, `,` and `-`,
/// drops thousands separators and any decimal point after the first. Returns
/// 0 when nothing numeric remains.
pub fn parse_currency(text: &str) -> f64 {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();

    let clean = match kept.split_once('.') {
        Some((before, after)) => format!("{before}.{}", after.replace('.', "")),
        None => kept,
    };
    parse_numeric_prefix(&clean).unwrap_or(0.0)
}

/// Percent text such as `"12.5%"` or `"12,5"`; `None` when nothing numeric
/// can be read, so callers keep their previous value.
pub fn parse_percent(text: &str) -> Option<f64> {
    let clean = text.replace('%', "").replacen(',', ".", 1);
    parse_numeric_prefix(&clean)
}
