//! Amount parsing and formatting at the string boundary.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Inside the engine every amount is a `rust_decimal::Decimal`. Raw strings
//! only exist at the edges: form inputs, voice transcripts and stored
//! result labels. These functions are the only crossing points.

use rust_decimal::{Decimal, RoundingStrategy};

/// Prefix of a rendered calculation result (`"Total: 12.0"`).
pub const RESULT_PREFIX: &str = "Total: ";

/// Parses the leading decimal literal of `raw`.
///
/// Surrounding whitespace is ignored, and so is anything after a valid
/// numeric prefix: `"12dh"` reads as 12, `"-3.5 "` as -3.5, `".5"` as 0.5.
/// Returns `None` when no digits can be read at the start of the input.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let bytes = s.as_bytes();

    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_part = &s[int_start..pos];

    let mut frac_part = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_part = &s[frac_start..frac_end];
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut literal = String::with_capacity(int_part.len() + frac_part.len() + 3);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        literal.push('.');
        literal.push_str(frac_part);
    }

    literal.parse::<Decimal>().ok()
}

/// Rounds an amount to the one-decimal display precision (half away from zero).
#[must_use]
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums amounts, clamping at the `Decimal` range instead of overflowing.
#[must_use]
pub fn saturating_sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Renders an amount with exactly one fractional digit.
///
/// Rounds half away from zero. Never uses scientific notation or thousands
/// separators, and never renders a negative zero.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = round_amount(amount);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(1);
    rounded.to_string()
}

/// Builds the result label shown for a computed total.
#[must_use]
pub fn result_label(total: Decimal) -> String {
    format!("{RESULT_PREFIX}{}", format_amount(total))
}

/// Reads a stored result label back into an amount.
///
/// Labels without the prefix are parsed as-is; unreadable labels give `None`.
#[must_use]
pub fn parse_result_label(label: &str) -> Option<Decimal> {
    let trimmed = label.trim();
    parse_amount(trimmed.strip_prefix(RESULT_PREFIX.trim_end()).unwrap_or(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_amount("5"), Some(dec!(5)));
        assert_eq!(parse_amount("  12.5 "), Some(dec!(12.5)));
        assert_eq!(parse_amount("-3"), Some(dec!(-3)));
        assert_eq!(parse_amount("+4"), Some(dec!(4)));
    }

    #[test]
    fn test_parse_partial_literals() {
        assert_eq!(parse_amount(".5"), Some(dec!(0.5)));
        assert_eq!(parse_amount("5."), Some(dec!(5)));
        assert_eq!(parse_amount("12dh"), Some(dec!(12)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("."), None);
        assert_eq!(parse_amount("<span>5</span>"), None);
    }

    #[test]
    fn test_format_one_decimal() {
        assert_eq!(format_amount(dec!(7)), "7.0");
        assert_eq!(format_amount(Decimal::ZERO), "0.0");
        assert_eq!(format_amount(dec!(12.34)), "12.3");
        assert_eq!(format_amount(dec!(12.35)), "12.4");
        assert_eq!(format_amount(dec!(-2.25)), "-2.3");
        assert_eq!(format_amount(dec!(1234567)), "1234567.0");
    }

    #[test]
    fn test_format_never_negative_zero() {
        assert_eq!(format_amount(dec!(-0.04)), "0.0");
    }

    #[test]
    fn test_result_label_round_trip() {
        assert_eq!(result_label(dec!(101)), "Total: 101.0");
        assert_eq!(parse_result_label("Total: 101.0"), Some(dec!(101.0)));
        assert_eq!(parse_result_label("Total: -4.5"), Some(dec!(-4.5)));
        assert_eq!(parse_result_label(""), None);
    }
}
