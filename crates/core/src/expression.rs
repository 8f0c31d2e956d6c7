//! Sum-expression evaluation.
//!
//! Free-text detail fields hold amounts joined by `+` (`"30 + 20"`).
//! Terms that do not read as numbers are dropped without error: stray
//! characters from keyboard or voice input must never block a calculation.
//!
//! Settled items are wrapped in `<span …>…</span>` markup and may hold a
//! whole `+`-joined group. A span is always one segment, so nothing inside
//! it is ever read as a live amount.

use caisse_shared::types::parse_amount;
use rust_decimal::Decimal;

/// Term separator in a sum expression.
pub const TERM_SEPARATOR: char = '+';

const SPAN_OPEN: &str = "<span";
const SPAN_CLOSE: &str = "</span>";

/// Splits `expr` on the separators that sit outside any markup span.
///
/// Segments are returned untrimmed and in order. An unclosed span runs to
/// the end of the expression.
pub fn segments(expr: &str) -> impl Iterator<Item = &str> + '_ {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut skip_to = 0;

    for (i, ch) in expr.char_indices() {
        if i < skip_to {
            continue;
        }
        let rest = &expr[i..];
        if rest.starts_with(SPAN_CLOSE) {
            depth = depth.saturating_sub(1);
            skip_to = i + SPAN_CLOSE.len();
        } else if rest.starts_with(SPAN_OPEN) {
            depth += 1;
            skip_to = i + SPAN_OPEN.len();
        } else if ch == TERM_SEPARATOR && depth == 0 {
            parts.push(&expr[start..i]);
            start = i + ch.len_utf8();
        }
    }
    parts.push(&expr[start..]);
    parts.into_iter()
}

/// Returns the numeric terms of `expr`, in order, skipping unreadable ones
/// and struck spans.
pub fn terms(expr: &str) -> impl Iterator<Item = Decimal> + '_ {
    segments(expr).filter_map(parse_amount)
}

/// Evaluates a sum expression.
///
/// Returns zero for an empty expression or when no term parses. A term that
/// would overflow the running sum is dropped like any other unreadable term.
#[must_use]
pub fn evaluate(expr: &str) -> Decimal {
    terms(expr).fold(Decimal::ZERO, |sum, term| sum.checked_add(term).unwrap_or(sum))
}
