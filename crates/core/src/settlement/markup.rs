//! Strike-through markup for settled detail items.
//!
//! Settled amounts are wrapped in `<span class="line-through">…</span>`.
//! Renderers depend on this exact form.

/// Opening tag of a settled item.
pub const STRIKE_OPEN: &str = r#"<span class="line-through">"#;

/// Closing tag of a settled item.
pub const STRIKE_CLOSE: &str = "</span>";

/// Wraps `text` in strike markup.
#[must_use]
pub fn strike(text: &str) -> String {
    format!("{STRIKE_OPEN}{text}{STRIKE_CLOSE}")
}

/// Returns true if the whole of `details` sits inside one struck span.
///
/// Nested spans count, so a re-struck partial settlement is still struck.
#[must_use]
pub fn is_struck(details: &str) -> bool {
    let trimmed = details.trim();
    if !trimmed.starts_with(STRIKE_OPEN) || !trimmed.ends_with(STRIKE_CLOSE) {
        return false;
    }

    let mut depth = 0usize;
    let mut rest = trimmed;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(STRIKE_OPEN) {
            depth += 1;
            rest = after;
        } else if let Some(after) = rest.strip_prefix(STRIKE_CLOSE) {
            depth = depth.saturating_sub(1);
            rest = after;
            if depth == 0 {
                return rest.is_empty();
            }
        } else {
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str();
        }
    }
    false
}
