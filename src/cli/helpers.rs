//! Shared helper functions for CLI commands

use crate::entities::product::Product;

/// Makes shown before the list is summarized as `+N`
const MAKES_SHOWN: usize = 3;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Compact list of the makes a product fits, e.g. `NISSAN, TOYOTA +2`
pub fn makes_summary(product: &Product) -> String {
    let makes = product.makes();
    if makes.is_empty() {
        return "universal".to_string();
    }
    let shown = makes[..makes.len().min(MAKES_SHOWN)].join(", ");
    if makes.len() > MAKES_SHOWN {
        format!("{} +{}", shown, makes.len() - MAKES_SHOWN)
    } else {
        shown
    }
}

/// Split `key=value`; the value may itself contain `=`
pub fn split_assignment(s: &str) -> Option<(&str, &str)> {
    let (key, value) = s.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
