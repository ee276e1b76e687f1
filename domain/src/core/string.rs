//! String utilities for the domain layer.

use std::collections::BTreeSet;

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Lowercased alphanumeric terms longer than two characters.
///
/// Used for query-term overlap scoring; short words ("a", "is", "of")
/// carry no signal.
pub fn terms(s: &str) -> BTreeSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes; cutting inside it must back up
        assert_eq!(truncate("ééééé", 6), "é...");
    }

    #[test]
    fn test_terms_filters_short_words() {
        let t = terms("Is the Market going UP in 2030?");
        assert!(t.contains("market"));
        assert!(t.contains("going"));
        assert!(t.contains("2030"));
        assert!(!t.contains("is"));
        assert!(!t.contains("up"));
    }
}
