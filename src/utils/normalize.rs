use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One uppercase letter followed by a period at the start of the answer.
    static ref CHOICE_LETTER_RE: Regex = Regex::new(r"^\s*([A-Z])\.").unwrap();
}

/// Canonical form for short-answer comparison: lowercase with whitespace,
/// hyphens, underscores and periods removed.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Leading choice letter of a multiple-choice answer ("B. Heap" -> "B").
/// Case is preserved, so "b. heap" has no choice letter.
pub fn extract_choice_letter(text: &str) -> Option<String> {
    CHOICE_LETTER_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Comparison token for multiple choice: the choice letter when present,
/// otherwise the trimmed text as stored.
pub fn choice_token(text: &str) -> String {
    extract_choice_letter(text).unwrap_or_else(|| text.trim().to_string())
}

pub fn is_bare_letter(text: &str) -> bool {
    let mut chars = text.trim().chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize("Try-Catch"), "trycatch");
        assert_eq!(normalize("trycatch"), "trycatch");
        assert_eq!(normalize("TRY CATCH"), "trycatch");
        assert_eq!(normalize(" try_catch. "), "trycatch");
        assert_ne!(normalize("trycatch"), normalize("catchtry"));
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" - _ ."), "");
    }

    #[test]
    fn test_extract_choice_letter() {
        assert_eq!(extract_choice_letter("A. final"), Some("A".to_string()));
        assert_eq!(extract_choice_letter("  C. heap"), Some("C".to_string()));
        assert_eq!(extract_choice_letter("a. final"), None);
        assert_eq!(extract_choice_letter("A final"), None);
        assert_eq!(extract_choice_letter(""), None);
    }

    #[test]
    fn test_choice_token_falls_back_to_text() {
        assert_eq!(choice_token("B. stack"), "B");
        assert_eq!(choice_token(" B "), "B");
        assert_eq!(choice_token("a. foo"), "a. foo");
    }

    #[test]
    fn test_is_bare_letter() {
        assert!(is_bare_letter("A"));
        assert!(is_bare_letter(" c "));
        assert!(!is_bare_letter("AB"));
        assert!(!is_bare_letter("1"));
        assert!(!is_bare_letter(""));
    }
}
