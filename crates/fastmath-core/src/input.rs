//! Keystroke-prefix input policy.
//!
//! The player types the answer one character at a time. Anything that is
//! still a prefix of the answer is accepted silently; anything else is a
//! mistake, and the offending keystroke is removed.

/// How a typed value relates to the expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputVerdict {
    /// The typed value is the full answer.
    Complete,
    /// The typed value could still become the answer (includes empty input).
    Prefix,
    /// The typed value can no longer become the answer.
    Mistake,
}

/// Classify `typed` against `expected`. Surrounding whitespace is ignored.
pub fn classify(typed: &str, expected: &str) -> InputVerdict {
    let typed = typed.trim();
    if typed == expected {
        InputVerdict::Complete
    } else if expected.starts_with(typed) {
        InputVerdict::Prefix
    } else {
        InputVerdict::Mistake
    }
}

/// Drop the last keystroke of a rejected value.
///
/// Exactly one character is removed, never the whole value.
pub fn reject_keystroke(typed: &str) -> String {
    let typed = typed.trim();
    let mut chars = typed.chars();
    chars.next_back();
    chars.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_prefix_and_mistake() {
        assert_eq!(classify("56", "56"), InputVerdict::Complete);
        assert_eq!(classify(" 56\n", "56"), InputVerdict::Complete);
        assert_eq!(classify("5", "56"), InputVerdict::Prefix);
        assert_eq!(classify("", "56"), InputVerdict::Prefix);
        assert_eq!(classify("57", "56"), InputVerdict::Mistake);
        assert_eq!(classify("4", "56"), InputVerdict::Mistake);
        assert_eq!(classify("560", "56"), InputVerdict::Mistake);
    }

    #[test]
    fn non_numeric_is_a_mistake() {
        assert_eq!(classify("x", "56"), InputVerdict::Mistake);
        assert_eq!(classify("5a", "56"), InputVerdict::Mistake);
        assert_eq!(classify("-5", "56"), InputVerdict::Mistake);
    }

    #[test]
    fn reject_drops_exactly_one_char() {
        assert_eq!(reject_keystroke("57"), "5");
        assert_eq!(reject_keystroke("4"), "");
        assert_eq!(reject_keystroke("12×"), "12");
        assert_eq!(reject_keystroke(""), "");
    }
}
