//! Common special characters: `.`, anchors and the class shorthands

use crate::pattern::{Pattern, Precedence};
use crate::sets::{CharSet, Shorthand};

/// Any character except a newline (unless dot-matches-newline is set)
pub fn any() -> Pattern {
    Pattern::new(".", Precedence::Atom)
}

/// Start of the text (or of a line in multiline mode)
pub fn start() -> Pattern {
    Pattern::new("^", Precedence::Concatenation).with_zero_width(true)
}

/// End of the text (or of a line in multiline mode)
pub fn end() -> Pattern {
    Pattern::new("$", Precedence::Concatenation).with_zero_width(true)
}

/// `\s`
pub fn whitespace() -> CharSet {
    CharSet::class(Shorthand::Whitespace)
}

/// `\S`
pub fn not_whitespace() -> CharSet {
    CharSet::class(Shorthand::NotWhitespace)
}

/// `\w`
pub fn word() -> CharSet {
    CharSet::class(Shorthand::Word)
}

/// `\W`
pub fn not_word() -> CharSet {
    CharSet::class(Shorthand::NotWord)
}

/// `\d`
pub fn digit() -> CharSet {
    CharSet::class(Shorthand::Digit)
}

/// `\D`
pub fn not_digit() -> CharSet {
    CharSet::class(Shorthand::NotDigit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::alt;
    use crate::escape::escape;

    #[test]
    fn test_sources() {
        assert_eq!(any().source(), ".");
        assert_eq!(start().source(), "^");
        assert_eq!(end().source(), "$");
        assert_eq!(whitespace().source(), r"\s");
        assert_eq!(not_whitespace().source(), r"\S");
        assert_eq!(word().source(), r"\w");
        assert_eq!(not_word().source(), r"\W");
        assert_eq!(digit().source(), r"\d");
        assert_eq!(not_digit().source(), r"\D");
    }

    #[test]
    fn test_classes_merge_into_sets() {
        let p = alt([digit().as_pattern(), &escape("x"), word().as_pattern()]);
        assert_eq!(p.source(), r"[\dx\w]");
    }

    #[test]
    fn test_any_does_not_merge() {
        let p = alt([&any(), whitespace().as_pattern()]);
        assert_eq!(p.source(), r".|\s");
    }

    #[test]
    fn test_anchor_start() {
        let p = start() + escape("ab");
        assert!(p.is_match("abc").unwrap());
        assert!(!p.is_match("cab").unwrap());
    }

    #[test]
    fn test_anchors_are_zero_width() {
        assert!(start().is_zero_width());
        assert!(end().is_zero_width());
        assert!(!any().is_zero_width());
        assert!(!digit().is_zero_width());
    }

    #[test]
    fn test_anchor_end() {
        let p = escape("ab") + end();
        assert!(p.is_match("cab").unwrap());
        assert!(!p.is_match("abc").unwrap());
    }
}
