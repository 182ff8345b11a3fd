//! RxFactory Core Library
//!
//! Build regular expressions out of small, composable values instead of
//! hand-written strings. Every [`Pattern`] knows how tightly its outermost
//! operator binds, so combinators add a non-capturing group only where an
//! operand would otherwise change meaning:
//!
//! ```
//! use rxfactory::{alt, amount, concat, escape, optional, range};
//!
//! let lower = range('a', 'f').unwrap();
//! let hex = alt([&escape("x"), &amount(&lower, 2, Some(4)).unwrap()]);
//! let p = concat([&optional(&escape("#"), true), &hex]);
//! assert_eq!(p.source(), r"\#?(?:x|[a-f]{2,4})");
//! ```
//!
//! Finished patterns compile with `fancy_regex` by default, or with `regex`
//! through [`Dialect::Linear`].

pub mod chars;
pub mod combinators;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod escape;
pub mod pattern;
pub mod quantifier;
pub mod sets;

pub use chars::{any, digit, end, not_digit, not_whitespace, not_word, start, whitespace, word};
pub use combinators::{
    Direction, GroupRef, alt, atomic, backreference, concat, conditional, group, grouping,
    if_ahead, if_behind, if_not_ahead, if_not_behind, lookaround, named_group, non_capturing,
};
pub use diagnostics::{Config, Factory, Report, Trace};
pub use engine::{Compiled, Construct, Dialect, Flags, Match};
pub use error::{FactoryError, Result};
pub use escape::escape;
pub use pattern::{Pattern, Precedence};
pub use quantifier::{Repeat, amount, exactly, multi, optional, quantify, repeat};
pub use sets::{
    CharRange, CharSet, ClassItem, SetMember, Shorthand, any_char, build_set, never, not_set,
    not_set_of, range, set, set_of,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        // Test the full pipeline: literals and sets -> combinators -> engine
        let hex_digit = set([range('0', '9').unwrap(), range('a', 'f').unwrap()]).unwrap();
        let upper_hex = set([range('0', '9').unwrap(), range('A', 'F').unwrap()]).unwrap();
        let p = concat([
            &optional(&escape("#"), true),
            &alt([&exactly(&hex_digit, 6), &exactly(&upper_hex, 6)]),
        ]);
        assert_eq!(p.source(), r"\#?(?:[0-9a-f]{6}|[0-9A-F]{6})");

        let text = "color #1a2b3c";
        let m = p.find(text).unwrap().unwrap();
        assert_eq!(m.as_str(text), "#1a2b3c");
    }

    #[test]
    fn test_operators_compose_like_functions() {
        let greeting = escape("Hi") | escape("Hello");
        let p = greeting + escape(" ") + word().into_pattern() * 3;
        assert_eq!(p.source(), r"(?:Hi|Hello)\x{20}\w{3}");
        assert!(p.fullmatch("Hello Bob").unwrap().is_some());
    }
}
