//! The base pattern value
//!
//! A [`Pattern`] is finished regex source text plus the [`Precedence`] of its
//! outermost operator. Every combinator consults the precedence of its
//! operands before splicing them into a larger expression, wrapping an
//! operand in a non-capturing group only when it binds more loosely than the
//! position it is spliced into requires.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, BitOr, Mul};

use crate::combinators::{alt, concat};
use crate::diagnostics::Trace;
use crate::engine::{Compiled, Dialect, Flags, Match};
use crate::error::Result;
use crate::escape::escape;
use crate::quantifier::exactly;
use crate::sets::ClassItem;

/// How tightly the outermost operator of a pattern source binds
///
/// Variants are ordered loosest first, so `a < b` means `a` binds more
/// loosely than `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// Source of unknown structure: raw strings and numbered backreferences
    Unknown,
    /// `a|b`
    Alternation,
    /// `ab`, `^`, `$`
    Concatenation,
    /// `a*`, `a+?`, `a{2,3}`
    Quantified,
    /// Escaped characters, groups, lookaround, `.`
    Atom,
    /// Bracket expressions and the empty pattern
    Bracket,
}

/// An immutable regex source string annotated with its precedence
///
/// Equality and hashing only look at the source: two patterns built
/// differently but rendering the same text are interchangeable.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    precedence: Precedence,
    /// Bracket tokens when the pattern matches exactly one character out of
    /// a non-negated set; such patterns merge into bracket expressions.
    members: Option<Vec<ClassItem>>,
    /// Set when the pattern can only ever match the empty string at a
    /// position (anchors, lookaround); the engine refuses to repeat those.
    zero_width: bool,
    trace: Option<Box<Trace>>,
}

impl Pattern {
    pub(crate) fn new(source: impl Into<String>, precedence: Precedence) -> Self {
        Pattern {
            source: source.into(),
            precedence,
            members: None,
            zero_width: false,
            trace: None,
        }
    }


    pub(crate) fn with_members(
        source: impl Into<String>,
        precedence: Precedence,
        members: Vec<ClassItem>,
    ) -> Self {
        Pattern {
            source: source.into(),
            precedence,
            members: Some(members),
            zero_width: false,
            trace: None,
        }
    }

    /// The pattern matching the empty string
    ///
    /// It splices anywhere without parentheses; repeating it any number of
    /// times still matches only the empty string.
    pub fn empty() -> Self {
        Pattern::new("", Precedence::Bracket)
    }

    /// Wrap a pre-existing regex string, validated with the fancy dialect
    pub fn from_raw(source: &str) -> Result<Pattern> {
        Pattern::from_raw_with(source, Dialect::Fancy)
    }

    /// Wrap a pre-existing regex string, validated with the given dialect
    ///
    /// Strings that only spell out a literal (`abc`, `a\.b`) come back as
    /// escaped literals with a known precedence. Anything else must compile
    /// and is treated as opaque, so it is always parenthesized on embedding.
    pub fn from_raw_with(source: &str, dialect: Dialect) -> Result<Pattern> {
        if let Some(literal) = unescape(source) {
            let escaped = escape(&literal);
            if escaped.source() == source {
                return Ok(escaped);
            }
        }

        dialect.compile(source, Flags::empty())?;
        Ok(Pattern::new(source, Precedence::Unknown))
    }

    /// The finished regex source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume the pattern, returning its source
    pub fn into_source(self) -> String {
        self.source
    }

    /// The precedence class of the outermost operator
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Bracket tokens, if this pattern can merge into a character set
    pub fn members(&self) -> Option<&[ClassItem]> {
        self.members.as_deref()
    }

    /// Whether the pattern matches exactly one character from a plain set
    pub fn is_char_set(&self) -> bool {
        self.members.is_some()
    }

    /// Whether the source is the empty string
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Whether the pattern never consumes input
    ///
    /// True for the empty pattern, anchors, lookaround and any grouping,
    /// sequence or alternation built only from those.
    pub fn is_zero_width(&self) -> bool {
        self.zero_width || self.source.is_empty()
    }

    /// Diagnostic trace, present only when built by a tracing factory
    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_deref()
    }

    pub(crate) fn with_zero_width(mut self, zero_width: bool) -> Self {
        self.zero_width = zero_width;
        self
    }

    pub(crate) fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = Some(Box::new(trace));
        self
    }

    /// Return a pattern that binds at least as tightly as `required`
    ///
    /// Patterns that already do are returned as they are; anything looser
    /// is wrapped in a non-capturing group.
    pub fn ensure_precedence(&self, required: Precedence) -> Pattern {
        if self.precedence >= required {
            self.clone()
        } else {
            Pattern::new(self.embed(required), Precedence::Atom)
                .with_zero_width(self.zero_width)
        }
    }

    /// The source to splice at a position requiring `required`
    pub(crate) fn embed(&self, required: Precedence) -> Cow<'_, str> {
        if self.precedence >= required {
            Cow::Borrowed(&self.source)
        } else {
            Cow::Owned(format!("(?:{})", self.source))
        }
    }

    /// Compile with the fancy dialect
    pub fn compile(&self, flags: Flags) -> Result<Compiled> {
        Dialect::Fancy.compile(&self.source, flags)
    }

    /// Compile with the given dialect
    pub fn compile_with(&self, dialect: Dialect, flags: Flags) -> Result<Compiled> {
        dialect.compile(&self.source, flags)
    }

    /// Check if the pattern matches anywhere in the input
    pub fn is_match(&self, text: &str) -> Result<bool> {
        self.compile(Flags::empty())?.is_match(text)
    }

    /// Find the leftmost match
    pub fn find(&self, text: &str) -> Result<Option<Match>> {
        self.compile(Flags::empty())?.find(text)
    }

    /// Find the leftmost match starting the search at byte offset `pos`
    pub fn search(&self, text: &str, pos: usize) -> Result<Option<Match>> {
        self.compile(Flags::empty())?.find_at(text, pos)
    }

    /// Find all non-overlapping matches
    pub fn find_all(&self, text: &str) -> Result<Vec<Match>> {
        self.compile(Flags::empty())?.find_all(text)
    }

    /// The text of every non-overlapping match
    pub fn matches<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        Ok(self
            .find_all(text)?
            .into_iter()
            .map(|m| m.as_str(text))
            .collect())
    }

    /// Match only at the very start of the input
    pub fn match_start(&self, text: &str) -> Result<Option<Match>> {
        let anchored = format!(r"\A(?:{})", self.source);
        Dialect::Fancy.compile(&anchored, Flags::empty())?.find(text)
    }

    /// Match the whole input or nothing
    pub fn fullmatch(&self, text: &str) -> Result<Option<Match>> {
        let anchored = format!(r"\A(?:{})\z", self.source);
        Dialect::Fancy.compile(&anchored, Flags::empty())?.find(text)
    }

    /// The leftmost match with the spans of its capture groups
    pub fn captures(&self, text: &str) -> Result<Option<Match>> {
        self.compile(Flags::empty())?.captures(text)
    }

    /// Split the input around every match
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        self.compile(Flags::empty())?.split(text)
    }

    /// Replace the leftmost match
    pub fn replace(&self, text: &str, replacement: &str) -> Result<String> {
        self.compile(Flags::empty())?.replace(text, replacement)
    }

    /// Replace every non-overlapping match
    pub fn replace_all(&self, text: &str, replacement: &str) -> Result<String> {
        self.compile(Flags::empty())?.replace_all(text, replacement)
    }
}

/// Drop the backslash in front of every escaped character
fn unescape(source: &str) -> Option<String> {
    let mut literal = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            literal.push(chars.next()?);
        } else {
            literal.push(c);
        }
    }
    Some(literal)
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl PartialEq<str> for Pattern {
    fn eq(&self, other: &str) -> bool {
        self.source == other
    }
}

impl PartialEq<&str> for Pattern {
    fn eq(&self, other: &&str) -> bool {
        self.source == *other
    }
}

impl Add for Pattern {
    type Output = Pattern;

    fn add(self, rhs: Pattern) -> Pattern {
        concat([&self, &rhs])
    }
}

impl<'a> Add<&'a Pattern> for &'a Pattern {
    type Output = Pattern;

    fn add(self, rhs: &'a Pattern) -> Pattern {
        concat([self, rhs])
    }
}

impl BitOr for Pattern {
    type Output = Pattern;

    fn bitor(self, rhs: Pattern) -> Pattern {
        alt([&self, &rhs])
    }
}

impl<'a> BitOr<&'a Pattern> for &'a Pattern {
    type Output = Pattern;

    fn bitor(self, rhs: &'a Pattern) -> Pattern {
        alt([self, rhs])
    }
}

impl Mul<u32> for Pattern {
    type Output = Pattern;

    fn mul(self, count: u32) -> Pattern {
        exactly(&self, count)
    }
}

impl Mul<u32> for &Pattern {
    type Output = Pattern;

    fn mul(self, count: u32) -> Pattern {
        exactly(self, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactoryError;
    use std::collections::HashSet;

    #[test]
    fn test_precedence_order() {
        assert!(Precedence::Unknown < Precedence::Alternation);
        assert!(Precedence::Alternation < Precedence::Concatenation);
        assert!(Precedence::Concatenation < Precedence::Quantified);
        assert!(Precedence::Quantified < Precedence::Atom);
        assert!(Precedence::Atom < Precedence::Bracket);
    }

    #[test]
    fn test_ensure_precedence_keeps_tight_pattern() {
        let p = Pattern::new("[ab]", Precedence::Bracket);
        let ensured = p.ensure_precedence(Precedence::Atom);
        assert_eq!(ensured.source(), "[ab]");
        assert_eq!(ensured.precedence(), Precedence::Bracket);
    }

    #[test]
    fn test_ensure_precedence_wraps_loose_pattern() {
        let p = Pattern::new("a|b", Precedence::Alternation);
        let ensured = p.ensure_precedence(Precedence::Concatenation);
        assert_eq!(ensured.source(), "(?:a|b)");
        assert_eq!(ensured.precedence(), Precedence::Atom);
    }

    #[test]
    fn test_equality_ignores_precedence() {
        let a = Pattern::new("ab", Precedence::Concatenation);
        let b = Pattern::new("ab", Precedence::Unknown);
        assert_eq!(a, b);

        let mut seen = HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));
    }

    #[test]
    fn test_display_is_source() {
        let p = Pattern::new("a|b", Precedence::Alternation);
        assert_eq!(p.to_string(), "a|b");
    }

    #[test]
    fn test_from_raw_detects_literal() {
        let p = Pattern::from_raw("abc").unwrap();
        assert_eq!(p.source(), "abc");
        assert_eq!(p.precedence(), Precedence::Concatenation);

        let p = Pattern::from_raw("x").unwrap();
        assert_eq!(p.precedence(), Precedence::Atom);
        assert!(p.is_char_set());
    }

    #[test]
    fn test_from_raw_detects_escaped_literal() {
        let p = Pattern::from_raw(r"a\.b").unwrap();
        assert_eq!(p.source(), r"a\.b");
        assert_eq!(p.precedence(), Precedence::Concatenation);

        let p = Pattern::from_raw(r"\.").unwrap();
        assert_eq!(p.precedence(), Precedence::Atom);
    }

    #[test]
    fn test_from_raw_empty() {
        let p = Pattern::from_raw("").unwrap();
        assert!(p.is_empty());
        assert_eq!(p.precedence(), Precedence::Bracket);
    }

    #[test]
    fn test_from_raw_opaque() {
        let p = Pattern::from_raw("a|b").unwrap();
        assert_eq!(p.precedence(), Precedence::Unknown);
        assert_eq!(p.embed(Precedence::Alternation), "(?:a|b)");
    }

    #[test]
    fn test_from_raw_keeps_unescaped_whitespace_opaque() {
        let p = Pattern::from_raw("a b").unwrap();
        assert_eq!(p.source(), "a b");
        assert_eq!(p.precedence(), Precedence::Unknown);

        let p = Pattern::from_raw(r"a\x{20}b").unwrap();
        assert_eq!(p.precedence(), Precedence::Unknown);
        assert!(p.fullmatch("a b").unwrap().is_some());
    }

    #[test]
    fn test_zero_width() {
        assert!(Pattern::empty().is_zero_width());
        assert!(!escape("a").is_zero_width());
        let wrapped = Pattern::new("^|$", Precedence::Alternation)
            .with_zero_width(true)
            .ensure_precedence(Precedence::Atom);
        assert_eq!(wrapped.source(), "(?:^|$)");
        assert!(wrapped.is_zero_width());
    }

    #[test]
    fn test_from_raw_invalid() {
        let err = Pattern::from_raw("(a").unwrap_err();
        assert!(matches!(err, FactoryError::InvalidPattern { .. }));
    }

    #[test]
    fn test_from_raw_linear_rejects_lookahead() {
        let err = Pattern::from_raw_with("a(?=b)", Dialect::Linear).unwrap_err();
        assert!(matches!(err, FactoryError::InvalidPattern { .. }));
        assert!(Pattern::from_raw_with("a(?=b)", Dialect::Fancy).is_ok());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\.b").as_deref(), Some("a.b"));
        assert_eq!(unescape(r"\\").as_deref(), Some("\\"));
        assert_eq!(unescape("trailing\\"), None);
    }

    #[test]
    fn test_operators() {
        let a = escape("a");
        let b = escape("b");
        assert_eq!((&a + &b).source(), "ab");
        assert_eq!((&a | &b).source(), "[ab]");
        assert_eq!((&a * 3).source(), "a{3}");
        assert_eq!((a + b).source(), "ab");
    }

    #[test]
    fn test_delegation() {
        let p = escape("ab");
        assert!(p.is_match("xaby").unwrap());
        let m = p.find("xaby").unwrap().unwrap();
        assert_eq!((m.start, m.end), (1, 3));
        assert!(p.match_start("xab").unwrap().is_none());
        assert!(p.match_start("abx").unwrap().is_some());
        assert!(p.fullmatch("abx").unwrap().is_none());
        assert!(p.fullmatch("ab").unwrap().is_some());
        assert_eq!(p.matches("ab-ab").unwrap(), vec!["ab", "ab"]);
        assert_eq!(p.search("ab-ab", 1).unwrap().unwrap().start, 3);
        assert_eq!(p.split("1ab2ab3").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(p.replace_all("ab-ab", "x").unwrap(), "x-x");
        assert_eq!(p.replace("ab-ab", "x").unwrap(), "x-ab");
    }
}
