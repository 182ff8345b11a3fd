//! Character-set algebra
//!
//! Sets are kept as a flat list of bracket tokens ([`ClassItem`]) next to
//! their rendered source, so unions and negations merge tokens instead of
//! nesting bracket expressions.

use std::fmt;
use std::ops::Deref;

use crate::error::{FactoryError, Result};
use crate::escape;
use crate::pattern::{Pattern, Precedence};

/// A character class shorthand (`\d`, `\w`, `\s` and their complements)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shorthand {
    /// `\d`
    Digit,
    /// `\D`
    NotDigit,
    /// `\w`
    Word,
    /// `\W`
    NotWord,
    /// `\s`
    Whitespace,
    /// `\S`
    NotWhitespace,
}

impl Shorthand {
    /// The escape letter following the backslash
    pub fn letter(self) -> char {
        match self {
            Shorthand::Digit => 'd',
            Shorthand::NotDigit => 'D',
            Shorthand::Word => 'w',
            Shorthand::NotWord => 'W',
            Shorthand::Whitespace => 's',
            Shorthand::NotWhitespace => 'S',
        }
    }

    /// Upper-case name used in descriptions
    pub fn name(self) -> &'static str {
        match self {
            Shorthand::Digit => "DIGIT",
            Shorthand::NotDigit => "NOTDIGIT",
            Shorthand::Word => "WORD",
            Shorthand::NotWord => "NOTWORD",
            Shorthand::Whitespace => "WHITESPACE",
            Shorthand::NotWhitespace => "NOTWHITESPACE",
        }
    }
}

/// One token inside a bracket expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassItem {
    /// A single character
    Char(char),
    /// An inclusive character range (e.g., a-z)
    Range(char, char),
    /// A character class shorthand (\d, \w, \s, etc.)
    Shorthand(Shorthand),
}

impl ClassItem {
    pub(crate) fn write_to(&self, out: &mut String) {
        match self {
            ClassItem::Char(c) => push_class_char(out, *c),
            ClassItem::Range(start, stop) => {
                push_class_char(out, *start);
                out.push('-');
                push_class_char(out, *stop);
            }
            ClassItem::Shorthand(s) => {
                out.push('\\');
                out.push(s.letter());
            }
        }
    }
}

impl fmt::Display for ClassItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

/// Push `c` escaped for use inside brackets
///
/// Besides `]`, `^`, `\` and `-`, the engine treats `[` as a nested class
/// and `&&`/`~~` as set operators, so those are escaped as well. Whitespace
/// is spelled as an escape so that the extended flag keeps it.
fn push_class_char(out: &mut String, c: char) {
    if c.is_whitespace() {
        escape::push_escaped(out, c);
        return;
    }
    if matches!(c, '\\' | ']' | '[' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(c);
}

/// A validated inclusive character range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharRange {
    start: char,
    stop: char,
}

impl CharRange {
    /// Create a range, failing when `start` sorts after `stop`
    pub fn new(start: char, stop: char) -> Result<Self> {
        if start > stop {
            return Err(FactoryError::InvalidRange { start, stop });
        }
        Ok(CharRange { start, stop })
    }

    /// First character of the range
    pub fn start(&self) -> char {
        self.start
    }

    /// Last character of the range
    pub fn stop(&self) -> char {
        self.stop
    }

    /// Check whether `c` lies in the range
    pub fn contains(&self, c: char) -> bool {
        self.start <= c && c <= self.stop
    }
}

/// Something that can go into a set
#[derive(Debug, Clone)]
pub enum SetMember {
    /// A literal character
    Char(char),
    /// A character range
    Range(CharRange),
    /// The tokens of another set
    Set(CharSet),
}

impl From<char> for SetMember {
    fn from(c: char) -> Self {
        SetMember::Char(c)
    }
}

impl From<CharRange> for SetMember {
    fn from(range: CharRange) -> Self {
        SetMember::Range(range)
    }
}

impl From<CharSet> for SetMember {
    fn from(set: CharSet) -> Self {
        SetMember::Set(set)
    }
}

impl From<Shorthand> for SetMember {
    fn from(shorthand: Shorthand) -> Self {
        SetMember::Set(CharSet::class(shorthand))
    }
}

/// A pattern matching one character from (or outside) a set
#[derive(Debug, Clone)]
pub struct CharSet {
    pattern: Pattern,
    items: Vec<ClassItem>,
    negated: bool,
}

impl CharSet {
    pub(crate) fn from_items(negated: bool, items: Vec<ClassItem>) -> CharSet {
        if items.is_empty() {
            return if negated { any_char() } else { never() };
        }

        let mut source = String::from("[");
        if negated {
            source.push('^');
        }
        for item in &items {
            item.write_to(&mut source);
        }
        source.push(']');

        let pattern = if negated {
            Pattern::new(source, Precedence::Bracket)
        } else {
            Pattern::with_members(source, Precedence::Bracket, items.clone())
        };
        CharSet {
            pattern,
            items,
            negated,
        }
    }

    /// The single-shorthand set, rendered bare as `\d`, `\w`, ...
    pub(crate) fn class(shorthand: Shorthand) -> CharSet {
        let item = ClassItem::Shorthand(shorthand);
        CharSet {
            pattern: Pattern::with_members(item.to_string(), Precedence::Atom, vec![item.clone()]),
            items: vec![item],
            negated: false,
        }
    }

    /// The bracket tokens of the set
    pub fn items(&self) -> &[ClassItem] {
        &self.items
    }

    /// Whether the set matches characters outside its tokens
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The set as a plain pattern
    pub fn as_pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Consume the set, returning the plain pattern
    pub fn into_pattern(self) -> Pattern {
        self.pattern
    }

    /// The set of characters in either set
    pub fn union(&self, other: &CharSet) -> Result<CharSet> {
        set([SetMember::Set(self.clone()), SetMember::Set(other.clone())])
    }

    /// The complementary set
    ///
    /// Negating a negated set gives back the plain set of the same tokens.
    pub fn negate(&self) -> CharSet {
        CharSet::from_items(!self.negated, self.items.clone())
    }

    pub(crate) fn map_pattern(self, f: impl FnOnce(Pattern) -> Pattern) -> CharSet {
        CharSet {
            pattern: f(self.pattern),
            ..self
        }
    }
}

impl Deref for CharSet {
    type Target = Pattern;

    fn deref(&self) -> &Pattern {
        &self.pattern
    }
}

impl From<CharSet> for Pattern {
    fn from(set: CharSet) -> Pattern {
        set.pattern
    }
}

impl PartialEq for CharSet {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for CharSet {}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pattern.fmt(f)
    }
}

/// Merge members into one bracket expression, optionally negated
///
/// - No members and no negation gives [`never`].
/// - No members with negation gives [`any_char`].
/// - Nested sets contribute their tokens directly; a negated set cannot be
///   flattened into another one and is rejected.
pub fn build_set<I>(negate: bool, members: I) -> Result<CharSet>
where
    I: IntoIterator,
    I::Item: Into<SetMember>,
{
    let mut items = Vec::new();
    for member in members {
        match member.into() {
            SetMember::Char(c) => items.push(ClassItem::Char(c)),
            SetMember::Range(range) => items.push(ClassItem::Range(range.start, range.stop)),
            SetMember::Set(nested) => {
                if nested.negated {
                    return Err(FactoryError::Configuration(format!(
                        "negated set {} cannot be merged into another set",
                        nested.pattern
                    )));
                }
                items.extend(nested.items);
            }
        }
    }
    Ok(CharSet::from_items(negate, items))
}

/// One character out of the members
pub fn set<I>(members: I) -> Result<CharSet>
where
    I: IntoIterator,
    I::Item: Into<SetMember>,
{
    build_set(false, members)
}

/// One character not among the members
pub fn not_set<I>(members: I) -> Result<CharSet>
where
    I: IntoIterator,
    I::Item: Into<SetMember>,
{
    build_set(true, members)
}

/// One character out of `chars`
pub fn set_of(chars: &str) -> CharSet {
    CharSet::from_items(false, chars.chars().map(ClassItem::Char).collect())
}

/// One character not in `chars`
pub fn not_set_of(chars: &str) -> CharSet {
    CharSet::from_items(true, chars.chars().map(ClassItem::Char).collect())
}

/// One character between `start` and `stop`, inclusive
pub fn range(start: char, stop: char) -> Result<CharSet> {
    let range = CharRange::new(start, stop)?;
    Ok(CharSet::from_items(
        false,
        vec![ClassItem::Range(range.start, range.stop)],
    ))
}

/// The set that matches nothing
///
/// An empty bracket `[]` is not valid syntax, so this is the complement of
/// "any character". It carries no tokens and vanishes when merged.
pub fn never() -> CharSet {
    CharSet {
        pattern: Pattern::with_members(r"[^\s\S]", Precedence::Bracket, Vec::new()),
        items: Vec::new(),
        negated: false,
    }
}

/// The set that matches any single character, newlines included
pub fn any_char() -> CharSet {
    CharSet::from_items(
        false,
        vec![
            ClassItem::Shorthand(Shorthand::Whitespace),
            ClassItem::Shorthand(Shorthand::NotWhitespace),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_source() {
        let cases = [('0', '9', "[0-9]"), ('a', 'f', "[a-f]"), ('A', 'Z', "[A-Z]")];
        for (start, stop, expected) in cases {
            assert_eq!(range(start, stop).unwrap().source(), expected);
        }
    }

    #[test]
    fn test_range_single_char() {
        assert_eq!(range('q', 'q').unwrap().source(), "[q-q]");
    }

    #[test]
    fn test_range_invalid() {
        let err = range('r', 'q').unwrap_err();
        assert_eq!(err, FactoryError::InvalidRange { start: 'r', stop: 'q' });
        assert!(CharRange::new('b', 'a').is_err());
    }

    #[test]
    fn test_range_contains() {
        let r = CharRange::new('a', 'e').unwrap();
        assert!(r.contains('c'));
        assert!(!r.contains('f'));
    }

    #[test]
    fn test_set_of() {
        let s = set_of("?!.,");
        assert_eq!(s.source(), "[?!.,]");
        assert_eq!(s.precedence(), Precedence::Bracket);
        assert!(s.is_char_set());
    }

    #[test]
    fn test_not_set_of() {
        let s = not_set_of("?!.,");
        assert_eq!(s.source(), "[^?!.,]");
        assert!(s.is_negated());
        assert!(!s.is_char_set());
    }

    #[test]
    fn test_class_escaping() {
        let s = set_of(r"]^\-[&~a");
        assert_eq!(s.source(), r"[\]\^\\\-\[\&\~a]");
        assert!(s.is_match("&").unwrap());
        assert!(s.is_match("]").unwrap());
        assert!(!s.is_match("b").unwrap());
    }

    #[test]
    fn test_class_whitespace_survives_extended_flag() {
        let s = set_of(" \t");
        assert_eq!(s.source(), r"[\x{20}\t]");
        let re = s.compile(crate::engine::Flags::EXTENDED).unwrap();
        let m = re.find("ab c").unwrap().unwrap();
        assert_eq!((m.start, m.end), (2, 3));
    }

    #[test]
    fn test_range_with_escaped_bounds() {
        let s = range('[', '^').unwrap();
        assert_eq!(s.source(), r"[\[-\^]");
        assert!(s.is_match("]").unwrap());
        assert!(!s.is_match("a").unwrap());
    }

    #[test]
    fn test_nested_set_flattens() {
        let digits = range('0', '9').unwrap();
        let s = set([
            SetMember::from('x'),
            SetMember::from(digits),
            SetMember::from(Shorthand::Whitespace),
        ])
        .unwrap();
        assert_eq!(s.source(), r"[x0-9\s]");
        assert_eq!(s.items().len(), 3);
    }

    #[test]
    fn test_nested_negated_set_rejected() {
        let err = set([SetMember::from(not_set_of("a"))]).unwrap_err();
        assert!(matches!(err, FactoryError::Configuration(_)));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let s = set(Vec::<char>::new()).unwrap();
        assert_eq!(s.source(), r"[^\s\S]");
        assert!(!s.is_match("anything\n").unwrap());
        assert!(!s.is_match("").unwrap());
        assert!(s.is_char_set());
    }

    #[test]
    fn test_empty_negated_set_matches_anything() {
        let s = not_set(Vec::<char>::new()).unwrap();
        assert_eq!(s.source(), r"[\s\S]");
        assert!(s.is_match("\n").unwrap());
        assert!(s.is_match("x").unwrap());
        assert!(!s.is_match("").unwrap());
    }

    #[test]
    fn test_never_vanishes_in_union() {
        let s = set([SetMember::from(never()), SetMember::from('a')]).unwrap();
        assert_eq!(s.source(), "[a]");
    }

    #[test]
    fn test_union() {
        let s = set_of("ab").union(&range('0', '9').unwrap()).unwrap();
        assert_eq!(s.source(), "[ab0-9]");
        assert!(set_of("a").union(&not_set_of("b")).is_err());
    }

    #[test]
    fn test_negate() {
        let s = set_of("ab");
        let negated = s.negate();
        assert_eq!(negated.source(), "[^ab]");
        assert_eq!(negated.negate().source(), "[ab]");
        assert_eq!(never().negate().source(), r"[\s\S]");
    }

    #[test]
    fn test_shorthand_class() {
        let digit = CharSet::class(Shorthand::Digit);
        assert_eq!(digit.source(), r"\d");
        assert_eq!(digit.precedence(), Precedence::Atom);
        assert!(digit.is_match("7").unwrap());
    }

    #[test]
    fn test_set_matches() {
        assert_eq!(set_of("?!.,").matches("Hi! Bye.").unwrap(), vec!["!", "."]);
        assert_eq!(not_set_of("?!.,").matches("Hi!").unwrap(), vec!["H", "i"]);
    }
}
