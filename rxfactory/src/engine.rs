//! Compiling and running finished patterns
//!
//! Two dialects are available. [`Dialect::Fancy`] compiles through
//! `fancy_regex` and accepts lookaround, backreferences, conditionals and
//! atomic groups. [`Dialect::Linear`] compiles through `regex`, which runs in
//! linear time but rejects those constructs.

use std::collections::HashMap;
use std::ops::BitOr;

use crate::error::{FactoryError, Result};

/// Mode flags applied to a compiled pattern as an inline group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u32);

impl Flags {
    /// Case insensitive matching (`i`)
    pub const CASE_INSENSITIVE: Flags = Flags(1);
    /// `^` and `$` match at line boundaries (`m`)
    pub const MULTILINE: Flags = Flags(1 << 1);
    /// `.` also matches a newline (`s`)
    pub const DOT_MATCHES_NEWLINE: Flags = Flags(1 << 2);
    /// Whitespace in the pattern is ignored (`x`)
    pub const EXTENDED: Flags = Flags(1 << 3);

    const LETTERS: [(Flags, char); 4] = [
        (Flags::CASE_INSENSITIVE, 'i'),
        (Flags::MULTILINE, 'm'),
        (Flags::DOT_MATCHES_NEWLINE, 's'),
        (Flags::EXTENDED, 'x'),
    ];

    /// No flags set
    pub fn empty() -> Self {
        Flags(0)
    }

    /// The raw bitmask
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Rebuild flags from raw bits, ignoring unknown ones
    pub fn from_bits(bits: u32) -> Self {
        Flags(bits & 0b1111)
    }

    /// Check whether every flag in `other` is set
    pub fn contains(&self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether no flag is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Parse mode flags from a string like "imsx"
    pub fn from_string(flags: &str) -> Result<Self> {
        let mut mode = Flags::empty();
        for c in flags.chars() {
            match Flags::LETTERS.iter().find(|(_, letter)| *letter == c) {
                Some((flag, _)) => mode = mode | *flag,
                None => {
                    return Err(FactoryError::Configuration(format!(
                        "unknown flag {:?}",
                        c
                    )));
                }
            }
        }
        Ok(mode)
    }

    /// The flag letters in canonical order
    pub fn letters(&self) -> String {
        Flags::LETTERS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, letter)| *letter)
            .collect()
    }

    /// `source` with the flags set by an inline group in front of it
    fn apply(&self, source: &str) -> String {
        if self.is_empty() {
            source.to_string()
        } else {
            format!("(?{}){}", self.letters(), source)
        }
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

/// Constructs only the backtracking dialect supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    /// `(?=...)`, `(?!...)`, `(?<=...)`, `(?<!...)`
    Lookaround,
    /// `\1`, `\k<name>`
    Backreference,
    /// `(?(1)yes|no)`
    Conditional,
    /// `(?>...)`
    AtomicGroup,
}

impl Construct {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Construct::Lookaround => "lookaround",
            Construct::Backreference => "backreference",
            Construct::Conditional => "conditional",
            Construct::AtomicGroup => "atomic group",
        }
    }
}

/// The regex engine a pattern is compiled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Backtracking engine (`fancy_regex`)
    #[default]
    Fancy,
    /// Linear-time engine (`regex`)
    Linear,
}

impl Dialect {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Fancy => "fancy",
            Dialect::Linear => "linear",
        }
    }

    /// Check whether patterns using `construct` compile in this dialect
    pub fn supports(&self, construct: Construct) -> bool {
        match self {
            Dialect::Fancy => true,
            Dialect::Linear => !matches!(
                construct,
                Construct::Lookaround
                    | Construct::Backreference
                    | Construct::Conditional
                    | Construct::AtomicGroup
            ),
        }
    }

    /// Fail with `UnsupportedConstruct` unless this dialect can express `construct`
    pub fn require(&self, construct: Construct) -> Result<()> {
        if self.supports(construct) {
            Ok(())
        } else {
            Err(FactoryError::UnsupportedConstruct {
                construct: construct.name(),
                dialect: self.name(),
            })
        }
    }

    /// Compile `source` with the given mode flags
    pub fn compile(&self, source: &str, flags: Flags) -> Result<Compiled> {
        let full = flags.apply(source);
        match self {
            Dialect::Fancy => fancy_regex::Regex::new(&full)
                .map(Compiled::Fancy)
                .map_err(|e| FactoryError::invalid_pattern(source, e)),
            Dialect::Linear => regex::Regex::new(&full)
                .map(Compiled::Linear)
                .map_err(|e| FactoryError::invalid_pattern(source, e)),
        }
    }
}

/// Byte spans reported by the engine for one match
///
/// Group spans are only filled in by [`Compiled::captures`]; groups that
/// did not take part in the match are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Byte offset where the match begins
    pub start: usize,
    /// Byte offset just past the match
    pub end: usize,
    /// Spans of the numbered groups that participated, keyed from 1
    pub groups: HashMap<u32, (usize, usize)>,
    /// Spans of the named groups that participated
    pub named_groups: HashMap<String, (usize, usize)>,
}

impl Match {
    fn span(start: usize, end: usize) -> Self {
        Match {
            start,
            end,
            groups: HashMap::new(),
            named_groups: HashMap::new(),
        }
    }

    /// Record the spans of every participating group
    ///
    /// `names` yields one entry per group, the whole match first, as both
    /// engines' `capture_names` do; `get` looks a group up by index.
    fn with_groups<'n>(
        mut self,
        names: impl Iterator<Item = Option<&'n str>>,
        get: impl Fn(usize) -> Option<(usize, usize)>,
    ) -> Self {
        for (i, name) in names.enumerate().skip(1) {
            let Some(span) = get(i) else {
                continue;
            };
            self.groups.insert(i as u32, span);
            if let Some(name) = name {
                self.named_groups.insert(name.to_string(), span);
            }
        }
        self
    }

    /// The text this match covers in `input`, the string that was searched
    pub fn as_str<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }

    /// Span of group `n`, if it participated
    pub fn group(&self, n: u32) -> Option<(usize, usize)> {
        self.groups.get(&n).copied()
    }

    /// Span of the group called `name`, if it participated
    pub fn named_group(&self, name: &str) -> Option<(usize, usize)> {
        self.named_groups.get(name).copied()
    }

    /// Text captured by group `n` in `input`
    pub fn group_str<'a>(&self, input: &'a str, n: u32) -> Option<&'a str> {
        self.group(n).map(|(start, end)| &input[start..end])
    }

    /// Text captured by the group called `name` in `input`
    pub fn named_group_str<'a>(&self, input: &'a str, name: &str) -> Option<&'a str> {
        self.named_group(name)
            .map(|(start, end)| &input[start..end])
    }
}

fn runtime(e: fancy_regex::Error) -> FactoryError {
    FactoryError::Runtime(e.to_string())
}

/// A compiled pattern in either dialect
#[derive(Debug)]
pub enum Compiled {
    /// Compiled by `fancy_regex`
    Fancy(fancy_regex::Regex),
    /// Compiled by `regex`
    Linear(regex::Regex),
}

impl Compiled {
    /// The dialect that compiled this pattern
    pub fn dialect(&self) -> Dialect {
        match self {
            Compiled::Fancy(_) => Dialect::Fancy,
            Compiled::Linear(_) => Dialect::Linear,
        }
    }

    /// The source that was compiled, including any inline flags
    pub fn as_str(&self) -> &str {
        match self {
            Compiled::Fancy(re) => re.as_str(),
            Compiled::Linear(re) => re.as_str(),
        }
    }

    /// Check if the pattern matches anywhere in `text`
    ///
    /// Fails only when the backtracking engine gives up.
    pub fn is_match(&self, text: &str) -> Result<bool> {
        match self {
            Compiled::Fancy(re) => re.is_match(text).map_err(runtime),
            Compiled::Linear(re) => Ok(re.is_match(text)),
        }
    }

    /// Find the leftmost match
    pub fn find(&self, text: &str) -> Result<Option<Match>> {
        self.find_at(text, 0)
    }

    /// Find the leftmost match starting the search at byte offset `pos`
    ///
    /// Anchors and lookbehind still see the text before `pos`.
    pub fn find_at(&self, text: &str, pos: usize) -> Result<Option<Match>> {
        if pos > text.len() {
            return Ok(None);
        }
        match self {
            Compiled::Fancy(re) => Ok(re
                .find_from_pos(text, pos)
                .map_err(runtime)?
                .map(|m| Match::span(m.start(), m.end()))),
            Compiled::Linear(re) => Ok(re
                .find_at(text, pos)
                .map(|m| Match::span(m.start(), m.end()))),
        }
    }

    /// Find all non-overlapping matches
    pub fn find_all(&self, text: &str) -> Result<Vec<Match>> {
        match self {
            Compiled::Fancy(re) => re
                .find_iter(text)
                .map(|m| m.map(|m| Match::span(m.start(), m.end())).map_err(runtime))
                .collect(),
            Compiled::Linear(re) => Ok(re
                .find_iter(text)
                .map(|m| Match::span(m.start(), m.end()))
                .collect()),
        }
    }

    /// The leftmost match with the spans of every participating group
    pub fn captures(&self, text: &str) -> Result<Option<Match>> {
        match self {
            Compiled::Fancy(re) => {
                let Some(caps) = re.captures(text).map_err(runtime)? else {
                    return Ok(None);
                };
                Ok(caps.get(0).map(|whole| {
                    Match::span(whole.start(), whole.end()).with_groups(re.capture_names(), |i| {
                        caps.get(i).map(|g| (g.start(), g.end()))
                    })
                }))
            }
            Compiled::Linear(re) => {
                let Some(caps) = re.captures(text) else {
                    return Ok(None);
                };
                Ok(caps.get(0).map(|whole| {
                    Match::span(whole.start(), whole.end()).with_groups(re.capture_names(), |i| {
                        caps.get(i).map(|g| (g.start(), g.end()))
                    })
                }))
            }
        }
    }

    /// Split the input around every match
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut pieces = Vec::new();
        let mut last = 0;
        for m in self.find_all(text)? {
            pieces.push(&text[last..m.start]);
            last = m.end;
        }
        pieces.push(&text[last..]);
        Ok(pieces)
    }

    /// Replace the leftmost match; `$1` and `$name` expand to group text
    pub fn replace(&self, text: &str, replacement: &str) -> Result<String> {
        self.replacen(text, 1, replacement)
    }

    /// Replace every non-overlapping match
    pub fn replace_all(&self, text: &str, replacement: &str) -> Result<String> {
        self.replacen(text, 0, replacement)
    }

    /// Replace at most `limit` matches, or all of them when `limit` is 0
    pub fn replacen(&self, text: &str, limit: usize, replacement: &str) -> Result<String> {
        match self {
            Compiled::Fancy(re) => {
                let mut out = String::with_capacity(text.len());
                let mut last = 0;
                for (count, caps) in re.captures_iter(text).enumerate() {
                    if limit > 0 && count == limit {
                        break;
                    }
                    let caps = caps.map_err(runtime)?;
                    let Some(whole) = caps.get(0) else {
                        continue;
                    };
                    out.push_str(&text[last..whole.start()]);
                    caps.expand(replacement, &mut out);
                    last = whole.end();
                }
                out.push_str(&text[last..]);
                Ok(out)
            }
            Compiled::Linear(re) => Ok(re.replacen(text, limit, replacement).into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_from_string() {
        let flags = Flags::from_string("im").unwrap();
        assert!(flags.contains(Flags::CASE_INSENSITIVE));
        assert!(flags.contains(Flags::MULTILINE));
        assert!(!flags.contains(Flags::DOT_MATCHES_NEWLINE));
        assert_eq!(flags.letters(), "im");
        assert_eq!(Flags::from_string("xsmi").unwrap().letters(), "imsx");
        assert!(Flags::from_string("q").is_err());
    }

    #[test]
    fn test_flags_bits() {
        let flags = Flags::CASE_INSENSITIVE | Flags::EXTENDED;
        assert_eq!(Flags::from_bits(flags.bits()), flags);
        assert!(Flags::empty().is_empty());
        assert_eq!(Flags::from_bits(0xff).letters(), "imsx");
    }

    #[test]
    fn test_inline_flags() {
        let re = Dialect::Fancy.compile("abc", Flags::CASE_INSENSITIVE).unwrap();
        assert_eq!(re.as_str(), "(?i)abc");
        assert!(re.is_match("xABCx").unwrap());

        let re = Dialect::Linear.compile("a.c", Flags::DOT_MATCHES_NEWLINE).unwrap();
        assert!(re.is_match("a\nc").unwrap());
    }

    #[test]
    fn test_multiline_flag() {
        let re = Dialect::Fancy.compile("^b", Flags::MULTILINE).unwrap();
        assert!(re.is_match("a\nb").unwrap());
        let re = Dialect::Fancy.compile("^b", Flags::empty()).unwrap();
        assert!(!re.is_match("a\nb").unwrap());
    }

    #[test]
    fn test_compile_error() {
        let err = Dialect::Fancy.compile("(a", Flags::empty()).unwrap_err();
        match err {
            FactoryError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(a"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(Dialect::Linear.compile(r"(a)\1", Flags::empty()).is_err());
    }

    #[test]
    fn test_require() {
        assert!(Dialect::Fancy.require(Construct::Lookaround).is_ok());
        let err = Dialect::Linear.require(Construct::AtomicGroup).unwrap_err();
        assert_eq!(
            err.to_string(),
            "atomic group is not supported by the linear dialect"
        );
    }

    #[test]
    fn test_find_and_find_at() {
        for dialect in [Dialect::Fancy, Dialect::Linear] {
            let re = dialect.compile("ab", Flags::empty()).unwrap();
            let m = re.find("xxabab").unwrap().unwrap();
            assert_eq!((m.start, m.end), (2, 4));
            let m = re.find_at("xxabab", 3).unwrap().unwrap();
            assert_eq!((m.start, m.end), (4, 6));
            assert!(re.find_at("ab", 10).unwrap().is_none());
        }
    }

    #[test]
    fn test_find_all() {
        let re = Dialect::Fancy.compile("a", Flags::empty()).unwrap();
        assert_eq!(re.find_all("banana").unwrap().len(), 3);
        let re = Dialect::Linear.compile("a*", Flags::empty()).unwrap();
        let spans: Vec<_> = re
            .find_all("baa")
            .unwrap()
            .into_iter()
            .map(|m| (m.start, m.end))
            .collect();
        assert_eq!(spans, vec![(0, 0), (1, 3)]);
    }

    #[test]
    fn test_captures() {
        for dialect in [Dialect::Fancy, Dialect::Linear] {
            let re = dialect
                .compile(r"(?P<first>\w+) (\w+)?(x)?", Flags::empty())
                .unwrap();
            let text = "George Washington";
            let m = re.captures(text).unwrap().unwrap();
            assert_eq!(m.named_group_str(text, "first"), Some("George"));
            assert_eq!(m.group_str(text, 1), Some("George"));
            assert_eq!(m.group_str(text, 2), Some("Washington"));
            assert_eq!(m.group(3), None);
        }
    }

    #[test]
    fn test_split() {
        let re = Dialect::Fancy.compile(",", Flags::empty()).unwrap();
        assert_eq!(re.split("a,b,,c").unwrap(), vec!["a", "b", "", "c"]);
        assert_eq!(re.split("").unwrap(), vec![""]);
    }

    #[test]
    fn test_replace() {
        for dialect in [Dialect::Fancy, Dialect::Linear] {
            let re = dialect.compile(r"(\d)", Flags::empty()).unwrap();
            assert_eq!(re.replace("a1b2", "<$1>").unwrap(), "a<1>b2");
            assert_eq!(re.replace_all("a1b2", "<$1>").unwrap(), "a<1>b<2>");
            assert_eq!(re.replacen("1234", 3, "x").unwrap(), "xxx4");
        }
    }

    #[test]
    fn test_fancy_backreference() {
        let re = Dialect::Fancy.compile(r"(\w)\1", Flags::empty()).unwrap();
        assert_eq!(re.dialect(), Dialect::Fancy);
        let m = re.find("abccd").unwrap().unwrap();
        assert_eq!(m.as_str("abccd"), "cc");
    }
}
