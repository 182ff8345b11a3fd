//! Build diagnostics
//!
//! A [`Factory`] builds the same patterns as the free functions of this
//! crate, but checks every construct against its [`Dialect`] and, when its
//! [`Config`] asks for it, attaches a [`Trace`] to each result:
//!
//! - a human-readable description of how the pattern was built, and
//! - a reference regex derived through a separate code path that wraps every
//!   operand in `(?:...)`, always spells quantifiers as `{min,max}` and
//!   expands sets into alternations.
//!
//! The reference never feeds back into the emitted source. Tests compile
//! both and compare what they match.

use std::fmt;

use crate::combinators::{self, Direction, GroupRef};
use crate::engine::{Construct, Dialect};
use crate::error::Result;
use crate::escape;
use crate::pattern::Pattern;
use crate::quantifier::{self, Repeat};
use crate::sets::{self, CharRange, CharSet, ClassItem, SetMember};

/// Ranges at most this wide are spelled out character by character in
/// reference regexes
const SPELLED_RANGE: u32 = 64;

/// Diagnostic side channel attached to a pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    description: Option<String>,
    reference: Option<String>,
}

impl Trace {
    /// How the pattern was built, e.g. `alt("ab", amount(set(DIGIT), 2, 3))`
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A structurally different regex that must match the same text
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

/// Builder configuration, fixed once handed to a [`Factory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Generate human-readable descriptions
    pub describe: bool,
    /// Derive reference regexes for cross-checking
    pub reference: bool,
    /// The dialect every construct is checked against
    pub dialect: Dialect,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_describe(mut self, describe: bool) -> Self {
        self.describe = describe;
        self
    }

    pub fn with_reference(mut self, reference: bool) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Descriptions and references both on
    pub fn debug() -> Self {
        Config::new().with_describe(true).with_reference(true)
    }

    fn traces(&self) -> bool {
        self.describe || self.reference
    }
}

fn describe(pattern: &Pattern) -> String {
    if let Some(description) = pattern.trace().and_then(Trace::description) {
        return description.to_string();
    }
    match pattern.members() {
        // bare shorthands such as `\d` go by their name
        Some([ClassItem::Shorthand(shorthand)]) if pattern.source().len() == 2 => {
            shorthand.name().to_string()
        }
        _ => format!("{:?}", pattern.source()),
    }
}

fn reference(pattern: &Pattern) -> String {
    let inner = pattern
        .trace()
        .and_then(Trace::reference)
        .unwrap_or(pattern.source());
    if inner.is_empty() {
        String::new()
    } else {
        format!("(?:{})", inner)
    }
}

/// Reference for `pattern` repeated as `request` says
///
/// Operands that never consume input are not repeated, the same way
/// [`quantifier::repeat`] treats them.
fn repeated_reference(pattern: &Pattern, request: Repeat) -> String {
    if request.max() == Some(0) || (pattern.is_zero_width() && request.min() == 0) {
        String::new()
    } else if pattern.is_zero_width() {
        reference(pattern)
    } else {
        format!("{}{}", reference(pattern), request)
    }
}

fn list(patterns: &[&Pattern], f: fn(&Pattern) -> String, sep: &str) -> String {
    patterns.iter().map(|p| f(p)).collect::<Vec<_>>().join(sep)
}

/// Reference regex for one set member, as an alternation of single characters
fn member_reference(member: &SetMember) -> String {
    match member {
        SetMember::Char(c) => escape::escape_text(&c.to_string()),
        SetMember::Range(range) => {
            let (start, stop) = (range.start() as u32, range.stop() as u32);
            if stop - start < SPELLED_RANGE {
                (start..=stop)
                    .filter_map(char::from_u32)
                    .map(|c| escape::escape_text(&c.to_string()))
                    .collect::<Vec<_>>()
                    .join("|")
            } else {
                format!("[{}]", ClassItem::Range(range.start(), range.stop()))
            }
        }
        SetMember::Set(set) => match set.trace().and_then(Trace::reference) {
            Some(r) => r.to_string(),
            None => set.source().to_string(),
        },
    }
}

/// Builds patterns under a fixed [`Config`]
#[derive(Debug, Clone, Default)]
pub struct Factory {
    config: Config,
}

impl Factory {
    pub fn new(config: Config) -> Self {
        Factory { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn traced(
        &self,
        pattern: Pattern,
        description: impl FnOnce() -> String,
        reference: impl FnOnce() -> String,
    ) -> Pattern {
        if !self.config.traces() {
            return pattern;
        }
        pattern.with_trace(Trace {
            description: self.config.describe.then(description),
            reference: self.config.reference.then(reference),
        })
    }

    fn traced_set(
        &self,
        set: CharSet,
        description: impl FnOnce() -> String,
        reference: impl FnOnce() -> String,
    ) -> CharSet {
        set.map_pattern(|p| self.traced(p, description, reference))
    }

    /// See [`escape::escape`]
    pub fn escape(&self, literal: &str) -> Pattern {
        self.traced(
            escape::escape(literal),
            || {
                if escape::escape_text(literal) == literal {
                    format!("{:?}", literal)
                } else {
                    format!("escape({:?})", literal)
                }
            },
            || escape::escape_text(literal),
        )
    }

    /// See [`Pattern::from_raw_with`]; validated with this factory's dialect
    pub fn raw(&self, source: &str) -> Result<Pattern> {
        let pattern = Pattern::from_raw_with(source, self.config.dialect)?;
        Ok(self.traced(
            pattern,
            || format!("raw({:?})", source),
            || source.to_string(),
        ))
    }

    /// See [`combinators::concat`]
    pub fn concat(&self, patterns: &[&Pattern]) -> Pattern {
        self.traced(
            combinators::concat(patterns.iter().copied()),
            || {
                if patterns.is_empty() {
                    "concat()".to_string()
                } else {
                    list(patterns, describe, " + ")
                }
            },
            || list(patterns, reference, ""),
        )
    }

    /// See [`combinators::alt`]
    pub fn alt(&self, patterns: &[&Pattern]) -> Pattern {
        self.traced(
            combinators::alt(patterns.iter().copied()),
            || format!("alt({})", list(patterns, describe, ", ")),
            || {
                if patterns.is_empty() {
                    sets::never().source().to_string()
                } else {
                    list(patterns, reference, "|")
                }
            },
        )
    }

    /// See [`quantifier::quantify`]
    pub fn quantify(
        &self,
        pattern: &Pattern,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    ) -> Result<Pattern> {
        let request = Repeat::new(min, max, greedy)?;
        Ok(self.traced(
            quantifier::repeat(pattern, request),
            || {
                let mut pieces = vec![describe(pattern), min.to_string()];
                match max {
                    Some(max) => pieces.push(max.to_string()),
                    None => pieces.push("..".to_string()),
                }
                if !greedy {
                    pieces.push("lazy".to_string());
                }
                format!("amount({})", pieces.join(", "))
            },
            || repeated_reference(pattern, request),
        ))
    }

    /// See [`quantifier::amount`]
    pub fn amount(&self, pattern: &Pattern, min: u32, max: Option<u32>) -> Result<Pattern> {
        self.quantify(pattern, min, max, true)
    }

    /// See [`quantifier::exactly`]
    pub fn exactly(&self, pattern: &Pattern, n: u32) -> Pattern {
        let request = Repeat::exactly(n);
        self.traced(
            quantifier::repeat(pattern, request),
            || format!("amount({}, {})", describe(pattern), n),
            || repeated_reference(pattern, request),
        )
    }

    /// See [`quantifier::optional`]
    pub fn optional(&self, pattern: &Pattern, greedy: bool) -> Pattern {
        self.traced(
            quantifier::optional(pattern, greedy),
            || {
                if greedy {
                    format!("optional({})", describe(pattern))
                } else {
                    format!("optional({}, lazy)", describe(pattern))
                }
            },
            || repeated_reference(pattern, Repeat::at_most(1).with_greedy(greedy)),
        )
    }

    /// See [`quantifier::multi`]
    pub fn multi(&self, pattern: &Pattern, match_zero: bool, greedy: bool) -> Pattern {
        let request = Repeat::at_least(if match_zero { 0 } else { 1 }).with_greedy(greedy);
        self.traced(
            quantifier::multi(pattern, match_zero, greedy),
            || {
                let mut pieces = vec![describe(pattern)];
                if match_zero {
                    pieces.push("match_zero".to_string());
                }
                if !greedy {
                    pieces.push("lazy".to_string());
                }
                format!("multi({})", pieces.join(", "))
            },
            || repeated_reference(pattern, request),
        )
    }

    fn build_set<I>(&self, negate: bool, members: I) -> Result<CharSet>
    where
        I: IntoIterator,
        I::Item: Into<SetMember>,
    {
        let members: Vec<SetMember> = members.into_iter().map(Into::into).collect();
        let set = sets::build_set(negate, members.iter().cloned())?;
        Ok(self.traced_set(
            set,
            || {
                let described: Vec<String> = members
                    .iter()
                    .map(|m| match m {
                        SetMember::Char(c) => format!("{:?}", c),
                        SetMember::Range(r) => format!("range({:?}, {:?})", r.start(), r.stop()),
                        SetMember::Set(s) => describe(s),
                    })
                    .collect();
                let name = if negate { "not_set" } else { "set" };
                format!("{}({})", name, described.join(", "))
            },
            || {
                let alternatives: Vec<String> = members
                    .iter()
                    .map(|m| format!("(?:{})", member_reference(m)))
                    .collect();
                match (negate, alternatives.is_empty()) {
                    (false, true) => sets::never().source().to_string(),
                    (true, true) => sets::any_char().source().to_string(),
                    (false, false) => alternatives.join("|"),
                    (true, false) => format!(r"(?!{})[\s\S]", alternatives.join("|")),
                }
            },
        ))
    }

    /// See [`sets::set`]
    pub fn set<I>(&self, members: I) -> Result<CharSet>
    where
        I: IntoIterator,
        I::Item: Into<SetMember>,
    {
        self.build_set(false, members)
    }

    /// See [`sets::not_set`]
    pub fn not_set<I>(&self, members: I) -> Result<CharSet>
    where
        I: IntoIterator,
        I::Item: Into<SetMember>,
    {
        self.build_set(true, members)
    }

    /// See [`sets::range`]
    pub fn range(&self, start: char, stop: char) -> Result<CharSet> {
        let bounds = CharRange::new(start, stop)?;
        let set = sets::range(start, stop)?;
        Ok(self.traced_set(
            set,
            || format!("range({:?}, {:?})", start, stop),
            || member_reference(&SetMember::Range(bounds)),
        ))
    }

    /// See [`combinators::group`]
    pub fn group(&self, pattern: &Pattern) -> Pattern {
        self.traced(
            combinators::group(pattern),
            || format!("group({})", describe(pattern)),
            || format!("({})", reference(pattern)),
        )
    }

    /// See [`combinators::non_capturing`]
    pub fn non_capturing(&self, pattern: &Pattern) -> Pattern {
        self.traced(
            combinators::non_capturing(pattern),
            || format!("non_capturing({})", describe(pattern)),
            || reference(pattern),
        )
    }

    /// See [`combinators::named_group`]
    pub fn named_group(&self, name: &str, pattern: &Pattern) -> Result<Pattern> {
        Ok(self.traced(
            combinators::named_group(name, pattern)?,
            || format!("named_group({:?}, {})", name, describe(pattern)),
            || format!("(?<{}>{})", name, reference(pattern)),
        ))
    }

    /// See [`combinators::grouping`]
    pub fn grouping(
        &self,
        pattern: &Pattern,
        capturing: bool,
        name: Option<&str>,
    ) -> Result<Pattern> {
        combinators::grouping(pattern, capturing, name)?;
        match (capturing, name) {
            (true, Some(name)) => self.named_group(name, pattern),
            (true, None) => Ok(self.group(pattern)),
            (false, _) => Ok(self.non_capturing(pattern)),
        }
    }

    /// See [`combinators::lookaround`]
    pub fn lookaround(
        &self,
        direction: Direction,
        negate: bool,
        pattern: &Pattern,
    ) -> Result<Pattern> {
        self.config.dialect.require(Construct::Lookaround)?;
        Ok(self.traced(
            combinators::lookaround(direction, negate, pattern),
            || {
                let name = match (direction, negate) {
                    (Direction::Ahead, false) => "if_ahead",
                    (Direction::Ahead, true) => "if_not_ahead",
                    (Direction::Behind, false) => "if_behind",
                    (Direction::Behind, true) => "if_not_behind",
                };
                format!("{}({})", name, describe(pattern))
            },
            || format!("{}{})", combinators::opener(direction, negate), reference(pattern)),
        ))
    }

    /// See [`combinators::backreference`]
    pub fn backreference(&self, target: impl Into<GroupRef>) -> Result<Pattern> {
        self.config.dialect.require(Construct::Backreference)?;
        let target = target.into();
        let pattern = combinators::backreference(target.clone())?;
        let source = pattern.source().to_string();
        Ok(self.traced(
            pattern,
            || format!("backreference({})", target),
            || source,
        ))
    }

    /// See [`combinators::conditional`]
    pub fn conditional(
        &self,
        target: impl Into<GroupRef>,
        yes: &Pattern,
        no: &Pattern,
    ) -> Result<Pattern> {
        self.config.dialect.require(Construct::Conditional)?;
        let target = target.into();
        let pattern = combinators::conditional(target.clone(), yes, no)?;
        let condition = match &target {
            GroupRef::Index(n) => n.to_string(),
            GroupRef::Name(name) => format!("<{}>", name),
        };
        Ok(self.traced(
            pattern,
            || format!("conditional({}, {}, {})", target, describe(yes), describe(no)),
            || format!("(?({}){}|{})", condition, reference(yes), reference(no)),
        ))
    }

    /// See [`combinators::atomic`]
    pub fn atomic(&self, pattern: &Pattern) -> Result<Pattern> {
        self.config.dialect.require(Construct::AtomicGroup)?;
        Ok(self.traced(
            combinators::atomic(pattern),
            || format!("atomic({})", describe(pattern)),
            || format!("(?>{})", reference(pattern)),
        ))
    }
}

/// A printable summary of how a pattern was built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub description: String,
    pub reference: String,
    pub output: String,
}

impl Report {
    pub fn of(pattern: &Pattern) -> Self {
        Report {
            description: describe(pattern),
            reference: pattern
                .trace()
                .and_then(Trace::reference)
                .unwrap_or(pattern.source())
                .to_string(),
            output: pattern.source().to_string(),
        }
    }

    /// Print a formatted report of the pattern
    pub fn report(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pattern Report")?;
        writeln!(f, "==============")?;
        writeln!(f, "Input:     {}", self.description)?;
        writeln!(f, "Reference: {}", self.reference)?;
        write!(f, "Output:    {}", self.output)
    }
}
