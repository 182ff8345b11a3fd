//! Composition combinators
//!
//! Each combinator decides per operand whether it must be parenthesized,
//! based on the operand's precedence and the position it lands in:
//!
//! | position                         | operand needs at least |
//! |----------------------------------|------------------------|
//! | concatenation operand            | `Concatenation`        |
//! | alternation branch               | `Alternation`          |
//! | conditional branch               | `Concatenation`        |
//! | inside `(...)`, lookaround, etc. | nothing                |

use std::fmt;

use crate::error::{FactoryError, Result};
use crate::pattern::{Pattern, Precedence};
use crate::sets::{CharSet, ClassItem};

/// Match every pattern in sequence
///
/// Empty operands are dropped; a single remaining operand comes back as it
/// is.
pub fn concat<'a, I>(patterns: I) -> Pattern
where
    I: IntoIterator<Item = &'a Pattern>,
{
    let parts: Vec<&Pattern> = patterns.into_iter().filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [] => Pattern::empty(),
        [only] => (*only).clone(),
        _ => {
            let source: String = parts
                .iter()
                .map(|p| p.embed(Precedence::Concatenation))
                .collect();
            Pattern::new(source, Precedence::Concatenation)
                .with_zero_width(parts.iter().all(|p| p.is_zero_width()))
        }
    }
}

/// Match any one of the patterns, tried from left to right
///
/// - No operands gives a pattern that never matches.
/// - One operand comes back as it is.
/// - When every operand is a plain character set (single characters,
///   ranges, shorthands, sets), they fold into one bracket expression.
pub fn alt<'a, I>(patterns: I) -> Pattern
where
    I: IntoIterator<Item = &'a Pattern>,
{
    let branches: Vec<&Pattern> = patterns.into_iter().collect();
    if let [only] = branches.as_slice() {
        return (*only).clone();
    }

    if let Some(members) = char_set_members(&branches) {
        return CharSet::from_items(false, members).into_pattern();
    }

    let source = branches
        .iter()
        .map(|p| p.embed(Precedence::Alternation))
        .collect::<Vec<_>>()
        .join("|");
    Pattern::new(source, Precedence::Alternation)
        .with_zero_width(branches.iter().all(|p| p.is_zero_width()))
}

/// Tokens of every branch, or `None` if some branch is not a plain set
fn char_set_members(branches: &[&Pattern]) -> Option<Vec<ClassItem>> {
    let mut items = Vec::new();
    for branch in branches {
        items.extend_from_slice(branch.members()?);
    }
    Some(items)
}

/// A capturing group `(...)`
pub fn group(pattern: &Pattern) -> Pattern {
    Pattern::new(format!("({})", pattern.source()), Precedence::Atom)
        .with_zero_width(pattern.is_zero_width())
}

/// A non-capturing group `(?:...)`
///
/// Grouping the empty pattern gives the empty pattern back.
pub fn non_capturing(pattern: &Pattern) -> Pattern {
    if pattern.is_empty() {
        return Pattern::empty();
    }
    Pattern::new(format!("(?:{})", pattern.source()), Precedence::Atom)
        .with_zero_width(pattern.is_zero_width())
}

/// A named capturing group `(?<name>...)`
pub fn named_group(name: &str, pattern: &Pattern) -> Result<Pattern> {
    validate_group_name(name)?;
    Ok(Pattern::new(
        format!("(?<{}>{})", name, pattern.source()),
        Precedence::Atom,
    )
    .with_zero_width(pattern.is_zero_width()))
}

/// A group configured by flag
///
/// A name only makes sense on a capturing group; asking for a named
/// non-capturing group is a configuration error.
pub fn grouping(pattern: &Pattern, capturing: bool, name: Option<&str>) -> Result<Pattern> {
    match (capturing, name) {
        (true, Some(name)) => named_group(name, pattern),
        (true, None) => Ok(group(pattern)),
        (false, None) => Ok(non_capturing(pattern)),
        (false, Some(name)) => Err(FactoryError::Configuration(format!(
            "group name '{}' requires a capturing group",
            name
        ))),
    }
}

/// An atomic group `(?>...)`: once matched, it is never re-entered
pub fn atomic(pattern: &Pattern) -> Pattern {
    Pattern::new(format!("(?>{})", pattern.source()), Precedence::Atom)
        .with_zero_width(pattern.is_zero_width())
}

/// Which side of the current position a lookaround inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The text after the current position
    Ahead,
    /// The text before the current position
    Behind,
}

/// A zero-width assertion on the text next to the current position
pub fn lookaround(direction: Direction, negate: bool, pattern: &Pattern) -> Pattern {
    Pattern::new(
        format!("{}{})", opener(direction, negate), pattern.source()),
        Precedence::Atom,
    )
    .with_zero_width(true)
}

pub(crate) fn opener(direction: Direction, negate: bool) -> &'static str {
    match (direction, negate) {
        (Direction::Ahead, false) => "(?=",
        (Direction::Ahead, true) => "(?!",
        (Direction::Behind, false) => "(?<=",
        (Direction::Behind, true) => "(?<!",
    }
}

/// Succeed only if `pattern` matches right after this position
pub fn if_ahead(pattern: &Pattern) -> Pattern {
    lookaround(Direction::Ahead, false, pattern)
}

/// Succeed only if `pattern` does not match right after this position
pub fn if_not_ahead(pattern: &Pattern) -> Pattern {
    lookaround(Direction::Ahead, true, pattern)
}

/// Succeed only if `pattern` matches right before this position
pub fn if_behind(pattern: &Pattern) -> Pattern {
    lookaround(Direction::Behind, false, pattern)
}

/// Succeed only if `pattern` does not match right before this position
pub fn if_not_behind(pattern: &Pattern) -> Pattern {
    lookaround(Direction::Behind, true, pattern)
}

/// A reference to a capture group, by index (1-based) or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupRef {
    /// Group index (\1, \2, etc.)
    Index(u32),
    /// Group name
    Name(String),
}

impl GroupRef {
    fn validate(&self) -> Result<()> {
        match self {
            GroupRef::Index(0) => Err(FactoryError::Configuration(
                "group indices start at 1".to_string(),
            )),
            GroupRef::Index(_) => Ok(()),
            GroupRef::Name(name) => validate_group_name(name),
        }
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Index(n) => write!(f, "{}", n),
            GroupRef::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<u32> for GroupRef {
    fn from(index: u32) -> Self {
        GroupRef::Index(index)
    }
}

impl From<&str> for GroupRef {
    fn from(name: &str) -> Self {
        GroupRef::Name(name.to_string())
    }
}

impl From<String> for GroupRef {
    fn from(name: String) -> Self {
        GroupRef::Name(name)
    }
}

/// Match the text an earlier group captured
///
/// Whether the group exists is only checked when the finished pattern is
/// compiled.
pub fn backreference(target: impl Into<GroupRef>) -> Result<Pattern> {
    let target = target.into();
    target.validate()?;
    Ok(match target {
        // digits spliced after `\1` would extend the group number
        GroupRef::Index(n) => Pattern::new(format!("\\{}", n), Precedence::Unknown),
        GroupRef::Name(name) => Pattern::new(format!("\\k<{}>", name), Precedence::Atom),
    })
}

/// Match `yes` if the group took part in the match so far, `no` otherwise
pub fn conditional(target: impl Into<GroupRef>, yes: &Pattern, no: &Pattern) -> Result<Pattern> {
    let target = target.into();
    target.validate()?;
    let condition = match &target {
        GroupRef::Index(n) => n.to_string(),
        GroupRef::Name(name) => format!("<{}>", name),
    };
    Ok(Pattern::new(
        format!(
            "(?({}){}|{})",
            condition,
            yes.embed(Precedence::Concatenation),
            no.embed(Precedence::Concatenation)
        ),
        Precedence::Atom,
    )
    .with_zero_width(yes.is_zero_width() && no.is_zero_width()))
}

/// Group names follow `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn validate_group_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FactoryError::Configuration(format!(
            "invalid group name '{}'",
            name
        )))
    }
}
