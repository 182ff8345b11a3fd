//! Escaping literal text into patterns

use crate::pattern::{Pattern, Precedence};
use crate::sets::ClassItem;

/// Escape `literal` so that it matches itself, whatever the mode flags
///
/// Metacharacters get a backslash. Whitespace is written as an escape
/// sequence because the extended (`x`) flag ignores it otherwise.
pub(crate) fn escape_text(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        push_escaped(&mut out, c);
    }
    out
}

pub(crate) fn push_escaped(out: &mut String, c: char) {
    match c {
        '\t' => out.push_str(r"\t"),
        '\n' => out.push_str(r"\n"),
        '\r' => out.push_str(r"\r"),
        c if c.is_whitespace() => out.push_str(&format!(r"\x{{{:X}}}", c as u32)),
        c => {
            let mut buf = [0; 4];
            out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }
}

/// Build a pattern matching `literal` verbatim
///
/// - `""` becomes the empty pattern.
/// - A single character becomes an atom that also merges into sets.
/// - Longer text already behaves like a concatenation of atoms, so it is
///   only parenthesized once something quantifies it.
pub fn escape(literal: &str) -> Pattern {
    let mut chars = literal.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Pattern::empty(),
        (Some(c), None) => Pattern::with_members(
            escape_text(literal),
            Precedence::Atom,
            vec![ClassItem::Char(c)],
        ),
        _ => Pattern::new(escape_text(literal), Precedence::Concatenation),
    }
}
