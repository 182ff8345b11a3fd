//! Quantifier normalization
//!
//! A repetition request is validated once and then rewritten to the
//! shortest quantifier that means the same thing:
//!
//! | request        | result            |
//! |----------------|-------------------|
//! | `{0,0}`        | the empty pattern |
//! | `{1,1}`        | the operand       |
//! | `{0,1}`        | `?`               |
//! | `{0,}`         | `*`               |
//! | `{1,}`         | `+`               |
//! | `{n,n}`        | `{n}`             |
//! | anything else  | `{n,m}` / `{n,}`  |
//!
//! Lazy requests append one more `?`. Operands that never consume input
//! (the empty pattern, anchors, lookaround) are not repeated at all: they
//! come back once when the minimum is at least one and vanish otherwise.

use std::fmt;

use crate::error::{FactoryError, Result};
use crate::pattern::{Pattern, Precedence};

/// A validated repetition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Repeat {
    min: u32,
    max: Option<u32>,
    greedy: bool,
}

impl Repeat {
    /// Create a request; `max` of `None` means unbounded
    pub fn new(min: u32, max: Option<u32>, greedy: bool) -> Result<Self> {
        if let Some(max) = max {
            if max < min {
                return Err(FactoryError::InvalidQuantifier { min, max });
            }
        }
        Ok(Repeat { min, max, greedy })
    }

    /// Exactly `n` times
    pub fn exactly(n: u32) -> Self {
        Repeat {
            min: n,
            max: Some(n),
            greedy: true,
        }
    }

    /// `n` or more times
    pub fn at_least(n: u32) -> Self {
        Repeat {
            min: n,
            max: None,
            greedy: true,
        }
    }

    /// Up to `n` times
    pub fn at_most(n: u32) -> Self {
        Repeat {
            min: 0,
            max: Some(n),
            greedy: true,
        }
    }

    /// Between `min` and `max` times, inclusive
    pub fn between(min: u32, max: u32) -> Result<Self> {
        Repeat::new(min, Some(max), true)
    }

    /// The same request, matching as few repetitions as possible
    pub fn lazy(self) -> Self {
        self.with_greedy(false)
    }

    pub fn with_greedy(self, greedy: bool) -> Self {
        Repeat { greedy, ..self }
    }

    /// Minimum repetitions
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Maximum repetitions, `None` when unbounded
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Whether as many repetitions as possible are tried first
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// The shortest quantifier suffix, or `None` when no suffix is needed
    fn suffix(&self) -> Option<String> {
        let base = match (self.min, self.max) {
            (1, Some(1)) => return None,
            (0, Some(1)) => "?".to_string(),
            (0, None) => "*".to_string(),
            (1, None) => "+".to_string(),
            (n, Some(m)) if n == m => format!("{{{}}}", n),
            (n, Some(m)) => format!("{{{},{}}}", n, m),
            (n, None) => format!("{{{},}}", n),
        };
        Some(if self.greedy { base } else { base + "?" })
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{{{},{}}}", self.min, max)?,
            None => write!(f, "{{{},}}", self.min)?,
        }
        if !self.greedy {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Apply a validated request to a pattern
pub fn repeat(pattern: &Pattern, request: Repeat) -> Pattern {
    if request.max == Some(0) {
        return Pattern::empty();
    }
    if pattern.is_zero_width() {
        return if request.min == 0 {
            Pattern::empty()
        } else {
            pattern.clone()
        };
    }
    match request.suffix() {
        None => pattern.clone(),
        Some(suffix) => Pattern::new(
            format!("{}{}", pattern.embed(Precedence::Atom), suffix),
            Precedence::Quantified,
        ),
    }
}

/// Repeat between `min` and `max` times (`None` = unbounded)
pub fn quantify(pattern: &Pattern, min: u32, max: Option<u32>, greedy: bool) -> Result<Pattern> {
    Ok(repeat(pattern, Repeat::new(min, max, greedy)?))
}

/// Greedy repetition between `min` and `max` times (`None` = unbounded)
pub fn amount(pattern: &Pattern, min: u32, max: Option<u32>) -> Result<Pattern> {
    quantify(pattern, min, max, true)
}

/// Exactly `n` times
pub fn exactly(pattern: &Pattern, n: u32) -> Pattern {
    repeat(pattern, Repeat::exactly(n))
}

/// Zero or one time
pub fn optional(pattern: &Pattern, greedy: bool) -> Pattern {
    repeat(pattern, Repeat::at_most(1).with_greedy(greedy))
}

/// One or more times, or zero or more with `match_zero`
pub fn multi(pattern: &Pattern, match_zero: bool, greedy: bool) -> Pattern {
    let min = if match_zero { 0 } else { 1 };
    repeat(pattern, Repeat::at_least(min).with_greedy(greedy))
}
