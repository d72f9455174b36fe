//! Addresses: descriptions of where in a buffer a command should operate.

use std::fmt;

use regex::Regex;

use crate::error::SamError;
use crate::parser::escape_delimited;
use crate::region::Region;
use crate::snapshot::Snapshot;

/// Which way a regular-expression address searches from the current region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `/re/`: from the end of the current region, wrapping to the start.
    Forward,
    /// `?re?`: from the start of the current region, wrapping to the end.
    Backward,
}

/// A parsed address. Carries no buffer reference; see [`Address::resolve`].
#[derive(Debug, Clone)]
pub enum Address {
    /// `.`: the region the enclosing command is already operating on.
    Dot,
    /// `$`: the end of the buffer.
    End,
    /// `#n`: byte offset `n`.
    Char(usize),
    /// `n`: line `n` (1-based; line 0 is the start of the buffer).
    Line(usize),
    /// `/re/` or `?re?`.
    Regex { pattern: Regex, direction: Direction },
    /// `a,b`: from the start of `a` to the end of `b`.
    Range(Box<Address>, Box<Address>),
}

impl Address {
    /// `,` on its own: the whole buffer.
    pub fn whole_buffer() -> Self {
        Address::Range(Box::new(Address::Line(0)), Box::new(Address::End))
    }

    /// Compute the concrete region this address denotes in `snapshot`,
    /// relative to `current`.
    pub fn resolve(&self, snapshot: &Snapshot, current: Region) -> Result<Region, SamError> {
        match self {
            Address::Dot => Ok(current),
            Address::End => Ok(Region::point(snapshot.len())),
            Address::Char(offset) => Ok(Region::point(snapshot.clamp(*offset))),
            Address::Line(n) => Ok(snapshot.line(*n)),
            Address::Regex {
                pattern,
                direction: Direction::Forward,
            } => search_forward(pattern, snapshot, current),
            Address::Regex {
                pattern,
                direction: Direction::Backward,
            } => search_backward(pattern, snapshot, current),
            Address::Range(start, end) => {
                let from = start.resolve(snapshot, current)?;
                // The end address is relative to where the start landed.
                let to = end.resolve(snapshot, from)?;
                Ok(Region::new(from.start, to.end))
            }
        }
    }
}

// Searches always run over the whole text so that anchors and word
// boundaries see the real neighbouring characters.
fn search_forward(pattern: &Regex, snapshot: &Snapshot, current: Region) -> Result<Region, SamError> {
    let text = snapshot.text();
    let from = snapshot.clamp(current.end);

    if let Some(m) = pattern.find_at(text, from) {
        return Ok(Region::new(m.start(), m.end()));
    }
    if let Some(m) = pattern.find_iter(text).find(|m| m.start() < from) {
        return Ok(Region::new(m.start(), m.end()));
    }
    Err(SamError::NoMatch {
        pattern: pattern.as_str().to_string(),
    })
}

fn search_backward(pattern: &Regex, snapshot: &Snapshot, current: Region) -> Result<Region, SamError> {
    let text = snapshot.text();
    let to = snapshot.clamp(current.start);

    if let Some(m) = pattern.find_iter(text).filter(|m| m.end() <= to).last() {
        return Ok(Region::new(m.start(), m.end()));
    }
    if let Some(m) = pattern.find_iter(text).filter(|m| m.start() >= to).last() {
        return Ok(Region::new(m.start(), m.end()));
    }
    Err(SamError::NoMatch {
        pattern: pattern.as_str().to_string(),
    })
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Dot => write!(f, "."),
            Address::End => write!(f, "$"),
            Address::Char(n) => write!(f, "#{n}"),
            Address::Line(n) => write!(f, "{n}"),
            Address::Regex { pattern, direction } => {
                let delim = match direction {
                    Direction::Forward => '/',
                    Direction::Backward => '?',
                };
                write!(f, "{delim}{}{delim}", escape_delimited(pattern.as_str(), delim))
            }
            Address::Range(start, end) => match (start.as_ref(), end.as_ref()) {
                (Address::Line(0), Address::End) => write!(f, ","),
                _ => write!(f, "{start},{end}"),
            },
        }
    }
}
