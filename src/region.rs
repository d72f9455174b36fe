//! Byte ranges into a buffer snapshot, and pending edits expressed against them.

use std::fmt;

/// A half-open byte range `[start, end)` within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    /// Build a region, collapsing it to `start` if `end` lies before it.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// The empty region at `offset`.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shift a region found in a slice starting at `base` back into snapshot offsets.
    pub(crate) fn offset_by(self, base: usize) -> Self {
        Self {
            start: self.start + base,
            end: self.end + base,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{},#{}", self.start, self.end)
    }
}

/// A pending replacement of `snapshot[start..end]` with `text`.
///
/// Offsets always refer to the original snapshot, never to a partially edited buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Change {
    pub fn replace(region: Region, text: impl Into<String>) -> Self {
        Self {
            start: region.start,
            end: region.end,
            text: text.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(Region::point(offset), text)
    }
}
