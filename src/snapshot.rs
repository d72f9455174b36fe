//! The immutable buffer text that one command invocation reads from.

use ropey::Rope;

use crate::region::Region;

/// Buffer text captured once per invocation, plus a line index over it.
///
/// Every address and pattern match is computed against a `Snapshot`; edits are
/// only ever described as [`Change`](crate::Change)s against it.
#[derive(Debug)]
pub struct Snapshot {
    text: String,
    lines: Rope,
}

impl Snapshot {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = Rope::from_str(&text);
        Self { text, lines }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The region covering the whole buffer.
    pub fn whole(&self) -> Region {
        Region::new(0, self.len())
    }

    /// The text of `region`, which must lie on char boundaries inside the buffer.
    pub fn slice(&self, region: Region) -> &str {
        &self.text[region.start..region.end]
    }

    /// Line `n`, 1-based, including its newline.
    ///
    /// Line 0 is the empty region at the start of the buffer. Lines past the
    /// end resolve to the empty region at the end of the buffer.
    pub fn line(&self, n: usize) -> Region {
        if n == 0 {
            return Region::point(0);
        }
        let idx = n - 1;
        if idx >= self.lines.len_lines() {
            return Region::point(self.len());
        }
        Region::new(
            self.lines.line_to_byte(idx),
            self.lines.line_to_byte(idx + 1),
        )
    }

    /// Clamp `offset` into the buffer and back onto a char boundary.
    pub fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Clamp both ends of a caller-supplied range, swapping them if reversed.
    pub fn clamp_region(&self, start: usize, end: usize) -> Region {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Region::new(self.clamp(start), self.clamp(end))
    }
}
