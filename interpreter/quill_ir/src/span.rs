//! Source spans.

use std::fmt;

/// Byte-offset range into the original source text.
///
/// The evaluator never inspects source text; spans exist so a front end
/// can map runtime failures back to locations.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span used for synthesized nodes (builder-constructed programs).
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_is_zero_width() {
        assert_eq!(Span::DUMMY, Span::new(0, 0));
    }

    #[test]
    fn debug_formats_as_range() {
        assert_eq!(format!("{:?}", Span::new(3, 9)), "3..9");
    }
}
