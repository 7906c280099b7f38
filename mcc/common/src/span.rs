/// A span which uniquely specifies a range of bytes in the input files
///
/// Spans of different files never overlap, see [`InputFiles`](crate::InputFiles).
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy, Default)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    /// Creates a new `Span` from the starting byte and its length
    pub fn new(start: usize, len: usize) -> Self {
        Span { start, len }
    }

    /// Creates an empty span at `start`
    pub fn empty(start: usize) -> Self {
        Span { start, len: 0 }
    }

    /// Returns the start of this span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the end of this span
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Returns the length of this span
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns, whether this span is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Constructs a new span which ranges from the start of this span to the end of the other span
    pub fn until(&self, other: Span) -> Self {
        assert!(
            self.start <= other.end(),
            "Span length must not be negative"
        );
        Span::new(self.start, other.end() - self.start)
    }

    /// Returns the same span, moved `offset` bytes to the right
    pub fn offset(&self, offset: usize) -> Self {
        Span::new(self.start + offset, self.len)
    }

    /// Returns a tuple of the format (`start_index`, `end_index`)
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.start, self.end())
    }

    /// Converts this byte span, which must be local to `text`, to a span of chars
    pub fn char_bounds(&self, text: &str) -> (usize, usize) {
        let start = text[..self.start.min(text.len())].chars().count();
        let len = text
            .get(self.start..self.end().min(text.len()))
            .map_or(0, |slice| slice.chars().count());
        (start, start + len)
    }
}

#[cfg(test)]
mod tests {

    use crate::Span;

    #[test]
    fn span_correct() {
        let span = Span::new(0, 1);

        assert_eq!(span.start(), 0);
        assert_eq!(span.end(), 1);
        assert_eq!(span.len(), 1);
        assert_eq!(span.as_tuple(), (0, 1));
    }

    #[test]
    fn span_until() {
        let span = Span::new(2, 3).until(Span::new(10, 2));
        assert_eq!(span, Span::new(2, 10));
    }

    #[test]
    fn char_bounds_multibyte() {
        let text = "ä = 1";
        // 'ä' is two bytes wide
        let span = Span::new(2, 3);
        assert_eq!(span.char_bounds(text), (1, 4));
    }
}
