//! Styled text for reports and notices.
//!
//! Reports are a sequence of [`Segment`]s, each tagged with a [`Style`].
//! How a style is rendered (colour codes, bold, nothing at all) is up to
//! the [`Broadcaster`](crate::Broadcaster); `Display` gives plain text.

use std::fmt;

/// Presentation hint for a text segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    /// Unstyled body text.
    Plain,
    /// Section headings.
    Emphasis,
    /// Values and keys the reader scans for.
    Highlight,
}

/// A run of text sharing one style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Presentation hint.
    pub style: Style,
    /// The text itself.
    pub text: String,
}

/// An ordered sequence of styled segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledText {
    segments: Vec<Segment>,
}

impl StyledText {
    /// An empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment. Empty strings are dropped.
    pub fn push(&mut self, style: Style, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(Segment { style, text });
        }
        self
    }

    /// Append unstyled text.
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Style::Plain, text)
    }

    /// Append a heading.
    pub fn emphasis(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Style::Emphasis, text)
    }

    /// Append a highlighted value.
    pub fn highlight(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Style::Highlight, text)
    }

    /// The segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether no text has been appended.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for StyledText {
    fn from(s: &str) -> Self {
        let mut t = Self::new();
        t.plain(s);
        t
    }
}

impl From<String> for StyledText {
    fn from(s: String) -> Self {
        let mut t = Self::new();
        t.plain(s);
        t
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            f.write_str(&seg.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_concatenates_segments() {
        let mut t = StyledText::new();
        t.emphasis("-- Overworld --\n")
            .plain(" - ")
            .highlight("[8 8]   ")
            .plain("1.000 ms\n");
        assert_eq!(t.to_string(), "-- Overworld --\n - [8 8]   1.000 ms\n");
        assert_eq!(t.segments().len(), 4);
        assert_eq!(t.segments()[0].style, Style::Emphasis);
    }

    #[test]
    fn empty_pushes_are_dropped() {
        let mut t = StyledText::new();
        t.plain("").highlight(String::new());
        assert!(t.is_empty());
    }
}
