use serde::{Deserialize, Serialize};

/// Handle to an element owned by a document. Engines only borrow these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub usize);

/// Handle to a searchable container element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub ElementId);

impl ContainerId {
    pub fn element(self) -> ElementId {
        self.0
    }
}

/// One text node as seen by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment<'a> {
    pub element: ElementId,
    pub tag: &'a str,
    pub text: &'a str,
}

impl<'a> TextSegment<'a> {
    pub fn new(element: ElementId, tag: &'a str, text: &'a str) -> Self {
        Self { element, tag, text }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A located occurrence of the search term.
///
/// `start_offset` and `end_offset` count characters, not bytes, within the
/// text of segment `segment` of `container`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub container: ContainerId,
    pub element: ElementId,
    pub segment: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl MatchRecord {
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched slice of `text`, where `text` is the segment the record was taken from.
    pub fn excerpt<'t>(&self, text: &'t str) -> Option<&'t str> {
        let mut indices = text.char_indices().map(|(index, _)| index).chain(Some(text.len()));
        let start = indices.nth(self.start_offset)?;
        let end = if self.is_empty() {
            start
        } else {
            indices.nth(self.len() - 1)?
        };
        text.get(start..end)
    }
}

/// Characters compare equal when their full lowercase expansions are equal.
pub fn chars_match_ignore_case(left: char, right: char) -> bool {
    left == right || left.to_lowercase().eq(right.to_lowercase())
}

pub fn normalize_term(input: &str) -> &str {
    input.trim()
}
