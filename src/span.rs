//! Labeled spans and character offset handling.
//!
//! Offsets are counted in characters (Unicode scalar values), the unit
//! model servers report. [`CharIndex`] maps them onto byte positions so
//! the source text can be sliced without re-walking it for every span.

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};

/// A labeled substring range produced by the tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Span as it arrives from a tagger backend, before it is checked
/// against the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl RawSpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

/// Character-to-byte offset table for one text.
#[derive(Debug, Clone)]
pub struct CharIndex<'a> {
    text: &'a str,
    // byte offset of every char, plus text.len() as the sentinel
    bytes: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bytes.push(text.len());
        Self { text, bytes }
    }

    /// Number of characters in the text.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset of a character offset, clamped to the end of the text.
    pub fn byte(&self, char_offset: usize) -> usize {
        self.bytes[char_offset.min(self.len())]
    }

    /// Slice by character offsets. Out-of-range offsets are clamped.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let start = self.byte(start);
        let end = self.byte(end).max(start);
        &self.text[start..end]
    }

    /// Slice from a character offset to the end of the text.
    pub fn tail(&self, start: usize) -> &'a str {
        &self.text[self.byte(start)..]
    }

    pub fn text(&self) -> &'a str {
        self.text
    }
}

impl Span {
    /// Resolve a raw span against its source text.
    ///
    /// Fails when `0 <= start < end <= len` does not hold.
    pub fn resolve(index: &CharIndex<'_>, raw: RawSpan) -> Result<Self> {
        if raw.start >= raw.end || raw.end > index.len() {
            return Err(NerError::Processing(format!(
                "span {}..{} ({}) is outside text of {} chars",
                raw.start,
                raw.end,
                raw.label,
                index.len()
            )));
        }

        Ok(Self {
            text: index.slice(raw.start, raw.end).to_string(),
            label: raw.label,
            start: raw.start,
            end: raw.end,
        })
    }
}

/// Resolve every raw span for `text`, sorted by start offset.
///
/// The sort is stable, so spans that share a start keep the order the
/// model produced them in.
pub fn resolve_all(text: &str, mut raw: Vec<RawSpan>) -> Result<Vec<Span>> {
    let index = CharIndex::new(text);
    raw.sort_by_key(|s| s.start);
    raw.into_iter().map(|r| Span::resolve(&index, r)).collect()
}
