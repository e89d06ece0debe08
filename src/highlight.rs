//! Highlighted-text rendering.
//!
//! Splices a marker around every span and passes the text between spans
//! through untouched. Spans are expected sorted and disjoint; when they
//! are not, rendering still succeeds:
//!
//! - a span starting behind the cursor is clamped to start at the cursor
//! - a span ending at or before the cursor is skipped
//! - offsets past the end of the text are clamped to its length
//!
//! The marker always wraps the slice of the source text, so removing the
//! markers gives back the input exactly.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::labels;
use crate::span::{CharIndex, Span};

/// Marker flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    /// `<span class="entity-mark entity-LABEL">`, styled by the page's CSS.
    #[default]
    Class,
    /// Self-contained `<mark>` with inline CSS from the label legend.
    Inline,
}

/// Whether plain text is HTML-escaped.
///
/// `Verbatim` reproduces the reference output byte for byte, including
/// any markup contained in the input. `Escape` escapes plain segments,
/// entity text and labels while leaving the marker structure intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapePolicy {
    #[default]
    Verbatim,
    Escape,
}

/// Renders spans into highlighted HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlighter {
    pub style: MarkerStyle,
    pub escape: EscapePolicy,
}

impl Highlighter {
    #[must_use]
    pub fn new(style: MarkerStyle, escape: EscapePolicy) -> Self {
        Self { style, escape }
    }

    /// Render `text` with every span wrapped in a marker.
    pub fn render(&self, text: &str, spans: &[Span]) -> String {
        let index = CharIndex::new(text);
        let mut out = String::with_capacity(text.len() + spans.len() * 64);
        let mut cursor = 0;

        for span in spans {
            let end = span.end.min(index.len());
            let start = span.start.max(cursor);
            if start >= end {
                continue;
            }

            self.push_plain(&mut out, index.slice(cursor, start));
            self.push_marker(&mut out, index.slice(start, end), &span.label);
            cursor = end;
        }

        self.push_plain(&mut out, index.tail(cursor));
        out
    }

    fn push_plain(&self, out: &mut String, segment: &str) {
        match self.escape {
            EscapePolicy::Verbatim => out.push_str(segment),
            EscapePolicy::Escape => escape_into(out, segment),
        }
    }

    fn push_marker(&self, out: &mut String, text: &str, label: &str) {
        let (text, label) = match self.escape {
            EscapePolicy::Verbatim => (text.to_string(), label.to_string()),
            EscapePolicy::Escape => (escape_html(text), escape_html(label)),
        };

        // Writing into a String cannot fail.
        let _ = match self.style {
            MarkerStyle::Class => write!(
                out,
                "<span class=\"entity-mark entity-{label}\">{text} <small>[{label}]</small></span>"
            ),
            MarkerStyle::Inline => write!(
                out,
                "<mark style=\"background-color: {color}; padding: 0.2em 0.3em; \
                 border-radius: 0.25em; line-height: 2;\">{text} <span style=\"font-size: 0.8em; \
                 font-weight: bold; line-height: 1; border-radius: 0.35em; \
                 text-transform: uppercase; vertical-align: middle; margin-left: 0.5em\">\
                 {label}</span></mark>",
                color = labels::color(&label),
            ),
        };
    }
}

/// Render with the default class markers and no escaping.
pub fn render(text: &str, spans: &[Span]) -> String {
    Highlighter::default().render(text, spans)
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
