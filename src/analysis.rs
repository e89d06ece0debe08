//! Grouping, counting and rewriting over tagged spans.
//!
//! Grouped lists are deduplicated and keep the first occurrence of each
//! text; the raw entity list is never deduplicated.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{NerError, Result};
use crate::labels;
use crate::span::{CharIndex, Span};

/// How many entries [`summarize`] reports as most common.
pub const MOST_COMMON_LIMIT: usize = 10;

/// Default number of characters shown on each side by [`contexts`].
pub const DEFAULT_CONTEXT_WINDOW: usize = 50;

/// Entity with its legend description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribedEntity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub description: &'static str,
}

/// Entity with an optional encyclopedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedEntity {
    #[serde(flatten)]
    pub entity: DescribedEntity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_url: Option<String>,
}

/// Counts and groupings for one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_entities: usize,
    pub entity_counts: BTreeMap<String, usize>,
    /// Every entity text per label, duplicates included.
    pub entities_by_type: BTreeMap<String, Vec<String>>,
    pub most_common_entities: Vec<(String, usize)>,
    /// Labels in order of first appearance.
    pub entity_types_found: Vec<String>,
}

pub fn describe(spans: &[Span]) -> Vec<DescribedEntity> {
    spans
        .iter()
        .map(|s| DescribedEntity {
            text: s.text.clone(),
            label: s.label.clone(),
            start: s.start,
            end: s.end,
            description: labels::description(&s.label),
        })
        .collect()
}

/// Drop repeated strings, keeping the first occurrence.
pub fn unique<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    texts
        .into_iter()
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Unique texts of the spans carrying `label`.
pub fn by_label(spans: &[Span], label: &str) -> Vec<String> {
    by_labels(spans, &[label])
}

/// Unique texts of the spans carrying any of `wanted`.
pub fn by_labels(spans: &[Span], wanted: &[&str]) -> Vec<String> {
    unique(
        spans
            .iter()
            .filter(|s| wanted.contains(&s.label.as_str()))
            .map(|s| s.text.as_str()),
    )
}

pub fn people(spans: &[Span]) -> Vec<String> {
    by_label(spans, "PERSON")
}

pub fn organizations(spans: &[Span]) -> Vec<String> {
    by_label(spans, "ORG")
}

pub fn locations(spans: &[Span]) -> Vec<String> {
    by_labels(spans, labels::LOCATION_LABELS)
}

pub fn dates(spans: &[Span]) -> Vec<String> {
    by_label(spans, "DATE")
}

pub fn money(spans: &[Span]) -> Vec<String> {
    by_label(spans, "MONEY")
}

/// Texts per label, duplicates included, in span order.
pub fn group_all(spans: &[Span]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for span in spans {
        groups
            .entry(span.label.clone())
            .or_default()
            .push(span.text.clone());
    }
    groups
}

/// Texts per label with duplicates removed.
pub fn group_unique(spans: &[Span]) -> BTreeMap<String, Vec<String>> {
    group_all(spans)
        .into_iter()
        .map(|(label, texts)| (label, unique(texts.iter().map(String::as_str))))
        .collect()
}

pub fn summarize(spans: &[Span]) -> Summary {
    let mut entity_counts = BTreeMap::new();
    let mut entity_types_found = Vec::new();
    for span in spans {
        let count = entity_counts.entry(span.label.clone()).or_insert(0);
        if *count == 0 {
            entity_types_found.push(span.label.clone());
        }
        *count += 1;
    }

    Summary {
        total_entities: spans.len(),
        entity_counts,
        entities_by_type: group_all(spans),
        most_common_entities: most_common(spans, MOST_COMMON_LIMIT),
        entity_types_found,
    }
}

/// Most frequent entity texts, ties broken by first appearance.
pub fn most_common(spans: &[Span], limit: usize) -> Vec<(String, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for span in spans {
        let count = counts.entry(span.text.as_str()).or_insert(0);
        if *count == 0 {
            order.push(span.text.as_str());
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|text| (text.to_string(), counts[text]))
        .collect();
    // Stable: equal counts keep first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Text around every occurrence of `entity_text`, `window` characters on
/// each side, clamped to the text.
pub fn contexts(text: &str, spans: &[Span], entity_text: &str, window: usize) -> Vec<String> {
    let index = CharIndex::new(text);
    spans
        .iter()
        .filter(|s| s.text == entity_text)
        .map(|s| {
            let start = s.start.saturating_sub(window);
            let end = s.end.saturating_add(window).min(index.len());
            index.slice(start, end).to_string()
        })
        .collect()
}

/// Replace spans whose label is in `wanted` with `[LABEL]`.
///
/// Uses [`labels::DEFAULT_ANONYMIZE`] when `wanted` is empty. Overlapping
/// spans are clamped the same way the highlighter clamps them.
pub fn anonymize(text: &str, spans: &[Span], wanted: &[&str]) -> String {
    let wanted = if wanted.is_empty() {
        labels::DEFAULT_ANONYMIZE
    } else {
        wanted
    };

    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let index = CharIndex::new(text);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in ordered {
        if !wanted.contains(&span.label.as_str()) {
            continue;
        }
        let end = span.end.min(index.len());
        let start = span.start.max(cursor);
        if start >= end {
            continue;
        }
        out.push_str(index.slice(cursor, start));
        out.push('[');
        out.push_str(&span.label);
        out.push(']');
        cursor = end;
    }

    out.push_str(index.tail(cursor));
    out
}

/// Attach Wikipedia links to people, organizations and places.
pub fn link(spans: &[Span]) -> Vec<LinkedEntity> {
    describe(spans)
        .into_iter()
        .map(|entity| {
            let wiki_url = labels::LINKABLE_LABELS
                .contains(&entity.label.as_str())
                .then(|| {
                    format!(
                        "https://en.wikipedia.org/wiki/{}",
                        entity.text.replace(' ', "_")
                    )
                });
            LinkedEntity { entity, wiki_url }
        })
        .collect()
}

/// Export formats for [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(NerError::ClientInput(format!(
                "unknown export format '{other}' (expected json or csv)"
            ))),
        }
    }
}

/// Serialize described entities as pretty JSON or CSV.
pub fn export(spans: &[Span], format: ExportFormat) -> Result<String> {
    let entities = describe(spans);
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&entities)?),
        ExportFormat::Csv => {
            let mut out = String::from("text,label,start,end,description");
            for e in &entities {
                // Writing into a String cannot fail.
                let _ = write!(
                    out,
                    "\n\"{}\",{},{},{},\"{}\"",
                    e.text, e.label, e.start, e.end, e.description
                );
            }
            Ok(out)
        }
    }
}
