//! Request and response bodies of the JSON API.
//!
//! Shared by the CLI and the MCP server so both surfaces emit the same
//! shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::DescribedEntity;
use crate::patterns::PatternMatches;
use crate::span::Span;

/// `{ "text": ... }`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// `{ "texts": [...] }`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub texts: Option<Vec<String>>,
}

/// One entity in an extraction response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl From<&Span> for EntityRecord {
    fn from(span: &Span) -> Self {
        Self {
            text: span.text.clone(),
            label: span.label.clone(),
            start: span.start,
            end: span.end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub total_entities: usize,
    /// Every entity in text order, duplicates included.
    pub entities: Vec<EntityRecord>,
    /// Unique entity texts per label.
    pub entities_by_type: BTreeMap<String, Vec<String>>,
    pub people: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
    pub dates: Vec<String>,
    pub highlighted_html: String,
    /// Present only when pattern extraction is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_entities: Option<PatternMatches>,
}

/// Entity in a batch result; offsets are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntity {
    pub text: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Truncated preview of the input.
    pub text: String,
    pub entities: Vec<BatchEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

impl HealthResponse {
    pub fn healthy(model: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            model: model.to_string(),
        }
    }
}

/// Model entities and pattern matches side by side.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractAllResponse {
    pub standard_entities: Vec<DescribedEntity>,
    pub custom_entities: PatternMatches,
}

/// Batch preview: the first `chars` characters followed by `...`.
pub fn preview(text: &str, chars: usize) -> String {
    let mut out: String = text.chars().take(chars).collect();
    out.push_str("...");
    out
}
