//! Legend for the labels common pretrained models emit.
//!
//! The label vocabulary is open: anything not listed here is still valid
//! and renders with [`GENERIC_COLOR`].

/// Description used for labels outside the legend.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown entity type";

/// Highlight colour for labels without a dedicated one.
pub const GENERIC_COLOR: &str = "#ddd";

/// Labels treated as locations by the grouped lists.
pub const LOCATION_LABELS: &[&str] = &["GPE", "LOC"];

/// Labels replaced by [`crate::analysis::anonymize`] when none are given.
pub const DEFAULT_ANONYMIZE: &[&str] = &["PERSON", "ORG", "GPE", "DATE"];

/// Labels that get an encyclopedia link.
pub const LINKABLE_LABELS: &[&str] = &["PERSON", "ORG", "GPE"];

/// One legend entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub color: Option<&'static str>,
}

#[rustfmt::skip]
const LEGEND: &[LabelInfo] = &[
    LabelInfo { label: "PERSON", description: "People, including fictional", color: Some("#aa9cfc") },
    LabelInfo { label: "NORP", description: "Nationalities or religious or political groups", color: None },
    LabelInfo { label: "FAC", description: "Buildings, airports, highways, bridges, etc.", color: None },
    LabelInfo { label: "ORG", description: "Companies, agencies, institutions, etc.", color: Some("#7aecec") },
    LabelInfo { label: "GPE", description: "Countries, cities, states", color: Some("#feca74") },
    LabelInfo { label: "LOC", description: "Non-GPE locations, mountain ranges, bodies of water", color: Some("#ff9561") },
    LabelInfo { label: "PRODUCT", description: "Objects, vehicles, foods, etc.", color: Some("#ffeb80") },
    LabelInfo { label: "EVENT", description: "Named hurricanes, battles, wars, sports events, etc.", color: Some("#ff6b6b") },
    LabelInfo { label: "WORK_OF_ART", description: "Titles of books, songs, etc.", color: None },
    LabelInfo { label: "LAW", description: "Named documents made into laws", color: None },
    LabelInfo { label: "LANGUAGE", description: "Any named language", color: None },
    LabelInfo { label: "DATE", description: "Absolute or relative dates or periods", color: Some("#bfe1d9") },
    LabelInfo { label: "TIME", description: "Times smaller than a day", color: None },
    LabelInfo { label: "PERCENT", description: "Percentage, including \"%\"", color: None },
    LabelInfo { label: "MONEY", description: "Monetary values, including unit", color: Some("#e4e7d2") },
    LabelInfo { label: "QUANTITY", description: "Measurements, as of weight or distance", color: None },
    LabelInfo { label: "ORDINAL", description: "\"first\", \"second\", etc.", color: None },
    LabelInfo { label: "CARDINAL", description: "Numerals that do not fall under another type", color: None },
];

/// All legend entries, in display order.
pub fn legend() -> &'static [LabelInfo] {
    LEGEND
}

pub fn lookup(label: &str) -> Option<&'static LabelInfo> {
    LEGEND.iter().find(|info| info.label == label)
}

pub fn is_known(label: &str) -> bool {
    lookup(label).is_some()
}

pub fn description(label: &str) -> &'static str {
    lookup(label).map_or(UNKNOWN_DESCRIPTION, |info| info.description)
}

pub fn color(label: &str) -> &'static str {
    lookup(label)
        .and_then(|info| info.color)
        .unwrap_or(GENERIC_COLOR)
}
