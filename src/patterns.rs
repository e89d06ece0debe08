//! Regex extraction of structured tokens the tagger does not cover.
//!
//! Every pattern scans the whole input independently. The built-in set is
//! deliberately lax: `999.999.999.999` is an IP address, any 16 digits in
//! groups of four are a card number. Tightening them changes results.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{NerError, Result};

/// Built-in patterns, in output order.
pub const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("EMAIL", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b"),
    ("PHONE", r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b"),
    (
        "URL",
        r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\\(\\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+",
    ),
    ("IP_ADDRESS", r"\b(?:\d{1,3}\.){3}\d{1,3}\b"),
    ("CREDIT_CARD", r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b"),
    ("SSN", r"\b\d{3}-\d{2}-\d{4}\b"),
    ("HASHTAG", r"#\w+"),
    ("MENTION", r"@\w+"),
];

static BUILTIN: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::new(BUILTIN_PATTERNS.iter().copied()).expect("built-in patterns compile")
});

#[derive(Debug, Clone)]
struct NamedPattern {
    name: String,
    regex: Regex,
}

/// An ordered, compiled set of named patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<NamedPattern>,
}

impl PatternSet {
    /// Compile a set from `(name, expression)` pairs.
    ///
    /// Fails on the first expression that does not compile.
    pub fn new<N, E>(patterns: impl IntoIterator<Item = (N, E)>) -> Result<Self>
    where
        N: Into<String>,
        E: AsRef<str>,
    {
        let mut set = Self::default();
        for (name, expr) in patterns {
            set.insert(name, expr.as_ref())?;
        }
        Ok(set)
    }

    /// The built-in EMAIL, PHONE, URL, IP_ADDRESS, CREDIT_CARD, SSN,
    /// HASHTAG and MENTION patterns.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Add a pattern, replacing an existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, expr: &str) -> Result<()> {
        let name = name.into();
        let regex = Regex::new(expr).map_err(|source| NerError::InvalidPattern {
            name: name.clone(),
            source,
        })?;

        if let Some(existing) = self.patterns.iter_mut().find(|p| p.name == name) {
            existing.regex = regex;
        } else {
            self.patterns.push(NamedPattern { name, regex });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Run every pattern over `text`.
    ///
    /// Each name is present in the result, with an empty list when the
    /// pattern found nothing. Duplicates are kept.
    pub fn extract(&self, text: &str) -> PatternMatches {
        let entries = self
            .patterns
            .iter()
            .map(|p| {
                let found = p
                    .regex
                    .find_iter(text)
                    .map(|m| m.as_str().to_string())
                    .collect();
                (p.name.clone(), found)
            })
            .collect();

        PatternMatches { entries }
    }
}

/// Matches per pattern name, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternMatches {
    entries: Vec<(String, Vec<String>)>,
}

impl PatternMatches {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, m)| (n.as_str(), m.as_slice()))
    }

    /// Total number of matches across all patterns.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, m)| m.len()).sum()
    }

    /// Only the patterns that matched something.
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter().filter(|(_, m)| !m.is_empty())
    }
}

impl Serialize for PatternMatches {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, found) in &self.entries {
            map.serialize_entry(name, found)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(matches: &PatternMatches, name: &str) -> Vec<String> {
        matches.get(name).unwrap().to_vec()
    }

    #[test]
    fn builtin_set_has_all_patterns_in_order() {
        let set = PatternSet::builtin();
        let names: Vec<_> = set.names().collect();
        assert_eq!(
            names,
            vec!["EMAIL", "PHONE", "URL", "IP_ADDRESS", "CREDIT_CARD", "SSN", "HASHTAG", "MENTION"]
        );
    }

    #[test]
    fn each_pattern_finds_its_token() {
        let text = "mail ann@example.org, ring 555-123-4567, see https://example.com/a, \
                    host 10.0.0.1, card 4111 1111 1111 1111, ssn 123-45-6789, #rustlang and @ferris";
        let found = PatternSet::builtin().extract(text);

        assert_eq!(only(&found, "EMAIL"), vec!["ann@example.org"]);
        assert_eq!(only(&found, "PHONE"), vec!["555-123-4567"]);
        assert_eq!(only(&found, "URL"), vec!["https://example.com/a,"]);
        assert_eq!(only(&found, "IP_ADDRESS"), vec!["10.0.0.1"]);
        assert_eq!(only(&found, "CREDIT_CARD"), vec!["4111 1111 1111 1111"]);
        assert_eq!(only(&found, "SSN"), vec!["123-45-6789"]);
        assert_eq!(only(&found, "HASHTAG"), vec!["#rustlang"]);
        assert_eq!(only(&found, "MENTION"), vec!["@example", "@ferris"]);
    }

    #[test]
    fn ip_address_is_not_range_checked() {
        let found = PatternSet::builtin().extract("999.999.999.999");
        assert_eq!(only(&found, "IP_ADDRESS"), vec!["999.999.999.999"]);
    }

    #[test]
    fn parenthesised_phone_is_not_a_phone() {
        let found = PatternSet::builtin().extract("call (555) 123-4567.");
        assert!(found.get("PHONE").unwrap().is_empty());
    }

    #[test]
    fn phone_accepts_dots_and_bare_digits() {
        let found = PatternSet::builtin().extract("5551234567 or 555.123.4567");
        assert_eq!(only(&found, "PHONE"), vec!["5551234567", "555.123.4567"]);
    }

    #[test]
    fn card_groups_may_be_unseparated() {
        let found = PatternSet::builtin().extract("4111-1111-1111-1111 and 4111111111111111");
        assert_eq!(
            only(&found, "CREDIT_CARD"),
            vec!["4111-1111-1111-1111", "4111111111111111"]
        );
    }

    #[test]
    fn duplicates_are_kept_in_scan_order() {
        let found = PatternSet::builtin().extract("#a #b #a");
        assert_eq!(only(&found, "HASHTAG"), vec!["#a", "#b", "#a"]);
        assert_eq!(found.total(), 3);
    }

    #[test]
    fn empty_patterns_keep_their_key() {
        let found = PatternSet::builtin().extract("nothing structured here");
        assert_eq!(found.iter().count(), 8);
        assert_eq!(found.non_empty().count(), 0);
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let err = PatternSet::new([("BROKEN", "[unclosed")]).unwrap_err();
        assert!(matches!(err, NerError::InvalidPattern { ref name, .. } if name == "BROKEN"));
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut set = PatternSet::builtin();
        set.insert("HASHTAG", r"#[a-z]+").unwrap();
        set.insert("ZIP", r"\b\d{5}\b").unwrap();
        assert_eq!(set.len(), 9);

        let found = set.extract("#ABC #abc 90210");
        assert_eq!(only(&found, "HASHTAG"), vec!["#abc"]);
        assert_eq!(only(&found, "ZIP"), vec!["90210"]);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let set = PatternSet::new([("B", "b"), ("A", "a")]).unwrap();
        let json = serde_json::to_string(&set.extract("ab")).unwrap();
        assert_eq!(json, r#"{"B":["b"],"A":["a"]}"#);
    }
}
