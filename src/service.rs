//! Entity extraction service.
//!
//! Composes a [`Tagger`] with the [`Highlighter`] and an optional
//! [`PatternSet`]. Every call builds its response from scratch; the
//! service holds no per-request state and can be shared across tasks.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use crate::analysis::{self, ExportFormat, LinkedEntity, Summary};
use crate::api::{
    self, BatchEntity, BatchItem, BatchResponse, EntityRecord, ExtractAllResponse,
    ExtractResponse, HealthResponse,
};
use crate::config::Config;
use crate::error::{NerError, Result};
use crate::highlight::Highlighter;
use crate::patterns::{PatternMatches, PatternSet};
use crate::span::{resolve_all, Span};
use crate::tagger::{self, Tagger};

/// Default number of characters echoed back per batch item.
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

pub struct EntityService {
    tagger: Box<dyn Tagger>,
    highlighter: Highlighter,
    patterns: Option<PatternSet>,
    preview_chars: usize,
}

impl EntityService {
    /// Service with class markers, no escaping and no pattern extraction.
    pub fn new(tagger: Box<dyn Tagger>) -> Self {
        Self {
            tagger,
            highlighter: Highlighter::default(),
            patterns: None,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Highlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: Option<PatternSet>) -> Self {
        self.patterns = patterns;
        self
    }

    #[must_use]
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Build the tagger, renderer and patterns selected by `config`.
    ///
    /// Patterns are compiled here, so a bad expression fails before any
    /// request is served.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tagger = tagger::from_config(&config.tagger)?;
        Ok(Self::new(tagger)
            .with_highlighter(config.highlighter())
            .with_patterns(config.pattern_set()?)
            .with_preview_chars(config.batch.preview_chars))
    }

    /// Check that the model is reachable. Call once at startup; failure
    /// is [`NerError::ModelUnavailable`].
    pub async fn start(&self) -> Result<()> {
        self.tagger.warm_up().await?;
        info!(
            model = %self.tagger.model(),
            patterns = self.patterns.as_ref().map_or(0, PatternSet::len),
            "Entity service ready"
        );
        Ok(())
    }

    pub fn model(&self) -> &str {
        self.tagger.model()
    }

    pub fn patterns(&self) -> Option<&PatternSet> {
        self.patterns.as_ref()
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse::healthy(self.tagger.model())
    }

    /// Tag `text` and resolve the spans against it.
    pub async fn tag(&self, text: &str) -> Result<Vec<Span>> {
        let raw = self.tagger.tag(text).await?;
        resolve_all(text, raw)
    }

    /// Full extraction for an API request body.
    ///
    /// Missing or empty text is a client error and never reaches the
    /// tagger.
    pub async fn extract(&self, text: Option<&str>) -> Result<ExtractResponse> {
        let text = require_text(text)?;
        self.extract_text(text).await
    }

    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub async fn extract_text(&self, text: &str) -> Result<ExtractResponse> {
        let spans = self.tag(text).await?;
        debug!(entities = spans.len(), "Text tagged");

        Ok(ExtractResponse {
            total_entities: spans.len(),
            entities: spans.iter().map(EntityRecord::from).collect(),
            entities_by_type: analysis::group_unique(&spans),
            people: analysis::people(&spans),
            organizations: analysis::organizations(&spans),
            locations: analysis::locations(&spans),
            dates: analysis::dates(&spans),
            highlighted_html: self.highlighter.render(text, &spans),
            custom_entities: self.patterns.as_ref().map(|p| p.extract(text)),
        })
    }

    /// Tag several texts, one result per input in order.
    ///
    /// A failure of the whole batch call falls back to tagging each text
    /// on its own (concurrently), so one bad input only fails its own item.
    #[instrument(skip(self, texts))]
    pub async fn batch(&self, texts: Option<&[String]>) -> Result<BatchResponse> {
        let texts = match texts {
            Some(t) if !t.is_empty() => t,
            _ => return Err(NerError::ClientInput("No texts provided".into())),
        };

        let batch = self.tagger.tag_batch(texts).await.and_then(|all| {
            if all.len() == texts.len() {
                Ok(all)
            } else {
                Err(NerError::Processing(format!(
                    "tagger returned {} results for {} texts",
                    all.len(),
                    texts.len()
                )))
            }
        });

        let tagged: Vec<Result<Vec<Span>>> = match batch {
            Ok(all) => texts
                .iter()
                .zip(all)
                .map(|(text, raw)| resolve_all(text, raw))
                .collect(),
            Err(e) => {
                warn!(
                    error = %e,
                    count = texts.len(),
                    "Batch tagging failed, tagging texts one by one"
                );
                futures::future::join_all(texts.iter().map(|text| self.tag(text))).await
            }
        };

        let results = texts
            .iter()
            .zip(tagged)
            .map(|(text, outcome)| {
                let preview = api::preview(text, self.preview_chars);
                match outcome {
                    Ok(spans) => BatchItem {
                        text: preview,
                        entities: spans
                            .into_iter()
                            .map(|s| BatchEntity {
                                text: s.text,
                                label: s.label,
                            })
                            .collect(),
                        error: None,
                    },
                    Err(e) => {
                        warn!(error = %e, "Batch item failed");
                        BatchItem {
                            text: preview,
                            entities: Vec::new(),
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        Ok(BatchResponse { results })
    }

    /// Regex matches only; the tagger is not called.
    ///
    /// Uses the configured set, or the built-ins when extraction is off.
    pub fn extract_patterns(&self, text: &str) -> PatternMatches {
        match &self.patterns {
            Some(set) => set.extract(text),
            None => PatternSet::builtin().extract(text),
        }
    }

    /// Model entities with descriptions plus pattern matches.
    pub async fn extract_all(&self, text: &str) -> Result<ExtractAllResponse> {
        let text = require_text(Some(text))?;
        let spans = self.tag(text).await?;
        Ok(ExtractAllResponse {
            standard_entities: analysis::describe(&spans),
            custom_entities: self.extract_patterns(text),
        })
    }

    pub async fn analyze(&self, text: &str) -> Result<Summary> {
        let spans = self.tag(require_text(Some(text))?).await?;
        Ok(analysis::summarize(&spans))
    }

    /// Replace entities with `[LABEL]`. An empty `labels` uses the
    /// default PERSON, ORG, GPE and DATE.
    pub async fn anonymize(&self, text: &str, labels: &[&str]) -> Result<String> {
        let spans = self.tag(require_text(Some(text))?).await?;
        Ok(analysis::anonymize(text, &spans, labels))
    }

    pub async fn link(&self, text: &str) -> Result<Vec<LinkedEntity>> {
        let spans = self.tag(require_text(Some(text))?).await?;
        Ok(analysis::link(&spans))
    }

    pub async fn export(&self, text: &str, format: ExportFormat) -> Result<String> {
        let spans = self.tag(require_text(Some(text))?).await?;
        analysis::export(&spans, format)
    }

    /// Surrounding text of every mention of `entity_text`.
    pub async fn contexts(
        &self,
        text: &str,
        entity_text: &str,
        window: usize,
    ) -> Result<Vec<String>> {
        let spans = self.tag(require_text(Some(text))?).await?;
        Ok(analysis::contexts(text, &spans, entity_text, window))
    }

    /// Unique entity texts per label, without rendering.
    pub async fn group(&self, text: &str) -> Result<BTreeMap<String, Vec<String>>> {
        let spans = self.tag(require_text(Some(text))?).await?;
        Ok(analysis::group_unique(&spans))
    }
}

fn require_text(text: Option<&str>) -> Result<&str> {
    match text {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(NerError::ClientInput("No text provided".into())),
    }
}
