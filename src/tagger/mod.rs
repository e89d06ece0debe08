//! External entity taggers.
//!
//! The statistical model lives outside this crate. A [`Tagger`] is the
//! boundary to it: text goes in, labeled character ranges come out.
//!
//! # Backends
//!
//! | Backend | Transport |
//! |---------|-----------|
//! | [`HttpTagger`] | JSON over HTTP to a model server |
//! | [`CommandTagger`] | JSON over stdin/stdout of a model program |
//!
//! # Wire format
//!
//! Both backends speak the same JSON:
//!
//! ```json
//! {"text": "Apple hired Tim Cook"}
//! {"entities": [{"start": 0, "end": 5, "label": "ORG"}, {"start": 12, "end": 20, "label": "PERSON"}]}
//!
//! {"texts": ["first", "second"]}
//! {"results": [[...], [...]]}
//! ```
//!
//! Offsets are character offsets into the submitted text.

pub mod command;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{TaggerBackend, TaggerConfig};
use crate::error::Result;
use crate::span::RawSpan;

pub use command::CommandTagger;
pub use http::HttpTagger;

/// Single-text request body.
#[derive(Debug, Serialize)]
pub struct TagRequest<'a> {
    pub text: &'a str,
}

/// Single-text response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    #[serde(default)]
    pub entities: Vec<RawSpan>,
}

/// Batch request body.
#[derive(Debug, Serialize)]
pub struct BatchTagRequest<'a> {
    pub texts: &'a [String],
}

/// Batch response body, one entry per submitted text.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchTagResponse {
    #[serde(default)]
    pub results: Vec<Vec<RawSpan>>,
}

/// Capability to label entities in text.
///
/// Labels are whatever the model emits; callers must not assume a closed
/// vocabulary.
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Identifier of the model behind this tagger (e.g. "`en_core_web_lg`").
    fn model(&self) -> &str;

    /// Check that the model can be reached. Called once at startup.
    async fn warm_up(&self) -> Result<()> {
        Ok(())
    }

    /// Label the entities in one text.
    async fn tag(&self, text: &str) -> Result<Vec<RawSpan>>;

    /// Label several texts, one result per text in input order.
    async fn tag_batch(&self, texts: &[String]) -> Result<Vec<Vec<RawSpan>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.tag(text).await?);
        }
        Ok(results)
    }
}

/// Build the tagger selected by the configuration.
pub fn from_config(config: &TaggerConfig) -> Result<Box<dyn Tagger>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let tagger: Box<dyn Tagger> = match config.backend {
        TaggerBackend::Http => Box::new(HttpTagger::new(&config.endpoint, &config.model, timeout)?),
        TaggerBackend::Command => Box::new(CommandTagger::new(
            &config.command,
            config.args.clone(),
            &config.model,
            timeout,
        )),
    };
    Ok(tagger)
}
