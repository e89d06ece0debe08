use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing::info;

use entmark::{Config, NerError, PatternSet};

use super::input::{read_lines, read_text};
use super::output::print_json;
use super::start_service;

pub async fn cmd_extract(config: &Config, text: Option<String>, file: Option<&Path>) -> Result<()> {
    let text = read_text(text, file)?;
    if text.is_empty() {
        return Err(NerError::ClientInput("No text provided".into()).into());
    }
    let service = start_service(config).await?;

    let start = Instant::now();
    let response = service.extract(Some(text.as_str())).await?;
    info!(
        entities = response.total_entities,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Extraction complete"
    );

    print_json(&response)
}

pub async fn cmd_batch(config: &Config, file: Option<&Path>) -> Result<()> {
    let texts = read_lines(file)?;
    if texts.is_empty() {
        return Err(NerError::ClientInput("No texts provided".into()).into());
    }
    let service = start_service(config).await?;

    let response = service.batch(Some(texts.as_slice())).await?;
    let failed = response.results.iter().filter(|r| r.error.is_some()).count();
    info!(items = response.results.len(), failed, "Batch complete");

    print_json(&response)
}

pub fn cmd_patterns(config: &Config, text: Option<String>, file: Option<&Path>) -> Result<()> {
    let text = read_text(text, file)?;
    if text.is_empty() {
        return Err(NerError::ClientInput("No text provided".into()).into());
    }

    let patterns = config.pattern_set()?.unwrap_or_else(PatternSet::builtin);
    print_json(&patterns.extract(&text))
}
