use std::path::Path;

use anyhow::Result;

use entmark::analysis::ExportFormat;
use entmark::{Config, NerError};

use super::input::read_text;
use super::output::print_json;
use super::start_service;
use crate::AnalyzeMode;

#[allow(clippy::too_many_arguments)]
pub async fn cmd_analyze(
    config: &Config,
    text: Option<String>,
    file: Option<&Path>,
    mode: AnalyzeMode,
    labels: &[String],
    entity: Option<&str>,
    window: usize,
    format: &str,
) -> Result<()> {
    let text = read_text(text, file)?;
    if text.is_empty() {
        return Err(NerError::ClientInput("No text provided".into()).into());
    }

    // Validate arguments before starting the model.
    let format: ExportFormat = format.parse()?;
    if matches!(mode, AnalyzeMode::Context) && entity.is_none() {
        return Err(NerError::ClientInput("--entity is required for context mode".into()).into());
    }

    let service = start_service(config).await?;

    match mode {
        AnalyzeMode::Summary => print_json(&service.analyze(&text).await?)?,
        AnalyzeMode::Anonymize => {
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            println!("{}", service.anonymize(&text, &labels).await?);
        }
        AnalyzeMode::Export => println!("{}", service.export(&text, format).await?),
        AnalyzeMode::Context => {
            let entity = entity.unwrap_or_default();
            print_json(&service.contexts(&text, entity, window).await?)?;
        }
        AnalyzeMode::Link => print_json(&service.link(&text).await?)?,
        AnalyzeMode::All => print_json(&service.extract_all(&text).await?)?,
    }

    Ok(())
}
