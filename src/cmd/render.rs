use std::path::Path;

use anyhow::{Context, Result};

use entmark::span::resolve_all;
use entmark::{Config, NerError, RawSpan};

use super::input::read_text;

pub fn cmd_render(
    config: &Config,
    text: Option<String>,
    file: Option<&Path>,
    spans_path: &Path,
) -> Result<()> {
    let text = read_text(text, file)?;
    if text.is_empty() {
        return Err(NerError::ClientInput("No text provided".into()).into());
    }

    let content = std::fs::read_to_string(spans_path)
        .with_context(|| format!("failed to read {}", spans_path.display()))?;
    let raw: Vec<RawSpan> = serde_json::from_str(&content)
        .with_context(|| format!("invalid spans JSON in {}", spans_path.display()))?;

    let spans = resolve_all(&text, raw)?;
    println!("{}", config.highlighter().render(&text, &spans));
    Ok(())
}
