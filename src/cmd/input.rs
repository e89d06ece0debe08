use std::io::{IsTerminal, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Text from the argument, else the file, else piped stdin.
///
/// Returns an empty string when nothing was given; the service turns
/// that into a client error.
pub fn read_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    let mut buf = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => read_stdin()?,
    };

    let trimmed = buf.trim_end_matches(['\r', '\n']).len();
    buf.truncate(trimmed);
    Ok(buf)
}

/// Non-blank lines from the file or piped stdin.
pub fn read_lines(file: Option<&Path>) -> Result<Vec<String>> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => read_stdin()?,
    };

    Ok(content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}

fn read_stdin() -> Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    let mut buf = String::new();
    stdin
        .lock()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}
