//! Tagger that runs a model program per request.
//!
//! The program receives the request JSON on stdin and must print the
//! response JSON on stdout, e.g. a short spaCy script:
//!
//! ```python
//! import json, sys, spacy
//! nlp = spacy.load("en_core_web_lg")
//! req = json.load(sys.stdin)
//! ents = lambda doc: [{"start": e.start_char, "end": e.end_char, "label": e.label_} for e in doc.ents]
//! if "texts" in req:
//!     print(json.dumps({"results": [ents(d) for d in nlp.pipe(req["texts"])]}))
//! else:
//!     print(json.dumps({"entities": ents(nlp(req["text"]))}))
//! ```

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::{BatchTagRequest, BatchTagResponse, TagRequest, TagResponse, Tagger};
use crate::error::{NerError, Result};
use crate::span::RawSpan;

/// Runs an external model program as a [`Tagger`].
pub struct CommandTagger {
    program: String,
    args: Vec<String>,
    model: String,
    timeout: Duration,
}

impl CommandTagger {
    pub fn new(program: &str, args: Vec<String>, model: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args,
            model: model.to_string(),
            timeout,
        }
    }

    /// Resolve the program on `PATH` (or as a path).
    pub fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| {
            NerError::ModelUnavailable(format!("tagger program '{}' not found: {e}", self.program))
        })
    }

    async fn exchange<Req, Resp>(&self, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let input = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| NerError::Processing(format!("failed to spawn '{}': {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| NerError::Processing("tagger stdin unavailable".into()))?;

        // Feed stdin while collecting output so large inputs cannot block
        // on a full pipe.
        let write = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::time::timeout(self.timeout, async move {
            tokio::join!(write, child.wait_with_output())
        })
        .await
        .map_err(|_| NerError::Timeout(self.timeout.as_secs()))?;

        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NerError::Processing(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if let Err(e) = written {
            // A program may answer without draining stdin.
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                debug!("Tagger closed stdin early");
            } else {
                return Err(e.into());
            }
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            let stdout = String::from_utf8_lossy(&output.stdout);
            NerError::Processing(format!(
                "'{}' returned invalid JSON ({e}): {}",
                self.program,
                stdout.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[async_trait]
impl Tagger for CommandTagger {
    fn model(&self) -> &str {
        &self.model
    }

    async fn warm_up(&self) -> Result<()> {
        let path = self.resolve()?;
        debug!(program = %path.display(), model = %self.model, "Tagger program resolved");
        Ok(())
    }

    #[instrument(skip(self, text), fields(bytes = text.len()))]
    async fn tag(&self, text: &str) -> Result<Vec<RawSpan>> {
        let response: TagResponse = self.exchange(&TagRequest { text }).await?;
        Ok(response.entities)
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn tag_batch(&self, texts: &[String]) -> Result<Vec<Vec<RawSpan>>> {
        let response: BatchTagResponse = self.exchange(&BatchTagRequest { texts }).await?;

        if response.results.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = response.results.len(),
                "Tagger batch size mismatch"
            );
            return Err(NerError::Processing(format!(
                "'{}' returned {} results for {} texts",
                self.program,
                response.results.len(),
                texts.len()
            )));
        }

        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandTagger {
        CommandTagger::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
            "test-model",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn missing_program_is_model_unavailable() {
        let tagger = CommandTagger::new(
            "entmark-no-such-tagger",
            Vec::new(),
            "m",
            Duration::from_secs(1),
        );
        let err = tokio_test::block_on(tagger.warm_up()).unwrap_err();
        assert!(matches!(err, NerError::ModelUnavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reads_entities_from_stdout() {
        let tagger =
            sh(r#"cat >/dev/null; echo '{"entities":[{"start":0,"end":5,"label":"ORG"}]}'"#);
        let spans = tagger.tag("Apple rocks").await.unwrap();
        assert_eq!(spans, vec![RawSpan::new(0, 5, "ORG")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passes_request_on_stdin() {
        // Answers only when the request arrived on stdin.
        let tagger = sh(r#"grep -q '"text":"ping"' && echo '{"entities":[]}'"#);
        assert!(tagger.tag("ping").await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_processing_error() {
        let tagger = sh("cat >/dev/null; echo model exploded >&2; exit 3");
        let err = tagger.tag("x").await.unwrap_err();
        assert!(matches!(err, NerError::Processing(ref m) if m.contains("model exploded")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn invalid_json_is_processing_error() {
        let tagger = sh("cat >/dev/null; echo not json");
        let err = tagger.tag("x").await.unwrap_err();
        assert!(matches!(err, NerError::Processing(ref m) if m.contains("invalid JSON")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_program_times_out() {
        let tagger = CommandTagger::new(
            "sh",
            vec!["-c".into(), "sleep 5".into()],
            "m",
            Duration::from_millis(200),
        );
        let err = tagger.tag("x").await.unwrap_err();
        assert!(matches!(err, NerError::Timeout(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn batch_size_mismatch_is_rejected() {
        let tagger = sh(r#"cat >/dev/null; echo '{"results":[[]]}'"#);
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(tagger.tag_batch(&texts).await.is_err());
    }
}
