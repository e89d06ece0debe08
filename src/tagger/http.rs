//! Tagger backed by a model server reachable over HTTP.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  health`    liveness, used by [`Tagger::warm_up`]
//! - `POST tag`       [`TagRequest`] → [`TagResponse`]
//! - `POST tag_batch` [`BatchTagRequest`] → [`BatchTagResponse`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use super::{BatchTagRequest, BatchTagResponse, TagRequest, TagResponse, Tagger};
use crate::error::{NerError, Result};
use crate::span::RawSpan;

/// HTTP client for a remote model server.
pub struct HttpTagger {
    client: Client,
    endpoint: Url,
    model: String,
    timeout: Duration,
}

impl HttpTagger {
    /// Create a tagger for the model server at `endpoint`.
    ///
    /// No request is made until [`Tagger::warm_up`] or [`Tagger::tag`].
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self> {
        let mut endpoint = Url::parse(endpoint)
            .map_err(|e| NerError::Config(format!("invalid tagger endpoint '{endpoint}': {e}")))?;

        // Keep the last path segment when joining relative paths.
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .pool_max_idle_per_host(4)
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
            timeout,
        })
    }

    /// Base URL requests are made against.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.endpoint.join(path).map_err(|e| {
            NerError::Config(format!("cannot join '{path}' to {}: {e}", self.endpoint))
        })
    }

    fn request_error(&self, err: reqwest::Error) -> NerError {
        if err.is_timeout() {
            NerError::Timeout(self.timeout.as_secs())
        } else {
            NerError::Processing(format!("model server request failed: {err}"))
        }
    }
}

#[async_trait]
impl Tagger for HttpTagger {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self))]
    async fn warm_up(&self) -> Result<()> {
        let url = self.url("health")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| NerError::ModelUnavailable(format!("{}: {e}", self.endpoint)))?;

        info!(
            status = %response.status(),
            endpoint = %self.endpoint,
            model = %self.model,
            "Model server reachable"
        );
        Ok(())
    }

    #[instrument(skip(self, text), fields(bytes = text.len()))]
    async fn tag(&self, text: &str) -> Result<Vec<RawSpan>> {
        debug!("Posting text to model server");
        let response: TagResponse = self
            .client
            .post(self.url("tag")?)
            .json(&TagRequest { text })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.request_error(e))?
            .json::<TagResponse>()
            .await
            .map_err(|e| self.request_error(e))?;

        debug!(entities = response.entities.len(), "Model server responded");
        Ok(response.entities)
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn tag_batch(&self, texts: &[String]) -> Result<Vec<Vec<RawSpan>>> {
        let response: BatchTagResponse = self
            .client
            .post(self.url("tag_batch")?)
            .json(&BatchTagRequest { texts })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.request_error(e))?
            .json::<BatchTagResponse>()
            .await
            .map_err(|e| self.request_error(e))?;

        if response.results.len() != texts.len() {
            return Err(NerError::Processing(format!(
                "model server returned {} results for {} texts",
                response.results.len(),
                texts.len()
            )));
        }

        Ok(response.results)
    }
}
