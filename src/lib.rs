//! `entmark` - Named-entity highlighting over an external model
//!
//! # Features
//!
//! - **Highlighting**: wraps tagged spans in HTML markers, text between them untouched
//! - **Patterns**: regex extraction of emails, phones, URLs, IPs, card/SSN-shaped digits, hashtags, mentions
//! - **Taggers**: the model stays external, reached over HTTP or as a subprocess
//! - **Analysis**: grouping, counts, anonymization, context windows, CSV/JSON export
//!
//! # Example
//!
//! ```rust,no_run
//! use entmark::{Config, EntityService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = EntityService::from_config(&Config::load(None)?)?;
//!     service.start().await?;
//!     let out = service.extract_text("Tim Cook visited Paris.").await?;
//!     println!("{}", out.highlighted_html);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod highlight;
pub mod labels;
pub mod patterns;
pub mod service;
pub mod span;
pub mod tagger;

pub use api::{
    BatchItem, BatchRequest, BatchResponse, ExtractAllResponse, ExtractRequest, ExtractResponse,
    HealthResponse,
};
pub use config::Config;
pub use error::{ErrorBody, NerError, Result};
pub use highlight::{render, EscapePolicy, Highlighter, MarkerStyle};
pub use patterns::{PatternMatches, PatternSet};
pub use service::EntityService;
pub use span::{RawSpan, Span};
pub use tagger::{CommandTagger, HttpTagger, Tagger};

/// Version of entmark
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
