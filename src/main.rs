//! `entmark` CLI - Tag, highlight and analyze named entities

mod cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use entmark::config::TaggerBackend;
use entmark::{Config, ErrorBody, EscapePolicy, MarkerStyle, NerError};

use cmd::{cmd_analyze, cmd_batch, cmd_extract, cmd_health, cmd_patterns, cmd_render};

#[derive(Parser)]
#[command(name = "entmark")]
#[command(about = "Highlight named entities found by an external NLP model")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/entmark/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model server base URL (selects the http backend)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Model program (selects the command backend)
    #[arg(long = "command", global = true)]
    tagger_command: Option<String>,

    /// Argument passed to the model program (repeatable)
    #[arg(long = "arg", global = true, allow_hyphen_values = true)]
    tagger_args: Vec<String>,

    /// Model identifier reported by health
    #[arg(long, global = true)]
    model: Option<String>,

    /// Disable regex pattern extraction
    #[arg(long, global = true)]
    no_patterns: bool,

    /// HTML-escape text in highlighted output
    #[arg(long, global = true)]
    escape: bool,

    /// Use inline-styled markers instead of CSS classes
    #[arg(long, global = true)]
    inline: bool,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities from text and print the full JSON response
    Extract {
        /// Text to analyze (reads --file or stdin when omitted)
        text: Option<String>,

        /// Read text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Extract entities from many texts, one per line
    Batch {
        /// File with one text per line (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Run only the regex patterns (no model)
    Patterns {
        text: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Render highlighted HTML from text and a spans file (no model)
    Render {
        text: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,

        /// JSON array of {"start", "end", "label"} character spans
        #[arg(long)]
        spans: PathBuf,
    },

    /// Summaries, anonymization, export, contexts and links
    Analyze {
        text: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "summary")]
        mode: AnalyzeMode,

        /// Labels to anonymize (comma-separated, default PERSON,ORG,GPE,DATE)
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,

        /// Entity text for context mode
        #[arg(long)]
        entity: Option<String>,

        /// Characters on each side in context mode
        #[arg(long, default_value = "50")]
        window: usize,

        /// Export format (json, csv)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Check that the model is reachable
    Health,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AnalyzeMode {
    /// Counts, groups and most common entities
    Summary,
    /// Replace entities with [LABEL]
    Anonymize,
    /// Entities with descriptions as JSON or CSV
    Export,
    /// Text around each mention of --entity
    Context,
    /// Entities with Wikipedia links
    Link,
    /// Described entities plus pattern matches
    All,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "entmark=debug" } else { "entmark=warn" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Extract { text, file } => {
            cmd_extract(&config, text, file.as_deref()).await?;
        }
        Commands::Batch { file } => {
            cmd_batch(&config, file.as_deref()).await?;
        }
        Commands::Patterns { text, file } => {
            cmd_patterns(&config, text, file.as_deref())?;
        }
        Commands::Render { text, file, spans } => {
            cmd_render(&config, text, file.as_deref(), &spans)?;
        }
        Commands::Analyze {
            text,
            file,
            mode,
            labels,
            entity,
            window,
            format,
        } => {
            cmd_analyze(
                &config,
                text,
                file.as_deref(),
                mode,
                &labels,
                entity.as_deref(),
                window,
                &format,
            )
            .await?;
        }
        Commands::Health => {
            cmd_health(&config).await?;
        }
    }

    Ok(())
}

/// Config file values with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(endpoint) = &cli.endpoint {
        config.tagger.backend = TaggerBackend::Http;
        config.tagger.endpoint.clone_from(endpoint);
    }
    if let Some(program) = &cli.tagger_command {
        config.tagger.backend = TaggerBackend::Command;
        config.tagger.command.clone_from(program);
    }
    if !cli.tagger_args.is_empty() {
        config.tagger.args.clone_from(&cli.tagger_args);
    }
    if let Some(model) = &cli.model {
        config.tagger.model.clone_from(model);
    }
    if cli.no_patterns {
        config.patterns.enabled = false;
    }
    if cli.escape {
        config.render.escape = EscapePolicy::Escape;
    }
    if cli.inline {
        config.render.marker_style = MarkerStyle::Inline;
    }

    Ok(config)
}

/// Print request errors as `{"error": ...}` on stdout, anything else on
/// stderr.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<NerError>() {
        Some(ner) => {
            let body = ErrorBody::from(ner);
            match serde_json::to_string(&body) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("Error: {ner}"),
            }
            if ner.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
        None => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
