//! `entmark` MCP Server - Named-entity extraction over stdio
//!
//! Exposes the extraction API as MCP tools. Uses the 2025-06-18
//! protocol. The tagger is configured from `~/.config/entmark/config.toml`
//! and must be reachable at startup.
//!
//! # Usage
//!
//! ```bash
//! entmark-mcp
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use rust_mcp_sdk::macros::{mcp_tool, JsonSchema};
use rust_mcp_sdk::mcp_server::{server_runtime, ServerHandler};
use rust_mcp_sdk::schema::{
    schema_utils::CallToolError, CallToolRequest, CallToolResult, Implementation, InitializeResult,
    ListToolsRequest, ListToolsResult, RpcError, ServerCapabilities, ServerCapabilitiesTools,
    TextContent, LATEST_PROTOCOL_VERSION,
};
use rust_mcp_sdk::{tool_box, McpServer, StdioTransport, TransportOptions};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use entmark::{Config, EntityService, ErrorBody, NerError};

// Global service (initialized once in main)
static SERVICE: OnceCell<EntityService> = OnceCell::const_new();

fn service() -> Result<&'static EntityService, CallToolError> {
    SERVICE
        .get()
        .ok_or_else(|| CallToolError::from_message("entity service not initialized".to_string()))
}

/// Serialize a response body, or the `{error}` body for a failed request.
fn json_result<T: Serialize>(result: Result<T, NerError>) -> Result<CallToolResult, CallToolError> {
    let text = match result {
        Ok(body) => serde_json::to_string_pretty(&body),
        Err(e) => serde_json::to_string_pretty(&ErrorBody::from(&e)),
    }
    .map_err(|e| CallToolError::from_message(e.to_string()))?;

    Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
}

// ============================================================================
// TOOLS
// ============================================================================

#[mcp_tool(
    name = "extract",
    description = "Extract named entities from text.

Returns JSON with:
- entities: every entity with label and character offsets
- entities_by_type, people, organizations, locations, dates: unique texts
- highlighted_html: the text with entities wrapped in markers
- custom_entities: regex matches (emails, phones, URLs, IPs, ...) when enabled",
    read_only_hint = true
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ExtractTool {
    /// Text to analyze
    #[serde(default)]
    text: Option<String>,
}

impl ExtractTool {
    pub async fn run(&self) -> Result<CallToolResult, CallToolError> {
        let service = service()?;
        json_result(service.extract(self.text.as_deref()).await)
    }
}

#[mcp_tool(
    name = "extract_batch",
    description = "Extract named entities from several texts.

Returns one result per text, in order: a 100-character preview and the
entities found. A text that fails carries an error; the others are unaffected.",
    read_only_hint = true
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ExtractBatchTool {
    /// Texts to analyze
    #[serde(default)]
    texts: Option<Vec<String>>,
}

impl ExtractBatchTool {
    pub async fn run(&self) -> Result<CallToolResult, CallToolError> {
        let service = service()?;
        json_result(service.batch(self.texts.as_deref()).await)
    }
}

#[mcp_tool(
    name = "extract_patterns",
    description = "Find emails, phone numbers, URLs, IP addresses, card- and SSN-shaped
digit runs, hashtags and mentions with regular expressions. Does not call the model.",
    read_only_hint = true
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ExtractPatternsTool {
    /// Text to scan
    text: String,
}

impl ExtractPatternsTool {
    pub fn run(&self) -> Result<CallToolResult, CallToolError> {
        let result = if self.text.is_empty() {
            Err(NerError::ClientInput("No text provided".into()))
        } else {
            Ok(service()?.extract_patterns(&self.text))
        };
        json_result(result)
    }
}

#[mcp_tool(
    name = "health",
    description = "Report service status and the model in use.",
    read_only_hint = true
)]
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct HealthTool {}

impl HealthTool {
    pub fn run(&self) -> Result<CallToolResult, CallToolError> {
        json_result(Ok(service()?.health()))
    }
}

// Generate the tools enum
tool_box!(
    EntmarkTools,
    [ExtractTool, ExtractBatchTool, ExtractPatternsTool, HealthTool]
);

// ============================================================================
// SERVER HANDLER
// ============================================================================

pub struct EntmarkHandler;

#[async_trait]
impl ServerHandler for EntmarkHandler {
    async fn handle_list_tools_request(
        &self,
        _request: ListToolsRequest,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<ListToolsResult, RpcError> {
        Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: EntmarkTools::tools(),
        })
    }

    async fn handle_call_tool_request(
        &self,
        request: CallToolRequest,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<CallToolResult, CallToolError> {
        let tool = EntmarkTools::try_from(request.params)
            .map_err(|e| CallToolError::from_message(e.to_string()))?;

        match tool {
            EntmarkTools::ExtractTool(t) => t.run().await,
            EntmarkTools::ExtractBatchTool(t) => t.run().await,
            EntmarkTools::ExtractPatternsTool(t) => t.run(),
            EntmarkTools::HealthTool(t) => t.run(),
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to stderr so stdout stays protocol-only
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    // An unreachable model is fatal here, not per request
    let config = Config::load(None)?;
    let service = EntityService::from_config(&config)?;
    service.start().await?;
    let model = service.model().to_string();
    SERVICE
        .set(service)
        .map_err(|_| "entity service already initialized")?;

    let server_details = InitializeResult {
        server_info: Implementation {
            name: "entmark".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            title: Some("entmark Entity Extraction".into()),
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(format!(
            "entmark tags people, organizations, places, dates and other named entities \
             with the {model} model and renders them as highlighted HTML."
        )),
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    };

    let transport = StdioTransport::new(TransportOptions::default())?;

    let handler = EntmarkHandler;

    let server = server_runtime::create_server(server_details, transport, handler);

    Ok(server.start().await?)
}
