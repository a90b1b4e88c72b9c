//! MCP JSON-RPC protocol bridge.
//!
//! Adapts the [`ToolRegistry`] to the MCP protocol via `rmcp`. The same
//! [`McpBridge`] serves both transports:
//!
//! * **stdio**: `docs-mcp serve stdio`, for clients that spawn the server
//!   as a subprocess. Stdout carries protocol frames only; logs go to stderr.
//! * **Streamable HTTP**: mounted at `/mcp` by [`crate::server`].
//!
//! Tool failures are returned as tool results with `isError: true` so a bad
//! lookup never tears down the session.
//!
//! # Client configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "docs": {
//!       "command": "docs-mcp",
//!       "args": ["--config", "/path/to/docs.toml", "serve", "stdio"]
//!     }
//!   }
//! }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::fetch::build_client;
use crate::traits::{validate_params, ToolContext, ToolRegistry};

/// Bridges the tool registry to the MCP JSON-RPC protocol.
///
/// Each MCP session receives a clone of this struct (everything is behind
/// `Arc` or cheaply clonable), so all sessions share the same tool set.
#[derive(Clone)]
pub struct McpBridge {
    ctx: ToolContext,
    tools: Arc<ToolRegistry>,
}

impl McpBridge {
    pub fn new(ctx: ToolContext, tools: Arc<ToolRegistry>) -> Self {
        Self { ctx, tools }
    }

    /// Bridge serving the tools built from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = build_client(&config.fetch)?;
        let ctx = ToolContext::new(Arc::new(config.clone()), client);
        Ok(Self::new(ctx, Arc::new(ToolRegistry::from_config(config))))
    }

    /// Convert a docs-mcp tool into an rmcp `Tool` descriptor.
    fn to_mcp_tool(tool: &dyn crate::traits::Tool) -> Tool {
        let input_schema: Arc<serde_json::Map<String, Value>> = match tool.parameters_schema() {
            Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(true)),
            execution: None,
            icons: None,
            meta: None,
        }
    }
}

/// Text sent back to MCP clients for a tool's JSON result.
pub fn render_result(result: Value) -> String {
    match result {
        Value::String(text) => text,
        other => serde_json::to_string_pretty(&other).unwrap_or_default(),
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "docs-mcp".to_string(),
                title: Some("Docs MCP".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Documentation lookup for AI tools. Each corpus tool takes a `topic` \
                 (default \"overview\") and returns the matching documentation sections. \
                 Use crate_docs to read a Rust crate's docs.rs page and list_corpora to \
                 see which local documentation sets are available."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .tools()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.tools.find(&request.name).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", request.name),
                None,
            )
        })?;

        let params = request
            .arguments
            .map(Value::Object)
            .unwrap_or(Value::Object(serde_json::Map::new()));

        let params = match validate_params(&tool.parameters_schema(), &params) {
            Ok(p) => p,
            Err(e) => {
                warn!(tool = %request.name, error = %e, "rejected tool parameters");
                return Ok(CallToolResult::error(vec![Content::text(e.to_string())]));
            }
        };

        match tool.execute(params, &self.ctx).await {
            Ok(result) => Ok(CallToolResult::success(vec![Content::text(render_result(
                result,
            ))])),
            Err(e) => {
                warn!(tool = %request.name, error = %e, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn run_stdio(config: &Config) -> anyhow::Result<()> {
    let bridge = McpBridge::from_config(config)?;
    info!(
        tools = bridge.tools.len(),
        corpora = config.corpora.len(),
        "MCP server ready on stdio"
    );

    let service = bridge.serve(rmcp::transport::stdio()).await?;
    let reason = service.waiting().await?;
    info!(?reason, "MCP session ended");
    Ok(())
}
