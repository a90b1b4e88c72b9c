//! Tool trait, execution context, and the tool registry.
//!
//! Every lookup the server exposes is a [`Tool`]: one [`CorpusLookupTool`]
//! per configured corpus, the [`CrateDocsTool`] for remote crate docs, and
//! [`ListCorporaTool`]. Custom tools implemented in Rust can be registered
//! alongside them and are served by the same MCP and HTTP front-ends.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              ToolRegistry                │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐  │
//! │  │ corpus   │ │ crate    │ │ custom   │  │
//! │  │ lookups  │ │ docs     │ │ (Rust)   │  │
//! │  └──────────┘ └──────────┘ └──────────┘  │
//! └──────────────┬───────────────────────────┘
//!                ▼
//!      McpBridge (stdio / HTTP)  ·  /tools/{name}
//! ```
//!
//! # Usage
//!
//! ```rust
//! use docs_mcp::config::Config;
//! use docs_mcp::traits::ToolRegistry;
//!
//! let tools = ToolRegistry::from_config(&Config::minimal());
//! assert!(tools.find("crate_docs").is_some());
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use docs_mcp_core::models::{Excerpt, OVERVIEW_TOPIC};

use crate::config::Config;
use crate::corpus::{get_corpora, lookup, CorpusStatus, LookupParams};
use crate::error::LookupError;
use crate::fetch::fetch_crate_docs;

/// Name of the built-in remote crate documentation tool.
pub const CRATE_DOCS_TOOL: &str = "crate_docs";

/// Name of the built-in corpus listing tool.
pub const LIST_CORPORA_TOOL: &str = "list_corpora";

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// A documentation tool that MCP clients can discover and call.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use serde_json::{json, Value};
/// use docs_mcp::traits::{Tool, ToolContext};
///
/// pub struct CorpusCountTool;
///
/// #[async_trait]
/// impl Tool for CorpusCountTool {
///     fn name(&self) -> &str { "corpus_count" }
///     fn description(&self) -> &str { "Count configured corpora" }
///
///     fn parameters_schema(&self) -> Value {
///         json!({ "type": "object", "properties": {} })
///     }
///
///     async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
///         Ok(json!({ "count": ctx.corpora().await.len() }))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier with underscores, used as the MCP tool name and
    /// the `POST /tools/{name}` path.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Whether this tool ships with docs-mcp. Defaults to `false`.
    fn is_builtin(&self) -> bool {
        false
    }

    /// JSON Schema object with `type: "object"`, `properties`, and
    /// optionally `required`.
    fn parameters_schema(&self) -> Value;

    /// Run the tool with parameters already checked against
    /// [`parameters_schema`](Tool::parameters_schema).
    ///
    /// A returned `Value::String` is sent to MCP clients as plain text;
    /// anything else is sent as pretty-printed JSON.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Everything a tool needs to do a lookup.
///
/// Created once per front-end and cloned per request; holds no mutable
/// state, so concurrent calls need no coordination.
#[derive(Clone)]
pub struct ToolContext {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl ToolContext {
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Filter a local corpus by topic.
    pub async fn lookup(&self, corpus: &str, params: LookupParams) -> crate::error::Result<Excerpt> {
        lookup(&self.config, corpus, params).await
    }

    /// Fetch and convert a crate's documentation page.
    pub async fn crate_docs(
        &self,
        crate_name: &str,
        version: Option<&str>,
    ) -> crate::error::Result<Excerpt> {
        fetch_crate_docs(&self.client, &self.config, crate_name, version).await
    }

    pub async fn corpora(&self) -> Vec<CorpusStatus> {
        get_corpora(&self.config).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Tool Implementations
// ═══════════════════════════════════════════════════════════════════════

/// Topic lookup over one configured corpus.
pub struct CorpusLookupTool {
    corpus: String,
    tool: String,
    description: String,
    partitions: Option<Vec<String>>,
}

impl CorpusLookupTool {
    pub fn new(
        corpus: impl Into<String>,
        tool: impl Into<String>,
        description: impl Into<String>,
        partitions: Option<Vec<String>>,
    ) -> Self {
        Self {
            corpus: corpus.into(),
            tool: tool.into(),
            description: description.into(),
            partitions,
        }
    }
}

#[async_trait]
impl Tool for CorpusLookupTool {
    fn name(&self) -> &str {
        &self.tool
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        let mut properties = json!({
            "topic": {
                "type": "string",
                "description": "Topic to look up; \"overview\" returns the documentation unfiltered",
                "default": OVERVIEW_TOPIC
            }
        });
        let names = self.partitions.as_deref().unwrap_or_default();
        if let Some(first) = names.first() {
            properties["partition"] = json!({
                "type": "string",
                "description": "Which documentation set to search",
                "enum": names,
                "default": first
            });
        }
        json!({
            "type": "object",
            "properties": properties
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let params: LookupParams = serde_json::from_value(params)
            .map_err(|e| LookupError::InvalidParams(e.to_string()))?;
        let excerpt = ctx.lookup(&self.corpus, params).await?;
        Ok(Value::String(excerpt.into_text()))
    }
}

/// Remote crate documentation from docs.rs.
pub struct CrateDocsTool;

#[async_trait]
impl Tool for CrateDocsTool {
    fn name(&self) -> &str {
        CRATE_DOCS_TOOL
    }

    fn description(&self) -> &str {
        "Fetch the documentation page of a Rust crate from docs.rs as plain text"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "crate_name": { "type": "string", "description": "Crate name, e.g. \"serde\"" },
                "version": { "type": "string", "description": "Crate version", "default": "latest" }
            },
            "required": ["crate_name"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let crate_name = params["crate_name"].as_str().unwrap_or("");
        let version = params["version"].as_str();
        let excerpt = ctx.crate_docs(crate_name, version).await?;
        Ok(Value::String(excerpt.into_text()))
    }
}

/// Lists configured corpora and whether their files exist.
pub struct ListCorporaTool;

#[async_trait]
impl Tool for ListCorporaTool {
    fn name(&self) -> &str {
        LIST_CORPORA_TOOL
    }

    fn description(&self) -> &str {
        "List the local documentation corpora and their lookup tools"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
        Ok(json!({ "corpora": ctx.corpora().await }))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Parameter validation
// ═══════════════════════════════════════════════════════════════════════

/// Serializable tool info for the `/tools/list` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub builtin: bool,
    pub parameters: Value,
}

impl ToolInfo {
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            builtin: tool.is_builtin(),
            parameters: tool.parameters_schema(),
        }
    }
}

/// Check `params` against a tool's JSON Schema and fill in defaults.
///
/// Verifies required keys, primitive types, and `enum` membership. Missing
/// optional properties with a `default` are inserted.
pub fn validate_params(schema: &Value, params: &Value) -> crate::error::Result<Value> {
    let params_obj = match params {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(LookupError::InvalidParams(format!(
                "parameters must be an object, got {}",
                json_type_name(other)
            )))
        }
    };

    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();

    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    for field in &required {
        if !params_obj.contains_key(*field) {
            return Err(LookupError::InvalidParams(format!(
                "missing required parameter: {}",
                field
            )));
        }
    }

    let mut result = params_obj.clone();

    for (prop_name, prop_schema) in &properties {
        match params_obj.get(prop_name) {
            Some(value) => {
                if let Some(expected) = prop_schema.get("type").and_then(|t| t.as_str()) {
                    let type_ok = match expected {
                        "string" => value.is_string(),
                        "integer" => value.is_i64() || value.is_u64(),
                        "number" => value.is_number(),
                        "boolean" => value.is_boolean(),
                        "array" => value.is_array(),
                        "object" => value.is_object(),
                        _ => true,
                    };
                    if !type_ok {
                        return Err(LookupError::InvalidParams(format!(
                            "parameter '{}' must be of type '{}', got {}",
                            prop_name,
                            expected,
                            json_type_name(value)
                        )));
                    }
                }

                if let Some(allowed) = prop_schema.get("enum").and_then(|e| e.as_array()) {
                    if !allowed.contains(value) {
                        let allowed: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                        return Err(LookupError::InvalidParams(format!(
                            "parameter '{}' must be one of [{}], got {}",
                            prop_name,
                            allowed.join(", "),
                            value
                        )));
                    }
                }
            }
            None => {
                if let Some(default) = prop_schema.get("default") {
                    result.insert(prop_name.clone(), default.clone());
                }
            }
        }
    }

    Ok(Value::Object(result))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Registry of every tool a front-end serves.
///
/// # Example
///
/// ```rust
/// use docs_mcp::config::Config;
/// use docs_mcp::traits::ToolRegistry;
///
/// let mut tools = ToolRegistry::from_config(&Config::minimal());
/// // tools.register(Box::new(MyTool));
/// assert_eq!(tools.len(), 2);
/// ```
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// One lookup tool per configured corpus, then `crate_docs` and
    /// `list_corpora`.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for (name, corpus) in &config.corpora {
            registry.register(Box::new(CorpusLookupTool::new(
                name.clone(),
                corpus.tool_name(name),
                corpus.description_or(name),
                corpus.partition.as_ref().map(|p| p.names.clone()),
            )));
        }
        registry.register(Box::new(CrateDocsTool));
        registry.register(Box::new(ListCorporaTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// CLI entry point: print every registered tool.
pub fn list_tools(config: &Config) -> Result<()> {
    let registry = ToolRegistry::from_config(config);
    println!("{:<20} {:<8} DESCRIPTION", "TOOL", "BUILTIN");
    for t in registry.tools() {
        println!("{:<20} {:<8} {}", t.name(), t.is_builtin(), t.description());
    }
    Ok(())
}
