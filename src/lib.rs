//! # docs-mcp
//!
//! Documentation lookup for AI tools over MCP.
//!
//! docs-mcp answers "show me the docs for X" with a bounded, LLM-readable
//! excerpt. Two retrieval strategies are available:
//!
//! - **Local corpora**: large pre-concatenated documentation files (for
//!   example `llms-full.txt` style dumps) filtered by topic with
//!   [`docs_mcp_core::filter::select`].
//! - **Crate docs**: a crate's docs.rs page fetched and converted to text.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌──────────────┐
//! │  Caller  │──▶│  Front-end    │──▶│ Corpus file  │
//! │  (MCP)   │   │ stdio / HTTP  │   │  (re-read)   │
//! └──────────┘   └──────┬────────┘   └──────┬───────┘
//!                       │                   ▼
//!                       │          ┌────────────────┐
//!                       │◀─────────│ Relevance      │
//!                       │          │ filter (core)  │
//!                       ▼          └────────────────┘
//!                   Excerpt ≤ max_chars (+ notice)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docs-mcp corpora                                  # list configured corpora
//! docs-mcp lookup svelte --topic routing --partition kit
//! docs-mcp crate serde
//! docs-mcp serve stdio                              # MCP over stdin/stdout
//! docs-mcp serve http                               # /mcp, /tools/*, /health
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`corpus`] | Corpus loader, request validation, lookups |
//! | [`fetch`] | docs.rs fetch and HTML-to-text conversion |
//! | [`error`] | Lookup failure taxonomy |
//! | [`traits`] | `Tool` trait, `ToolContext`, built-in tools, registry |
//! | [`mcp`] | rmcp `ServerHandler` bridge and stdio transport |
//! | [`server`] | Axum HTTP server with MCP Streamable HTTP |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod corpus;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod mcp;
pub mod server;
pub mod traits;

pub use error::LookupError;
pub use traits::{CorpusLookupTool, CrateDocsTool, ListCorporaTool, Tool, ToolContext, ToolRegistry};
