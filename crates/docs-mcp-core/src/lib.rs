//! # docs-mcp Core
//!
//! Pure text logic for docs-mcp: section and paragraph scanning, partition
//! selection for multiplexed corpora, topic filtering, and excerpt
//! truncation.
//!
//! This crate contains no tokio, HTTP, filesystem I/O, or logging. Every
//! function is a deterministic transformation of its inputs, so the
//! application crate can call it from any request handler without
//! coordination.
//!
//! # Example
//!
//! ```rust
//! use docs_mcp_core::filter::{select, FilterOptions};
//!
//! let corpus = "# Intro\nHello\n# Routing\nUse the router for paths.";
//! let excerpt = select(corpus, None, "routing", &FilterOptions::default());
//! assert_eq!(excerpt.body, "# Routing\nUse the router for paths.");
//! ```

pub mod filter;
pub mod models;
pub mod section;
