//! Corpus loading and corpus-backed lookups.
//!
//! Corpora are plain-text files named in `[corpora.<name>]`. Each lookup
//! re-reads the file from disk and hands the text to
//! [`docs_mcp_core::filter::select`]; nothing is cached between requests, so
//! edits to a corpus file are visible on the next call.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use docs_mcp_core::filter::{select, FilterOptions};
use docs_mcp_core::models::{Excerpt, Partition, PartitionSelection, OVERVIEW_TOPIC};

use crate::config::{Config, CorpusConfig};
use crate::error::{LookupError, Result};

/// Raw lookup parameters as they arrive from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub partition: Option<String>,
}

/// A lookup with defaults applied and the partition resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub topic: String,
    pub partition: Option<Partition>,
}

impl LookupParams {
    /// Apply defaults and check the partition against the corpus config.
    ///
    /// A blank or missing topic becomes the overview topic. A missing
    /// partition selects the corpus's first partition. Corpora without a
    /// partition config ignore the partition key.
    pub fn validate(self, name: &str, corpus: &CorpusConfig) -> Result<LookupRequest> {
        let topic = self
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| OVERVIEW_TOPIC.to_string());

        let partition = match &corpus.partition {
            Some(cfg) => {
                let key = self
                    .partition
                    .as_deref()
                    .or(cfg.default_name())
                    .ok_or_else(|| {
                        LookupError::InvalidParams(format!(
                            "corpus '{}' has no partition names configured",
                            name
                        ))
                    })?;
                let resolved = cfg.resolve(key).ok_or_else(|| {
                    LookupError::InvalidParams(format!(
                        "partition '{}' is not valid for corpus '{}'; expected one of: {}",
                        key,
                        name,
                        cfg.names.join(", ")
                    ))
                })?;
                Some(resolved)
            }
            None => None,
        };

        Ok(LookupRequest { topic, partition })
    }
}

/// Health and location of one configured corpus.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStatus {
    pub name: String,
    pub tool: String,
    pub path: String,
    pub description: String,
    pub partitions: Option<Vec<String>>,
    pub healthy: bool,
}

fn corpus_config<'a>(config: &'a Config, name: &str) -> Result<&'a CorpusConfig> {
    config
        .corpora
        .get(name)
        .ok_or_else(|| LookupError::UnknownCorpus(name.to_string()))
}

/// Read the full text of a named corpus.
#[instrument(skip(config))]
pub async fn load(config: &Config, name: &str) -> Result<String> {
    let corpus = corpus_config(config, name)?;
    let text = tokio::fs::read_to_string(&corpus.path)
        .await
        .map_err(|source| LookupError::Read {
            name: name.to_string(),
            path: corpus.path.clone(),
            source,
        })?;
    debug!(bytes = text.len(), "corpus loaded");
    Ok(text)
}

/// Load a corpus and select the excerpt relevant to the request.
pub async fn lookup(config: &Config, name: &str, params: LookupParams) -> Result<Excerpt> {
    let corpus = corpus_config(config, name)?;
    let request = params.validate(name, corpus)?;
    let text = load(config, name).await?;

    let selection = match (&corpus.partition, request.partition) {
        (Some(cfg), Some(partition)) => Some(PartitionSelection::new(&cfg.sentinel, partition)),
        _ => None,
    };
    let options = FilterOptions::new(config.filter.max_chars, &corpus.location());
    let excerpt = select(&text, selection, &request.topic, &options);

    debug!(
        corpus = name,
        topic = %request.topic,
        selection = ?excerpt.selection,
        truncated = excerpt.truncated,
        chars = excerpt.body.chars().count(),
        "lookup complete"
    );
    Ok(excerpt)
}

/// Status of every configured corpus, checking each file on disk.
pub async fn get_corpora(config: &Config) -> Vec<CorpusStatus> {
    let mut statuses = Vec::with_capacity(config.corpora.len());
    for (name, corpus) in &config.corpora {
        let healthy = tokio::fs::metadata(&corpus.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        statuses.push(CorpusStatus {
            name: name.clone(),
            tool: corpus.tool_name(name),
            path: corpus.path.display().to_string(),
            description: corpus.description_or(name),
            partitions: corpus.partition.as_ref().map(|p| p.names.clone()),
            healthy,
        });
    }
    statuses
}

/// CLI entry point: print the excerpt to stdout.
pub async fn run_lookup(
    config: &Config,
    name: &str,
    topic: Option<String>,
    partition: Option<String>,
) -> anyhow::Result<()> {
    let excerpt = lookup(config, name, LookupParams { topic, partition }).await?;
    println!("{}", excerpt);
    Ok(())
}

/// CLI entry point: print the corpus table.
pub async fn list_corpora(config: &Config) -> anyhow::Result<()> {
    let corpora = get_corpora(config).await;
    if corpora.is_empty() {
        println!("No corpora configured.");
        return Ok(());
    }

    println!("{:<16} {:<20} {:<8} PATH", "CORPUS", "TOOL", "HEALTHY");
    for c in &corpora {
        println!("{:<16} {:<20} {:<8} {}", c.name, c.tool, c.healthy, c.path);
    }
    Ok(())
}
