//! TOML configuration parsing and validation.
//!
//! Every option the lookup tools accept is enumerated here with its default,
//! and [`load_config`] validates the whole file once at startup so request
//! handlers never re-check configuration.
//!
//! # Example
//!
//! ```toml
//! [filter]
//! max_chars = 8000
//!
//! [fetch]
//! base_url = "https://docs.rs"
//! timeout_secs = 30
//!
//! [server]
//! bind = "127.0.0.1:7332"
//!
//! [corpora.svelte]
//! path = "corpora/svelte.txt"
//! description = "Svelte and SvelteKit documentation"
//! docs_url = "https://svelte.dev/docs"
//!
//! [corpora.svelte.partition]
//! sentinel = "# Start of SvelteKit documentation"
//! names = ["svelte", "kit"]
//! ```
//!
//! Relative corpus paths are resolved against the directory that contains
//! the configuration file.

use anyhow::{bail, Context, Result};
use docs_mcp_core::models::{Partition, DEFAULT_MAX_CHARS};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::traits::{CRATE_DOCS_TOOL, LIST_CORPORA_TOOL};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub corpora: BTreeMap<String, CorpusConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://docs.rs".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("docs-mcp/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7332".to_string()
}

/// One locally held documentation file.
#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
    /// Where readers can find the full documentation; named in truncation notices.
    #[serde(default)]
    pub docs_url: Option<String>,
    /// MCP tool name; defaults to `<name>_docs`.
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub partition: Option<PartitionConfig>,
}

impl CorpusConfig {
    pub fn tool_name(&self, name: &str) -> String {
        self.tool
            .clone()
            .unwrap_or_else(|| format!("{}_docs", name))
    }

    pub fn description_or(&self, name: &str) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("{} documentation", name))
    }

    /// The location named in the truncation notice.
    pub fn location(&self) -> String {
        self.docs_url
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Splits a multiplexed corpus into two named halves at a sentinel string.
#[derive(Debug, Deserialize, Clone)]
pub struct PartitionConfig {
    pub sentinel: String,
    /// `[first, second]`.
    pub names: Vec<String>,
}

impl PartitionConfig {
    /// Name of the partition searched when the caller gives none.
    pub fn default_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Map a caller-supplied partition name to a [`Partition`].
    pub fn resolve(&self, key: &str) -> Option<Partition> {
        if self.names.first().is_some_and(|n| n == key) {
            Some(Partition::First)
        } else if self.names.get(1).is_some_and(|n| n == key) {
            Some(Partition::Second)
        } else {
            None
        }
    }
}

impl Config {
    /// A configuration with defaults and no corpora.
    ///
    /// Used when commands that do not need corpora run without a config file.
    pub fn minimal() -> Self {
        Self {
            filter: FilterConfig::default(),
            fetch: FetchConfig::default(),
            server: ServerConfig::default(),
            corpora: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.filter.max_chars == 0 {
            bail!("filter.max_chars must be > 0");
        }

        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be > 0");
        }

        match url::Url::parse(&self.fetch.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => bail!(
                "fetch.base_url must be an http(s) URL, got '{}'",
                self.fetch.base_url
            ),
        }

        let mut tool_names = HashSet::new();
        tool_names.insert(CRATE_DOCS_TOOL.to_string());
        tool_names.insert(LIST_CORPORA_TOOL.to_string());

        for (name, corpus) in &self.corpora {
            if corpus.path.as_os_str().is_empty() {
                bail!("corpora.{}.path must not be empty", name);
            }

            let tool = corpus.tool_name(name);
            if tool.trim().is_empty() {
                bail!("corpora.{}.tool must not be empty", name);
            }
            if !tool_names.insert(tool.clone()) {
                bail!(
                    "corpora.{}: tool name '{}' is already in use",
                    name,
                    tool
                );
            }

            if let Some(ref partition) = corpus.partition {
                if partition.sentinel.is_empty() {
                    bail!("corpora.{}.partition.sentinel must not be empty", name);
                }
                if partition.names.len() != 2 {
                    bail!(
                        "corpora.{}.partition.names must list exactly two names, got {}",
                        name,
                        partition.names.len()
                    );
                }
                if partition.names.iter().any(|n| n.trim().is_empty()) {
                    bail!("corpora.{}.partition.names must not be empty", name);
                }
                if let [first, second] = partition.names.as_slice() {
                    if first == second {
                        bail!(
                            "corpora.{}.partition.names must be distinct, got '{}' twice",
                            name,
                            first
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// Parse configuration text, resolving relative corpus paths against `base_dir`.
pub fn parse_config(content: &str, base_dir: &Path) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    for corpus in config.corpora.values_mut() {
        if corpus.path.is_relative() {
            corpus.path = base_dir.join(&corpus.path);
        }
    }

    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&content, base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r##"
[filter]
max_chars = 4000

[fetch]
base_url = "https://docs.example.org"
timeout_secs = 5

[server]
bind = "127.0.0.1:9000"

[corpora.svelte]
path = "corpora/svelte.txt"
docs_url = "https://svelte.dev/docs"

[corpora.svelte.partition]
sentinel = "# Start of SvelteKit documentation"
names = ["svelte", "kit"]

[corpora.tailwind]
path = "/abs/tailwind.txt"
tool = "tailwind_lookup"
"##;

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_config(FULL, Path::new("/etc/docs")).unwrap();
        assert_eq!(cfg.filter.max_chars, 4000);
        assert_eq!(cfg.fetch.timeout_secs, 5);
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");

        let svelte = &cfg.corpora["svelte"];
        assert_eq!(svelte.path, PathBuf::from("/etc/docs/corpora/svelte.txt"));
        assert_eq!(svelte.tool_name("svelte"), "svelte_docs");
        assert_eq!(svelte.location(), "https://svelte.dev/docs");

        let partition = svelte.partition.as_ref().unwrap();
        assert_eq!(partition.default_name(), Some("svelte"));
        assert_eq!(partition.resolve("kit"), Some(Partition::Second));
        assert_eq!(partition.resolve("svelte"), Some(Partition::First));
        assert_eq!(partition.resolve("react"), None);

        let tailwind = &cfg.corpora["tailwind"];
        assert_eq!(tailwind.path, PathBuf::from("/abs/tailwind.txt"));
        assert_eq!(tailwind.tool_name("tailwind"), "tailwind_lookup");
        assert_eq!(tailwind.location(), "/abs/tailwind.txt");
    }

    #[test]
    fn test_defaults_for_empty_file() {
        let cfg = parse_config("", Path::new(".")).unwrap();
        assert_eq!(cfg.filter.max_chars, DEFAULT_MAX_CHARS);
        assert_eq!(cfg.fetch.base_url, "https://docs.rs");
        assert_eq!(cfg.fetch.timeout_secs, 30);
        assert!(cfg.fetch.user_agent.starts_with("docs-mcp/"));
        assert!(cfg.corpora.is_empty());
    }

    #[test]
    fn test_rejects_zero_max_chars() {
        let err = parse_config("[filter]\nmax_chars = 0\n", Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("max_chars"));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = parse_config("[fetch]\nbase_url = \"ftp://x\"\n", Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_rejects_wrong_partition_count() {
        let toml = r##"
[corpora.a]
path = "a.txt"
[corpora.a.partition]
sentinel = "# Split"
names = ["one"]
"##;
        let err = parse_config(toml, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("exactly two"));
    }

    #[test]
    fn test_rejects_duplicate_partition_names() {
        let toml = r##"
[corpora.a]
path = "a.txt"
[corpora.a.partition]
sentinel = "# Split"
names = ["x", "x"]
"##;
        let err = parse_config(toml, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn test_rejects_reserved_tool_name() {
        let toml = "[corpora.a]\npath = \"a.txt\"\ntool = \"crate_docs\"\n";
        let err = parse_config(toml, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("already in use"));
    }

    #[test]
    fn test_rejects_duplicate_tool_names() {
        let toml = "[corpora.a]\npath = \"a.txt\"\ntool = \"same\"\n[corpora.b]\npath = \"b.txt\"\ntool = \"same\"\n";
        let err = parse_config(toml, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("already in use"));
    }

    #[test]
    fn test_minimal_is_valid() {
        Config::minimal().validate().unwrap();
    }

    #[test]
    fn test_unvalidated_partition_names_do_not_panic() {
        let empty = PartitionConfig {
            sentinel: "# Split".to_string(),
            names: Vec::new(),
        };
        assert_eq!(empty.default_name(), None);
        assert_eq!(empty.resolve("svelte"), None);

        let one = PartitionConfig {
            sentinel: "# Split".to_string(),
            names: vec!["svelte".to_string()],
        };
        assert_eq!(one.resolve("svelte"), Some(Partition::First));
        assert_eq!(one.resolve("kit"), None);
    }

    #[test]
    fn test_example_config_parses() {
        let example = include_str!("../config/docs.example.toml");
        let cfg = parse_config(example, Path::new("/srv/docs/config")).unwrap();
        assert_eq!(cfg.corpora.len(), 2);
        assert_eq!(
            cfg.corpora["svelte"].path,
            PathBuf::from("/srv/docs/config/../corpora/svelte-llms-full.txt")
        );
    }
}
