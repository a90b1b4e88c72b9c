//! # docs-mcp CLI
//!
//! ## Usage
//!
//! ```bash
//! docs-mcp --config ./config/docs.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docs-mcp serve stdio` | Serve MCP over stdin/stdout |
//! | `docs-mcp serve http` | Serve MCP Streamable HTTP and the JSON tool API |
//! | `docs-mcp lookup <corpus>` | Print a topic-filtered excerpt of a local corpus |
//! | `docs-mcp crate <name>` | Print a crate's converted docs.rs page |
//! | `docs-mcp corpora` | List configured corpora and file health |
//! | `docs-mcp tools` | List registered tools |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use docs_mcp::logging::{init_tracing, LogFormat};
use docs_mcp::{config, corpus, fetch, mcp, server, traits};

/// docs-mcp: documentation lookup for AI tools.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docs.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docs-mcp",
    about = "docs-mcp: topic-filtered documentation lookup for AI tools over MCP",
    version,
    long_about = "docs-mcp serves bounded documentation excerpts to MCP clients: \
    topic-filtered sections of local documentation corpora and converted docs.rs pages."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the file does not exist, built-in defaults with no corpora are used.
    #[arg(long, global = true, default_value = "./config/docs.toml")]
    config: PathBuf,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format for stderr output.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a protocol front-end.
    Serve {
        #[command(subcommand)]
        transport: Transport,
    },

    /// Look up a topic in a local corpus.
    ///
    /// Prints the matching sections, or matching paragraphs when no section
    /// matches, or the whole corpus when nothing matches.
    Lookup {
        /// Corpus name as configured under `[corpora.<name>]`.
        corpus: String,

        /// Topic to filter by. Defaults to `overview` (no filtering).
        #[arg(long)]
        topic: Option<String>,

        /// Partition of a multiplexed corpus (e.g. `svelte` or `kit`).
        #[arg(long)]
        partition: Option<String>,
    },

    /// Fetch a crate's documentation from docs.rs.
    Crate {
        /// Crate name (e.g. `serde`, `tower-http`).
        name: String,

        /// Crate version. Defaults to `latest`.
        #[arg(long)]
        version: Option<String>,
    },

    /// List configured corpora and whether their files exist.
    Corpora,

    /// List registered tools.
    Tools,
}

#[derive(Subcommand)]
enum Transport {
    /// MCP over stdin/stdout.
    Stdio,
    /// MCP Streamable HTTP at `/mcp`, plus `/tools/*` and `/health`.
    ///
    /// Binds to the address configured in `[server].bind`.
    Http,
}

fn load_config(path: &std::path::Path) -> anyhow::Result<config::Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::warn!(path = %path.display(), "config file not found; using defaults");
        Ok(config::Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format, std::io::stderr);

    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve { transport } => match transport {
            Transport::Stdio => mcp::run_stdio(&cfg).await?,
            Transport::Http => server::run_server(&cfg).await?,
        },
        Commands::Lookup {
            corpus: name,
            topic,
            partition,
        } => {
            corpus::run_lookup(&cfg, &name, topic, partition).await?;
        }
        Commands::Crate { name, version } => {
            let client = fetch::build_client(&cfg.fetch)?;
            let ctx = traits::ToolContext::new(Arc::new(cfg), client);
            let excerpt = ctx.crate_docs(&name, version.as_deref()).await?;
            println!("{}", excerpt);
        }
        Commands::Corpora => {
            corpus::list_corpora(&cfg).await?;
        }
        Commands::Tools => {
            traits::list_tools(&cfg)?;
        }
    }

    Ok(())
}
