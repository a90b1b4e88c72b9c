//! Tracing setup.
//!
//! The subscriber is installed once, before any command runs, with an
//! explicit writer. `main` always passes stderr: stdout belongs to command
//! output, and under `serve stdio` it carries MCP frames only.

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Default filter directive for a `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "docs_mcp=info,docs_mcp_core=info",
        1 => "docs_mcp=debug,docs_mcp_core=debug",
        _ => "docs_mcp=trace,docs_mcp_core=trace,rmcp=debug",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the `-v` level.
pub fn init_tracing<W>(verbose: u8, format: LogFormat, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false);

    // try_init: a second call (e.g. from tests) leaves the first subscriber in place.
    let _ = match format {
        LogFormat::Text => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
