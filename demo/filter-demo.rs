/**
 * @file filter-demo.rs
 * @brief Filter demonstration using the stream filter SDK
 *
 * Reads standard input, runs it through the named filters and writes the
 * result to standard output.
 *
 *     echo "Hello" | filter-demo string.rot13 string.toupper
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use stream_filter_sdk::{
    init_with_config, ChainConfig, FilterChain, FilterConfig, FilterRegistry, FilteredReader,
    InitConfig, StreamHandle, StreamMode,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "filter-demo")]
#[command(about = "Run standard input through a chain of stream filters", long_about = None)]
#[command(version)]
struct Args {
    /// Filters to apply, head first
    filters: Vec<String>,

    /// JSON parameters passed to every filter
    #[arg(long)]
    params: Option<String>,

    /// Bytes read from standard input per pass
    #[arg(long, default_value_t = 8192)]
    chunk_size: usize,

    /// Print the registered filter names and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    init_with_config(InitConfig {
        log_filter,
        with_target: false,
    })
    .map_err(|e| anyhow::anyhow!(e))?;

    let registry = FilterRegistry::with_builtins();
    if args.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let parameters = match &args.params {
        Some(raw) => serde_json::from_str::<serde_json::Value>(raw).context("--params is not valid JSON")?,
        None => serde_json::Value::Null,
    };

    let config = ChainConfig::new("filter-demo").with_chunk_size(args.chunk_size);
    let mut chain = FilterChain::new(config, StreamHandle::new(0, "stdin", StreamMode::Read))?;
    for name in &args.filters {
        let filter = FilterConfig::new(name).with_parameters(parameters.clone());
        chain
            .append_by_name(&registry, &filter)
            .with_context(|| format!("cannot attach filter {name}"))?;
    }
    info!(filters = ?chain.names(), "filter chain ready");

    let mut reader = FilteredReader::new(io::stdin().lock(), chain);
    let mut output = Vec::new();
    reader.read_to_end(&mut output)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}
