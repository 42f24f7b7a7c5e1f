//! `sw2dts`: generate TypeScript declarations from a Swagger/OpenAPI document.
//!
//! Reads JSON or YAML from a file or standard input and writes `.d.ts` text
//! to standard output or a file. Log output goes to stderr and is filtered
//! with `RUST_LOG` (default `sw2dts=warn`).

mod cli;
mod config;
mod input;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "sw2dts=warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::Args::parse();
    let code = cli::run_cli_async(|| cli::run(args)).await;

    // Exit here: a timed-out stdin read may still hold a blocking thread.
    std::process::exit(code);
}
