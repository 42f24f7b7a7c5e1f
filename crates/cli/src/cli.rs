//! Command line flags and the `sw2dts` command.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, Parser};
use sw2dts_core::{ConvertOptions, convert_str};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::{config, input};

/// How long to wait for the first chunk of standard input.
const STDIN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(
    name = "sw2dts",
    version,
    about = "Generate TypeScript declarations from Swagger/OpenAPI schemas",
    disable_version_flag = true
)]
pub struct Args {
    /// Swagger/OpenAPI document (JSON or YAML); standard input when omitted
    #[arg(value_name = "INPUT_FILENAME")]
    pub input: Option<PathBuf>,

    /// With GET query parameters
    #[arg(short = 'w', long)]
    pub with_query: bool,

    /// Sort type properties order
    #[arg(short = 's', long)]
    pub sort_props: bool,

    /// Output to file
    #[arg(short = 'o', long, value_name = "OUTPUT_FILENAME")]
    pub output: Option<PathBuf>,

    /// Use namespace
    #[arg(short = 'n', long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Read options (namespace, withQuery, sortProps) from a TOML file; flags win
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// [Deprecated] Input from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    _version: Option<bool>,
}

/// Run a command and map its result to a process exit code.
pub async fn run_cli_async<F, Fut>(f: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    match f().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// Convert one document as described by the parsed flags.
pub async fn run(args: Args) -> Result<(), String> {
    if args.stdin {
        warn!("'--stdin' option is deprecated.");
    }
    if args.input.is_some() && args.stdin {
        return Err("Invalid parameters!".to_string());
    }

    let file_options = match &args.config {
        Some(path) => config::load(path).await?,
        None => ConvertOptions::default(),
    };
    let options = config::merge(file_options, &args);
    debug!(?options, "Resolved options.");

    let text = match &args.input {
        Some(path) => input::read_file(path).await?,
        None => match input::read_stdin(STDIN_TIMEOUT).await? {
            Some(text) => text,
            None => {
                debug!("No input on stdin, printing help.");
                return Args::command()
                    .print_help()
                    .map_err(|e| format!("Failed to print help: {e}"));
            }
        },
    };

    let conversion = convert_str(&text, &options).map_err(|e| e.to_string())?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
            }
            tokio::fs::write(path, conversion.output.as_bytes())
                .await
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            debug!(path = %path.display(), "Wrote declarations.");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(conversion.output.as_bytes())
                .await
                .map_err(|e| format!("Failed to write output: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("Failed to write output: {e}"))?;
        }
    }
    Ok(())
}
