//! confluence-md CLI - Confluence page tree to Markdown exporter.
//!
//! Exports a root page and all of its descendants into a directory tree of
//! Markdown files with YAML frontmatter.
//!
//! Exit codes:
//! - `0`: every page was exported
//! - `1`: at least one page failed
//! - `2`: invalid usage, configuration, or root page not found
//! - `3`: authentication failure
//! - `4`: other fatal error

mod commands;
mod error;
mod output;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::ExportArgs;
use commands::export::status_exit_code;
use output::{Output, Tone};

/// Credentials file read from the working directory.
const ENV_FILE: &str = ".env";

/// Export a Confluence page tree to Markdown files.
#[derive(Parser)]
#[command(name = "confluence-md", version, about)]
struct Cli {
    #[command(flatten)]
    args: ExportArgs,
}

fn main() {
    // Must run before parsing so `.env` values back the flag env fallbacks.
    let env_file = load_env_file(Path::new(ENV_FILE));

    let cli = Cli::parse();
    let output = Output::new();

    if let Err(err) = env_file {
        output.line(Tone::Warn, &format!("Warning: ignoring {ENV_FILE}: {err}"));
    }

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.args.execute(&output) {
        Ok(status) => status_exit_code(status),
        Err(err) => {
            output.line(Tone::Bad, &format!("Error: {err}"));
            err.exit_code()
        }
    };
    std::process::exit(code);
}

/// Load `path` into the environment without overriding variables that are
/// already set. A missing file is not an error.
fn load_env_file(path: &Path) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Err(err) if err.not_found() => Ok(()),
        other => other,
    }
}
