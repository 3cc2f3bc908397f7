//! `confluence-md` export command implementation.

use std::path::{Path, PathBuf};

use cfmd_config::{CliSettings, Config};
use cfmd_confluence::{ConfluenceClient, StorageConverter};
use cfmd_export::{ExportReport, ExportStatus, Exporter};
use clap::Args;

use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// ID of the root page to export.
    #[arg(long)]
    page_id: String,

    /// Directory the Markdown tree is written to.
    #[arg(long)]
    output_path: PathBuf,

    /// Confluence base URL (e.g. <https://example.atlassian.net/wiki>).
    #[arg(long, env = "CONFLUENCE_URL")]
    url: Option<String>,

    /// Username for basic auth; omit to send the token as a bearer token.
    #[arg(long, env = "CONFLUENCE_USER")]
    user: Option<String>,

    /// API token or personal access token.
    #[arg(long, env = "CONFLUENCE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Delay between API calls in milliseconds [default: 100].
    #[arg(long)]
    delay_ms: Option<u64>,

    /// HTTP request timeout in seconds [default: 30].
    #[arg(long)]
    timeout: Option<u64>,

    /// Keep existing files and only export pages that are missing.
    #[arg(long)]
    skip_existing: bool,

    /// Maximum depth below the root page [default: 50].
    #[arg(long)]
    max_depth: Option<usize>,

    /// Path to configuration file (default: auto-discover confluence-md.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List every failed page and enable debug logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ExportArgs {
    /// Execute the export.
    ///
    /// # Errors
    ///
    /// Returns an error if arguments or configuration are invalid, the root
    /// page cannot be fetched, or authentication fails.
    pub(crate) fn execute(self, output: &Output) -> Result<ExportStatus, CliError> {
        let page_id = validate_page_id(&self.page_id)?;

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let credentials = config.require_credentials()?;
        ensure_writable(&self.output_path)?;

        let client = ConfluenceClient::new(&credentials, config.export.timeout());
        print_banner(output, &client, &config, page_id, &self.output_path);

        let exporter = Exporter::new(&client, &StorageConverter, config.export);
        let report = exporter.export(page_id, &self.output_path)?;

        print_summary(output, &report, self.verbose);
        Ok(report.status())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            url: self.url.clone(),
            user: self.user.clone(),
            token: self.token.clone(),
            delay_ms: self.delay_ms,
            timeout: self.timeout,
            skip_existing: self.skip_existing.then_some(true),
            max_depth: self.max_depth,
        }
    }
}

/// Exit code for a finished export.
pub(crate) fn status_exit_code(status: ExportStatus) -> i32 {
    match status {
        ExportStatus::Complete => 0,
        ExportStatus::Partial | ExportStatus::Failed => 1,
    }
}

fn validate_page_id(page_id: &str) -> Result<&str, CliError> {
    let page_id = page_id.trim();
    if page_id.is_empty() || !page_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CliError::Validation(format!(
            "invalid page id {page_id:?}: expected an alphanumeric Confluence page id"
        )));
    }
    Ok(page_id)
}

/// Fail early if an existing output path is not a writable directory.
fn ensure_writable(path: &Path) -> Result<(), CliError> {
    if !path.exists() {
        return Ok(());
    }
    if !path.is_dir() {
        return Err(CliError::Validation(format!(
            "output path {} exists and is not a directory",
            path.display()
        )));
    }
    tempfile::Builder::new()
        .prefix(".confluence-md-")
        .tempfile_in(path)
        .map(drop)
        .map_err(|e| {
            CliError::Validation(format!(
                "output directory {} is not writable: {e}",
                path.display()
            ))
        })
}

fn print_banner(
    output: &Output,
    client: &ConfluenceClient,
    config: &Config,
    page_id: &str,
    output_path: &Path,
) {
    let settings = &config.export;
    output.line(Tone::Heading, "Confluence to Markdown export");
    if let Some(path) = &config.config_path {
        output.field("Config", &path.display().to_string());
    }
    output.field("Server", client.base_url());
    output.field("Auth", &client.auth_scheme().to_string());
    output.field("Root page", page_id);
    output.field("Output", &output_path.display().to_string());
    output.field("Timeout", &format!("{}s", settings.timeout));
    output.field("Delay", &format!("{}ms", settings.delay_ms));
    output.field("Max depth", &settings.max_depth.to_string());
    if settings.skip_existing {
        output.field("Resume", "skipping existing files");
    }
    output.rule();
}

fn print_summary(output: &Output, report: &ExportReport, verbose: bool) {
    output.rule();
    if verbose {
        for file in report.files() {
            output.line(Tone::Plain, &format!("  + {}", file.display()));
        }
    }
    let written = report.succeeded().len();
    let skipped = report.skipped().len();
    let failed = report.failed().len();

    match report.status() {
        ExportStatus::Complete => {
            output.line(Tone::Good, &format!("Export complete: {written} written"));
        }
        ExportStatus::Partial => {
            output.line(Tone::Warn, &format!("Export finished with errors: {written} written"));
        }
        ExportStatus::Failed => output.line(Tone::Bad, "Export failed: no page could be exported"),
    }
    if skipped > 0 {
        output.line(Tone::Plain, &format!("Skipped (already exported): {skipped}"));
    }
    if failed == 0 {
        return;
    }

    output.line(Tone::Warn, &format!("Failed: {failed}"));
    if verbose {
        for (page_id, failure) in report.failed() {
            output.line(Tone::Plain, &format!("  - {page_id}: {failure}"));
        }
    } else {
        output.line(Tone::Plain, "Run with --verbose to list failed pages.");
    }
}
