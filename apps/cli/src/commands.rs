//! CLI definition, tracing setup, and the run command.

use clap::Parser;
use color_eyre::eyre::Result;
use eo_tracker_core::{ProgressReporter, RunSummary};
use eo_tracker_shared::{AppConfig, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// eo-tracker: incrementally fetch executive orders from the Federal Register.
///
/// Settings come from `eo-tracker.toml` (or `$EO_TRACKER_CONFIG`) and
/// `EO_TRACKER_*` environment variables.
#[derive(Parser)]
#[command(name = "eo-tracker", version, long_about = None)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "eo_tracker=info",
        1 => "eo_tracker=debug",
        _ => "eo_tracker=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Load configuration, run one incremental fetch, and print the summary.
pub(crate) async fn run(_cli: Cli) -> Result<()> {
    let config = load_config()?;

    info!(
        data_dir = %config.output.data_dir.display(),
        signer = %config.filters.signer,
        "eo-tracker starting"
    );

    let reporter = CliProgress::new();
    let summary = match eo_tracker_core::run(&config, &reporter).await {
        Ok(summary) => summary,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    print_summary(&config, &summary);
    Ok(())
}

fn print_summary(config: &AppConfig, summary: &RunSummary) {
    let watermark = if summary.watermark_advanced() {
        format!("{} -> {}", summary.previous_watermark, summary.watermark)
    } else {
        format!("{} (unchanged)", summary.watermark)
    };

    println!();
    println!("  Fetched:    {} ({} pages)", summary.fetched, summary.pages);
    println!("  Logged:     {}", summary.logged);
    println!("  Duplicates: {}", summary.duplicates);
    println!("  Converted:  {}", summary.converted);
    println!("  Skipped:    {}", summary.skipped.len());
    println!("  Watermark:  {watermark}");
    println!("  Log:        {}", config.output.metadata_log_path().display());
    println!("  Texts:      {}", config.output.text_dir_path().display());
    println!("  Time:       {:.1}s", summary.elapsed.as_secs_f64());

    if !summary.skipped.is_empty() {
        println!();
        println!("  Skipped orders:");
        for skipped in &summary.skipped {
            println!("    {}  {}", skipped.document_id, skipped.reason);
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn order_converted(&self, document_id: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Converting [{current}/{total}] {document_id}"));
    }

    fn order_skipped(&self, document_id: &str, _reason: &str) {
        self.spinner.set_message(format!("Skipped {document_id}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
