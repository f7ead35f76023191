//! One incremental run: watermark → query → log → convert → watermark.

use std::time::{Duration, Instant};

use tracing::{error, info, instrument, warn};

use eo_tracker_fetcher::Fetcher;
use eo_tracker_shared::{AppConfig, EoTrackerError, OrderRecord, Result, Watermark};
use eo_tracker_storage::{Storage, TextStore};

use crate::plan::plan_run;

/// An order whose text conversion was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOrder {
    /// Document number, or `"<unknown>"` when the record had none.
    pub document_id: String,
    /// Rendered error that caused the skip.
    pub reason: String,
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Watermark the query started from.
    pub previous_watermark: Watermark,
    /// Watermark stored at the end of the run.
    pub watermark: Watermark,
    /// Records returned by the query.
    pub fetched: usize,
    /// Result pages requested.
    pub pages: usize,
    /// Rows appended to the metadata log.
    pub logged: usize,
    /// Records already logged (or repeated in the batch).
    pub duplicates: usize,
    /// Text artifacts written.
    pub converted: usize,
    /// Orders whose conversion failed and was skipped.
    pub skipped: Vec<SkippedOrder>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn watermark_advanced(&self) -> bool {
        self.watermark > self.previous_watermark
    }
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after an order's text artifact is written.
    fn order_converted(&self, document_id: &str, current: usize, total: usize);
    /// Called when an order's conversion is skipped.
    fn order_skipped(&self, document_id: &str, reason: &str);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn order_converted(&self, _document_id: &str, _current: usize, _total: usize) {}
    fn order_skipped(&self, _document_id: &str, _reason: &str) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Run one incremental fetch.
///
/// 1. Load the watermark (or `start_date` on first run)
/// 2. Query every matching record published on or after it
/// 3. Append unseen records to the metadata log
/// 4. Fetch and flatten each new order's full text
/// 5. Store the advanced watermark
///
/// A query failure aborts before anything is written. Any failure while
/// converting one order, including writing its text file, is skipped and
/// listed in the summary.
#[instrument(skip_all, fields(data_dir = %config.output.data_dir.display()))]
pub async fn run(config: &AppConfig, progress: &dyn ProgressReporter) -> Result<RunSummary> {
    let start = Instant::now();

    // --- Phase 1: Storage ---
    progress.phase("Opening data directory");
    let storage = Storage::open(&config.output, Watermark(config.start_date))?;
    let previous = storage.watermark.load()?;
    let fetcher = Fetcher::new(&config.api)?;

    info!(watermark = %previous, "starting run");

    // --- Phase 2: Query ---
    progress.phase(&format!("Querying orders published since {previous}"));
    let outcome = fetcher.fetch_new_orders(previous, &config.filters).await?;

    // --- Phase 3: Metadata log ---
    progress.phase("Updating metadata log");
    let logged = storage.metadata_log.document_numbers()?;
    let plan = plan_run(&outcome.orders, &logged, |id| storage.texts.contains(id));
    let appended = storage.metadata_log.append(&plan.rows)?;

    // --- Phase 4: Full text ---
    progress.phase("Converting full text");
    let total = plan.conversions.len();
    let mut converted = 0;
    let mut skipped = Vec::new();

    for (i, order) in plan.conversions.iter().enumerate() {
        let label = order.document_id().unwrap_or("<unknown>").to_string();
        match convert_order(&fetcher, &storage.texts, order).await {
            Ok(()) => {
                converted += 1;
                progress.order_converted(&label, i + 1, total);
            }
            Err(e) => {
                if e.is_fatal() {
                    error!(document_id = %label, error = %e, "failed to store order text, skipping");
                } else {
                    warn!(document_id = %label, error = %e, "skipping order");
                }
                progress.order_skipped(&label, &e.to_string());
                skipped.push(SkippedOrder {
                    document_id: label,
                    reason: e.to_string(),
                });
            }
        }
    }

    // --- Phase 5: Watermark ---
    if outcome.watermark > previous {
        progress.phase("Saving watermark");
        storage.watermark.store(outcome.watermark)?;
    }

    let summary = RunSummary {
        previous_watermark: previous,
        watermark: outcome.watermark,
        fetched: outcome.orders.len(),
        pages: outcome.pages,
        logged: appended,
        duplicates: plan.duplicates,
        converted,
        skipped,
        elapsed: start.elapsed(),
    };

    progress.done(&summary);

    info!(
        fetched = summary.fetched,
        logged = summary.logged,
        duplicates = summary.duplicates,
        converted = summary.converted,
        skipped = summary.skipped.len(),
        watermark = %summary.watermark,
        elapsed_ms = summary.elapsed.as_millis(),
        "run complete"
    );

    Ok(summary)
}

/// Fetch, flatten, and store one order's full text.
async fn convert_order(fetcher: &Fetcher, texts: &TextStore, order: &OrderRecord) -> Result<()> {
    let id = order
        .document_id()
        .ok_or_else(|| EoTrackerError::validation("record has no document number"))?;
    let url = fetcher.document_url(order)?;
    texts.artifact_path(id)?;

    let xml = fetcher.fetch_document(id, &url).await?;
    let result = eo_tracker_plaintext::convert(&xml)?;
    if result.is_empty() {
        warn!(document_id = %id, "document has no text");
    }
    texts.write(id, &result.text)?;
    Ok(())
}
