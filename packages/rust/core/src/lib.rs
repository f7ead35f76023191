//! Run orchestration for eo-tracker.
//!
//! Ties the fetcher, the plain-text converter, and file storage together into
//! one incremental run driven by the stored watermark.

mod plan;
pub mod pipeline;

pub use pipeline::{ProgressReporter, RunSummary, SilentProgress, SkippedOrder, run};
