//! Scan progress events.
//!
//! A ranking run moves through three phases: text extraction, a pass over
//! the pages, and a final result count. [`ScanProgress`] receives one call
//! per event; the terminal bar lives in `pdf_max_cli_utils`.

use std::sync::Arc;

/// Receives progress events from a [`Ranker`](crate::Ranker) run.
pub trait ScanProgress: Send + Sync {
    /// Text extraction has started.
    fn extracting(&self);

    /// `pages` pages are about to be scanned.
    fn scanning(&self, pages: usize);

    /// Page `number` (1-based) has been scanned.
    fn page_scanned(&self, number: usize);

    /// The run ended with `results` ranked results (`0` when empty).
    fn finished(&self, results: usize);
}

/// Ignores every event. Used for `--quiet` and in tests.
pub struct NullProgress;

impl ScanProgress for NullProgress {
    fn extracting(&self) {}
    fn scanning(&self, _pages: usize) {}
    fn page_scanned(&self, _number: usize) {}
    fn finished(&self, _results: usize) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ScanProgress> {
    Arc::new(NullProgress)
}
