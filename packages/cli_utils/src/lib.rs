#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the `pdf_max` binary.
//!
//! [`IndicatifProgress`] draws [`ScanProgress`] events as an `indicatif`
//! bar, and [`init_logger`] routes `log` output through
//! `indicatif-log-bridge` so log lines are not torn by bar redraws.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pdf_max_rank::progress::ScanProgress;

pub use indicatif::MultiProgress;

/// A page-scanning bar. Spins during extraction, then counts pages.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style used once the page count is known.
    pages_style: ProgressStyle,
}

impl IndicatifProgress {
    #[must_use]
    pub fn pages_bar(multi: &MultiProgress) -> Arc<dyn ScanProgress> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        let pages_style = ProgressStyle::with_template(
            "{msg} {wide_bar:.green/dim} page {pos}/{len} [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, pages_style })
    }
}

impl ScanProgress for IndicatifProgress {
    fn extracting(&self) {
        self.bar.enable_steady_tick(Duration::from_millis(100));
        self.bar.set_message("Extracting text");
    }

    fn scanning(&self, pages: usize) {
        self.bar.disable_steady_tick();
        self.bar.set_style(self.pages_style.clone());
        self.bar.set_length(pages as u64);
        self.bar.set_position(0);
        self.bar.set_message("Scanning");
    }

    fn page_scanned(&self, _number: usize) {
        self.bar.inc(1);
    }

    fn finished(&self, results: usize) {
        let msg = if results == 0 {
            "No numbers found".to_string()
        } else {
            format!("Ranked {results} result(s)")
        };
        self.bar.finish_with_message(msg);
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// The filter comes from `RUST_LOG`; without it only errors are shown.
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Fails only if a logger is already installed (e.g. in tests).
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
