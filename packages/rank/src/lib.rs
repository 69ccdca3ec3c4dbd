#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ranking of scaled numbers found in PDF text.
//!
//! [`Ranker`] ties the pipeline together: it pulls page text from a
//! [`PageSource`], scans each page for numeric literals, scales them by the
//! detected unit multiplier, and keeps the largest. Two strategies exist:
//!
//! - [`Strategy::Ranked`] scans every page with
//!   [`ScanOptions::standard`](pdf_max_scanner::ScanOptions::standard),
//!   resolves a page-local multiplier against the document-wide one, and
//!   returns the top N by scaled value;
//! - [`Strategy::Budget`] scans with
//!   [`ScanOptions::budget`](pdf_max_scanner::ScanOptions::budget) and
//!   returns the single largest amount, scaled by a unit word near it or a
//!   document header (see [`budget`]).
//!
//! A document with no surviving numbers is [`Outcome::Empty`], not an
//! error. Callers decide what that means for them.

pub mod budget;
pub mod progress;
pub mod report;

use std::path::Path;
use std::sync::Arc;

use pdf_max_models::{MultiplierDecision, PageText, RankedResult, Scope};
use pdf_max_pdf::{PageSource, PdfError, join_pages};
use pdf_max_scanner::{ScanError, ScanOptions, Scanner};
use pdf_max_units::{APPLY_THRESHOLD, RuleError, RuleSet, UnitDetector, resolve};
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::progress::ScanProgress;

/// Number of results reported by [`Strategy::Ranked`] unless overridden.
pub const DEFAULT_TOP_N: usize = 5;

/// Errors that can occur while ranking a document.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// Reading or extracting the PDF failed.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// The scanner could not be built from the configured options.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The unit rule table could not be loaded.
    #[error(transparent)]
    Rules(#[from] RuleError),
}

/// How numbers are selected and scaled.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Top N numbers, confidence-gated document/page multipliers.
    #[default]
    Ranked,
    /// Single largest budget amount, unit word or header multiplier.
    Budget,
}

/// Ranking configuration.
#[derive(Debug, Clone)]
pub struct RankConfig {
    pub strategy: Strategy,
    /// Maximum results for [`Strategy::Ranked`]. [`Strategy::Budget`] always
    /// returns one.
    pub top_n: usize,
    /// Scanner options. `None` uses the strategy's preset.
    pub scan: Option<ScanOptions>,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Ranked,
            top_n: DEFAULT_TOP_N,
            scan: None,
        }
    }
}

impl RankConfig {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    #[must_use]
    pub fn with_scan_options(mut self, scan: ScanOptions) -> Self {
        self.scan = Some(scan);
        self
    }

    fn scan_options(&self) -> ScanOptions {
        self.scan.clone().unwrap_or_else(|| match self.strategy {
            Strategy::Ranked => ScanOptions::standard(),
            Strategy::Budget => ScanOptions::budget(),
        })
    }
}

/// The ranked results for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub strategy: Strategy,
    /// The document-wide decision, reported for transparency.
    pub global: MultiplierDecision,
    /// Results by scaled value, largest first.
    pub results: Vec<RankedResult>,
}

impl Ranking {
    /// The top result's scaled value.
    #[must_use]
    pub fn largest(&self) -> Option<f64> {
        self.results.first().map(|r| r.value)
    }
}

/// What a ranking run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No numeric literal survived scanning.
    Empty,
    /// At least one result.
    Found(Ranking),
}

impl Outcome {
    #[must_use]
    pub fn largest(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Found(ranking) => ranking.largest(),
        }
    }
}

/// Scans documents and ranks the numbers found in them.
#[derive(Debug, Clone)]
pub struct Ranker {
    detector: UnitDetector,
    config: RankConfig,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(UnitDetector::default(), RankConfig::default())
    }
}

impl Ranker {
    #[must_use]
    pub const fn new(detector: UnitDetector, config: RankConfig) -> Self {
        Self { detector, config }
    }

    /// Builds a ranker whose unit rules come from a TOML file, or from the
    /// built-in table when `rules_path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Rules`] if the rule file cannot be loaded.
    pub fn with_rules_file(rules_path: Option<&Path>, config: RankConfig) -> Result<Self, RankError> {
        let rules = match rules_path {
            Some(path) => {
                log::info!("Loading unit rules from {}", path.display());
                RuleSet::from_path(path)?
            }
            None => RuleSet::builtin(),
        };
        Ok(Self::new(UnitDetector::new(rules), config))
    }

    /// Extracts the pages of `source` and ranks them.
    ///
    /// # Errors
    ///
    /// Returns [`RankError`] if extraction fails or the scanner cannot be
    /// built.
    pub fn rank_source<S: PageSource + ?Sized>(
        &self,
        source: &S,
        progress: &Arc<dyn ScanProgress>,
    ) -> Result<Outcome, RankError> {
        progress.extracting();
        let pages = source.pages()?;
        self.rank_pages(&pages, progress)
    }

    /// Ranks already-extracted pages.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Scan`] if the scanner cannot be built.
    pub fn rank_pages(
        &self,
        pages: &[PageText],
        progress: &Arc<dyn ScanProgress>,
    ) -> Result<Outcome, RankError> {
        let scanner = Scanner::new(self.config.scan_options())?;

        let outcome = match self.config.strategy {
            Strategy::Ranked => self.rank_top_n(&scanner, pages, progress),
            Strategy::Budget => budget::rank(&self.detector, &scanner, pages, progress),
        };

        match &outcome {
            Outcome::Empty => {
                log::info!("No numeric values found");
                progress.finished(0);
            }
            Outcome::Found(ranking) => {
                log::info!(
                    "Ranked {} result(s) using {} strategy",
                    ranking.results.len(),
                    ranking.strategy
                );
                progress.finished(ranking.results.len());
            }
        }

        Ok(outcome)
    }

    /// The largest scaled value in `pages`, or `None` if there are no
    /// numbers.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Scan`] if the scanner cannot be built.
    pub fn largest_value(&self, pages: &[PageText]) -> Result<Option<f64>, RankError> {
        Ok(self
            .rank_pages(pages, &progress::null_progress())?
            .largest())
    }

    fn rank_top_n(
        &self,
        scanner: &Scanner,
        pages: &[PageText],
        progress: &Arc<dyn ScanProgress>,
    ) -> Outcome {
        let full_text = join_pages(pages);
        let global = self.detector.detect(&full_text, Scope::Document);

        if global.confidence > 0.0 {
            log::info!(
                "Detected unit multiplier: {} (confidence: {})",
                report::format_factor(global.multiplier),
                report::format_percent(global.confidence)
            );
        }

        progress.scanning(pages.len());

        let mut results = Vec::new();

        for page in pages {
            let local = self.detector.detect(&page.text, Scope::Page);
            let decision = resolve(&global, &local);

            results.extend(
                scanner
                    .scan(&page.text, page.number)
                    .iter()
                    .map(|m| RankedResult::from_match(m, &decision, APPLY_THRESHOLD)),
            );

            progress.page_scanned(page.number);
        }

        if results.is_empty() {
            return Outcome::Empty;
        }

        sort_descending(&mut results);
        results.truncate(self.config.top_n);

        Outcome::Found(Ranking {
            strategy: Strategy::Ranked,
            global,
            results,
        })
    }
}

/// Sorts by scaled value, largest first. The sort is stable, so equal
/// values keep their scan order.
pub fn sort_descending(results: &mut [RankedResult]) {
    results.sort_by(|a, b| b.value.total_cmp(&a.value));
}
