//! Single-result budget strategy.
//!
//! Scans the whole document (pages joined by newlines) for decimal amounts
//! near budget wording and keeps the largest raw value. Its multiplier
//! comes from a unit word within [`UNIT_WINDOW_RADIUS`] characters of the
//! amount, or failing that from a document header such as "(Dollars in
//! Millions)". Exactly one of the two is applied, never both.

use std::sync::Arc;

use pdf_max_models::{Multiplier, MultiplierDecision, NumberMatch, PageText, RankedResult};
use pdf_max_pdf::join_pages;
use pdf_max_scanner::{Scanner, context_window};
use pdf_max_units::{APPLY_THRESHOLD, UnitDetector};

use crate::progress::ScanProgress;
use crate::{Outcome, Ranking, Strategy};

/// Radius, in characters, of the window searched for unit words.
pub const UNIT_WINDOW_RADIUS: usize = 1_000;

pub(crate) fn rank(
    detector: &UnitDetector,
    scanner: &Scanner,
    pages: &[PageText],
    progress: &Arc<dyn ScanProgress>,
) -> Outcome {
    progress.scanning(pages.len());

    let full_text = join_pages(pages);
    let starts = page_starts(pages);
    let header = detector.detect_header(&full_text);

    // One pass over the joined text covers every page.
    let matches = scanner.scan(&full_text, 0);
    for page in pages {
        progress.page_scanned(page.number);
    }

    let Some(largest) = largest_match(&matches) else {
        return Outcome::Empty;
    };

    let window = context_window(&full_text, largest.start, largest.end, UNIT_WINDOW_RADIUS)
        .replace('\n', " ");
    let local = detector.detect_unit_word(&window);
    let decision = choose(header, local);

    log::debug!(
        "Largest amount {} on page {}, {} multiplier from {} scope",
        largest.raw,
        page_at(&starts, largest.start),
        decision.multiplier,
        decision.scope
    );

    let located = NumberMatch {
        page: page_at(&starts, largest.start),
        context: window.trim().to_string(),
        ..largest.clone()
    };
    let result = RankedResult::from_match(&located, &decision, APPLY_THRESHOLD);

    Outcome::Found(Ranking {
        strategy: Strategy::Budget,
        global: header,
        results: vec![result],
    })
}

/// A unit word near the amount outranks the document header.
fn choose(header: MultiplierDecision, local: MultiplierDecision) -> MultiplierDecision {
    if local.multiplier == Multiplier::One {
        header
    } else {
        local
    }
}

/// The match with the largest raw value; the first one wins on ties.
fn largest_match(matches: &[NumberMatch]) -> Option<&NumberMatch> {
    matches.iter().fold(None, |best, m| match best {
        Some(b) if b.value >= m.value => Some(b),
        _ => Some(m),
    })
}

/// Byte offset at which each page starts within the joined text.
fn page_starts(pages: &[PageText]) -> Vec<(usize, usize)> {
    let mut offset = 0;
    pages
        .iter()
        .map(|p| {
            let start = offset;
            offset += p.text.len() + 1;
            (start, p.number)
        })
        .collect()
}

/// Page number containing byte `offset` of the joined text.
fn page_at(starts: &[(usize, usize)], offset: usize) -> usize {
    starts
        .iter()
        .take_while(|(start, _)| *start <= offset)
        .last()
        .map_or(1, |(_, number)| *number)
}
