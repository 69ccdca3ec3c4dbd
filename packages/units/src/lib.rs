#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Unit-multiplier detection.
//!
//! Documents often state their scale once ("All figures are in millions",
//! "Amounts in $K") and then list bare numbers. [`UnitDetector`] scans a
//! span of text against an ordered [`RuleSet`] and produces a
//! [`MultiplierDecision`] carrying the most likely multiplier and a
//! confidence in `[0, 1]`:
//!
//! - each rule scores `min(1.0, occurrences * 0.3)`, plus `0.2` for
//!   qualified phrasing, clamped to `1.0`;
//! - the highest-scoring rule wins and ties keep the earlier rule;
//! - a decision is only applied to numbers when its confidence exceeds
//!   [`APPLY_THRESHOLD`].
//!
//! The detector is deliberately conservative. Missing a multiplier leaves a
//! number unscaled; a false positive would misscale it by three orders of
//! magnitude.

pub mod rules;

use std::path::PathBuf;

use pdf_max_models::{MultiplierDecision, Scope};

pub use rules::{HeaderPhrase, RuleSet, UnitRule, UnitWord};

/// Confidence contributed by each occurrence of a rule's pattern.
pub const OCCURRENCE_WEIGHT: f64 = 0.3;

/// Extra confidence for rules phrased with strong qualifiers.
pub const QUALIFIER_BONUS: f64 = 0.2;

/// A decision is applied only when its confidence is strictly above this.
pub const APPLY_THRESHOLD: f64 = 0.3;

/// Errors that can occur while loading a rule table.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rule file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The rule file path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The rule file is not valid TOML or does not match the rule schema.
    #[error("Invalid rule file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A rule's pattern failed to compile.
    #[error("Invalid pattern in rule '{name}': {source}")]
    Regex {
        /// Name of the offending rule.
        name: String,
        /// The compile error.
        source: regex::Error,
    },

    /// The rule table parsed but cannot be used.
    #[error("Invalid rule table: {0}")]
    Invalid(String),
}

/// Confidence for a rule that matched `occurrences` times.
#[must_use]
pub fn rule_confidence(occurrences: usize, qualified: bool) -> f64 {
    if occurrences == 0 {
        return 0.0;
    }

    let count = f64::from(u32::try_from(occurrences).unwrap_or(u32::MAX));
    let base = (count * OCCURRENCE_WEIGHT).min(1.0);
    let bonus = if qualified { QUALIFIER_BONUS } else { 0.0 };

    (base + bonus).min(1.0)
}

/// Picks between a document-wide decision and a page-local one.
///
/// The page decision wins only if it is strictly more confident. The
/// reported confidence is the larger of the two either way.
#[must_use]
pub fn resolve(global: &MultiplierDecision, page: &MultiplierDecision) -> MultiplierDecision {
    let winner = if page.confidence > global.confidence {
        page
    } else {
        global
    };

    MultiplierDecision {
        multiplier: winner.multiplier,
        confidence: global.confidence.max(page.confidence),
        scope: winner.scope,
    }
}

/// Scans text for unit hints using a fixed [`RuleSet`].
#[derive(Debug, Clone)]
pub struct UnitDetector {
    rules: RuleSet,
}

impl Default for UnitDetector {
    fn default() -> Self {
        Self::new(RuleSet::builtin())
    }
}

impl UnitDetector {
    #[must_use]
    pub const fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Scores every rule against `text` and returns the best candidate.
    ///
    /// Returns [`MultiplierDecision::none`] when no rule matches.
    #[must_use]
    pub fn detect(&self, text: &str, scope: Scope) -> MultiplierDecision {
        let mut best = MultiplierDecision::none(scope);
        let mut best_rule: Option<&str> = None;

        for rule in self.rules.rules() {
            let occurrences = rule.regex().find_iter(text).count();
            if occurrences == 0 {
                continue;
            }

            let confidence = rule_confidence(occurrences, rule.qualified());
            log::trace!(
                "Rule {} matched {occurrences} time(s), confidence {confidence:.2}",
                rule.name()
            );

            if confidence > best.confidence {
                best.multiplier = rule.multiplier();
                best.confidence = confidence;
                best_rule = Some(rule.name());
            }
        }

        if let Some(name) = best_rule {
            log::debug!(
                "{scope} unit hint: {} via {name} (confidence {:.2})",
                best.multiplier,
                best.confidence
            );
        }

        best
    }

    /// Looks for a document header such as "(Dollars in Millions)".
    ///
    /// Header phrases are plain substrings checked in table order; the
    /// first one present decides. A hit has confidence `1.0`.
    #[must_use]
    pub fn detect_header(&self, text: &str) -> MultiplierDecision {
        let lower = text.to_lowercase();

        self.rules
            .headers()
            .iter()
            .find(|h| lower.contains(h.phrase.as_str()))
            .map_or_else(
                || MultiplierDecision::none(Scope::Document),
                |h| {
                    log::debug!("Header phrase '{}' found", h.phrase);
                    MultiplierDecision {
                        multiplier: h.multiplier,
                        confidence: 1.0,
                        scope: Scope::Document,
                    }
                },
            )
    }

    /// Looks for a unit word ("3.2 billion") or parenthesised symbol
    /// ("($M)") inside a window of text. First hit in table order wins.
    #[must_use]
    pub fn detect_unit_word(&self, window: &str) -> MultiplierDecision {
        self.rules
            .unit_words()
            .iter()
            .find(|u| u.regex.is_match(window))
            .map_or_else(
                || MultiplierDecision::none(Scope::Window),
                |u| {
                    log::debug!("Unit word '{}' found near value", u.word);
                    MultiplierDecision {
                        multiplier: u.multiplier,
                        confidence: 1.0,
                        scope: Scope::Window,
                    }
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use pdf_max_models::Multiplier;

    use super::*;

    fn detector() -> UnitDetector {
        UnitDetector::default()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn no_hint_means_no_multiplier() {
        let d = detector().detect("Numbers: 10, 500, 42", Scope::Document);
        assert_eq!(d, MultiplierDecision::none(Scope::Document));
    }

    #[test]
    fn qualified_phrase_gets_bonus() {
        let d = detector().detect("All figures are in millions.\nBudget: 3.15, 450", Scope::Page);
        assert_eq!(d.multiplier, Multiplier::Million);
        assert!(approx(d.confidence, 0.5));
        assert_eq!(d.scope, Scope::Page);
    }

    #[test]
    fn single_symbol_is_below_threshold() {
        let d = detector().detect("Capital plan ($M): 12, 40", Scope::Document);
        assert_eq!(d.multiplier, Multiplier::Million);
        assert!(approx(d.confidence, 0.3));
        assert!(!d.exceeds(APPLY_THRESHOLD));
    }

    #[test]
    fn confidence_grows_with_occurrences_and_caps() {
        let d = detector().detect("$K 1 $K 2 $K 3", Scope::Document);
        assert_eq!(d.multiplier, Multiplier::Thousand);
        assert!(approx(d.confidence, 0.9));

        let d = detector().detect("$K 1 $K 2 $K 3 $K 4 $K 5", Scope::Document);
        assert!(approx(d.confidence, 1.0));
    }

    #[test]
    fn qualified_confidence_is_clamped() {
        assert!(approx(rule_confidence(10, true), 1.0));
        assert!(approx(rule_confidence(1, true), 0.5));
        assert!(approx(rule_confidence(2, false), 0.6));
        assert!(approx(rule_confidence(0, true), 0.0));
    }

    #[test]
    fn ties_keep_earlier_family() {
        let text = "Table A in millions of dollars. Table B in billions of dollars.";
        let d = detector().detect(text, Scope::Document);
        assert_eq!(d.multiplier, Multiplier::Million);
        assert!(approx(d.confidence, 0.3));
    }

    #[test]
    fn more_occurrences_beat_priority() {
        let d = detector().detect("$B 1 and $B 2 but $M 3", Scope::Document);
        assert_eq!(d.multiplier, Multiplier::Billion);
        assert!(approx(d.confidence, 0.6));
    }

    #[test]
    fn matching_ignores_case() {
        let d = detector().detect("ALL VALUES ARE IN THOUSANDS", Scope::Document);
        assert_eq!(d.multiplier, Multiplier::Thousand);
        assert!(approx(d.confidence, 0.5));
    }

    #[test]
    fn detection_is_idempotent() {
        let text = "These amounts are in billions. Also $M and in thousands of dollars here.";
        let detector = detector();
        assert_eq!(
            detector.detect(text, Scope::Document),
            detector.detect(text, Scope::Document)
        );
    }

    #[test]
    fn page_wins_only_when_strictly_more_confident() {
        let global = MultiplierDecision {
            multiplier: Multiplier::Thousand,
            confidence: 0.5,
            scope: Scope::Document,
        };
        let tied_page = MultiplierDecision {
            multiplier: Multiplier::Million,
            confidence: 0.5,
            scope: Scope::Page,
        };
        let resolved = resolve(&global, &tied_page);
        assert_eq!(resolved.multiplier, Multiplier::Thousand);
        assert_eq!(resolved.scope, Scope::Document);

        let stronger_page = MultiplierDecision {
            confidence: 0.9,
            ..tied_page
        };
        let resolved = resolve(&global, &stronger_page);
        assert_eq!(resolved.multiplier, Multiplier::Million);
        assert_eq!(resolved.scope, Scope::Page);
        assert!(approx(resolved.confidence, 0.9));
    }

    #[test]
    fn resolved_confidence_is_the_maximum() {
        let global = MultiplierDecision {
            multiplier: Multiplier::Million,
            confidence: 0.6,
            scope: Scope::Document,
        };
        let page = MultiplierDecision::none(Scope::Page);
        let resolved = resolve(&global, &page);
        assert_eq!(resolved.multiplier, Multiplier::Million);
        assert!(approx(resolved.confidence, 0.6));
    }

    #[test]
    fn detects_header_phrase() {
        let d = detector().detect_header("CITY BUDGET (Dollars in Millions)\nTotal 12.5");
        assert_eq!(d.multiplier, Multiplier::Million);
        assert!(approx(d.confidence, 1.0));
        assert_eq!(d.scope, Scope::Document);

        let d = detector().detect_header("Summary ( $K) of totals");
        assert_eq!(d.multiplier, Multiplier::Thousand);

        assert_eq!(
            detector().detect_header("nothing here"),
            MultiplierDecision::none(Scope::Document)
        );
    }

    #[test]
    fn detects_unit_words_and_symbols() {
        let detector = detector();
        assert_eq!(
            detector.detect_unit_word("revenue of 3.2 billion").multiplier,
            Multiplier::Billion
        );
        assert_eq!(
            detector.detect_unit_word("Thousands of dollars").multiplier,
            Multiplier::Thousand
        );
        assert_eq!(
            detector.detect_unit_word("Capital ($M) 12.50").multiplier,
            Multiplier::Million
        );
        assert_eq!(
            detector.detect_unit_word("a millionaire's fund").multiplier,
            Multiplier::One
        );
    }

    #[test]
    fn unit_words_follow_table_order() {
        let d = detector().detect_unit_word("one thousand or one trillion");
        assert_eq!(d.multiplier, Multiplier::Trillion);
        assert_eq!(d.scope, Scope::Window);
    }
}
