#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the pdf-max toolchain.
//!
//! Scanning produces [`NumberMatch`] values, the unit detector produces
//! [`MultiplierDecision`] values, and ranking combines the two into
//! [`RankedResult`] values that are sorted and reported.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A scale factor implied by document language such as "in millions".
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Multiplier {
    /// No scaling
    #[default]
    One,
    /// 1,000
    Thousand,
    /// 1,000,000
    Million,
    /// 1,000,000,000
    Billion,
    /// 1,000,000,000,000
    Trillion,
}

impl Multiplier {
    /// Returns the numeric factor this multiplier scales by.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::One => 1.0,
            Self::Thousand => 1e3,
            Self::Million => 1e6,
            Self::Billion => 1e9,
            Self::Trillion => 1e12,
        }
    }

    /// Returns every multiplier, smallest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::One,
            Self::Thousand,
            Self::Million,
            Self::Billion,
            Self::Trillion,
        ]
    }
}

/// Which span of text a [`MultiplierDecision`] was derived from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Scope {
    /// The whole document (all pages joined).
    Document,
    /// A single page.
    Page,
    /// A fixed window of characters around one match.
    Window,
}

/// The outcome of running unit detection over a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplierDecision {
    /// The candidate multiplier. [`Multiplier::One`] when nothing matched.
    pub multiplier: Multiplier,
    /// Heuristic certainty in `[0, 1]`.
    pub confidence: f64,
    /// Span the decision was derived from.
    pub scope: Scope,
}

impl MultiplierDecision {
    /// A decision that carries no scaling and zero confidence.
    #[must_use]
    pub const fn none(scope: Scope) -> Self {
        Self {
            multiplier: Multiplier::One,
            confidence: 0.0,
            scope,
        }
    }

    /// Whether this decision is confident enough to be applied.
    ///
    /// The comparison is strict: a confidence equal to `threshold` is not
    /// applied.
    #[must_use]
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.confidence > threshold
    }
}

/// The plain text of one PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    /// 1-based page number.
    pub number: usize,
    /// Extracted text in approximate reading order.
    pub text: String,
}

impl PageText {
    #[must_use]
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A numeric literal found in page text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberMatch {
    /// The literal as it appeared (e.g. `"1,234.56"`).
    pub raw: String,
    /// The parsed value with separators stripped.
    pub value: f64,
    /// 1-based page number the literal was found on.
    pub page: usize,
    /// Byte offset of the first character of the literal.
    pub start: usize,
    /// Byte offset one past the last character of the literal.
    pub end: usize,
    /// Trimmed text surrounding the literal.
    pub context: String,
}

/// A [`NumberMatch`] after its multiplier decision has been applied (or not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    /// The ranking key: `raw_value * multiplier` when applied, otherwise
    /// `raw_value`.
    pub value: f64,
    /// The value parsed from the literal before scaling.
    pub raw_value: f64,
    /// The literal as it appeared.
    pub raw_text: String,
    /// 1-based page number.
    pub page: usize,
    /// Trimmed text surrounding the literal.
    pub context: String,
    /// The multiplier that was applied. [`Multiplier::One`] when the
    /// decision did not pass the confidence gate.
    pub multiplier: Multiplier,
    /// The confidence of the resolved decision, reported even when the
    /// multiplier was not applied.
    pub confidence: f64,
    /// Scope of the resolved decision.
    pub scope: Scope,
    /// Whether a non-trivial multiplier was applied to `raw_value`.
    pub applied: bool,
}

impl RankedResult {
    /// Combines a match with its resolved decision.
    ///
    /// The multiplier is applied all-or-nothing: only when the decision's
    /// confidence exceeds `threshold`.
    #[must_use]
    pub fn from_match(found: &NumberMatch, decision: &MultiplierDecision, threshold: f64) -> Self {
        let applied = decision.exceeds(threshold) && decision.multiplier != Multiplier::One;
        let multiplier = if applied {
            decision.multiplier
        } else {
            Multiplier::One
        };

        Self {
            value: found.value * multiplier.factor(),
            raw_value: found.value,
            raw_text: found.raw.clone(),
            page: found.page,
            context: found.context.clone(),
            multiplier,
            confidence: decision.confidence,
            scope: decision.scope,
            applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    fn sample_match(value: f64) -> NumberMatch {
        NumberMatch {
            raw: value.to_string(),
            value,
            page: 1,
            start: 0,
            end: 3,
            context: "Budget: 450".to_string(),
        }
    }

    #[test]
    fn multiplier_factors_are_powers_of_a_thousand() {
        let factors: Vec<f64> = Multiplier::all().iter().map(|m| m.factor()).collect();
        assert_eq!(factors, vec![1.0, 1e3, 1e6, 1e9, 1e12]);
    }

    #[test]
    fn multiplier_parses_from_snake_case() {
        assert_eq!(Multiplier::from_str("million").unwrap(), Multiplier::Million);
        assert_eq!(Multiplier::Trillion.to_string(), "trillion");
        assert!(Multiplier::from_str("gazillion").is_err());
    }

    #[test]
    fn applies_multiplier_above_threshold() {
        let decision = MultiplierDecision {
            multiplier: Multiplier::Million,
            confidence: 0.5,
            scope: Scope::Document,
        };
        let ranked = RankedResult::from_match(&sample_match(450.0), &decision, 0.3);
        assert!(ranked.applied);
        assert_eq!(ranked.multiplier, Multiplier::Million);
        assert!((ranked.value - 450e6).abs() < 1e-3);
    }

    #[test]
    fn threshold_is_strict() {
        let decision = MultiplierDecision {
            multiplier: Multiplier::Thousand,
            confidence: 0.3,
            scope: Scope::Page,
        };
        let ranked = RankedResult::from_match(&sample_match(12.0), &decision, 0.3);
        assert!(!ranked.applied);
        assert_eq!(ranked.multiplier, Multiplier::One);
        assert!((ranked.value - 12.0).abs() < f64::EPSILON);
        assert!((ranked.confidence - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn none_decision_never_applies() {
        let ranked = RankedResult::from_match(
            &sample_match(7.0),
            &MultiplierDecision::none(Scope::Document),
            0.0,
        );
        assert!(!ranked.applied);
        assert!((ranked.value - 7.0).abs() < f64::EPSILON);
    }
}
