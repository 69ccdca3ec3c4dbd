#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Numeric literal scanning over extracted PDF text.
//!
//! A [`Scanner`] finds literals shaped like `450`, `1,234.56` or
//! `-12,000.00` (1–3 leading digits, comma groups of exactly three digits,
//! an optional fractional part) and turns each into a
//! [`NumberMatch`](pdf_max_models::NumberMatch). Which literals survive is
//! controlled by [`ScanOptions`]: the [`ScanOptions::standard`] preset keeps
//! everything the pattern finds, while [`ScanOptions::budget`] drops
//! identifiers, implausibly large values, and numbers that appear far from
//! any money-related wording.

pub mod context;
pub mod literal;

use pdf_max_models::NumberMatch;
use regex::Regex;

pub use context::{CONTEXT_RADIUS, context_window};
pub use literal::parse_literal;

/// Radius, in characters, of the window checked for [`ScanOptions::context_keywords`].
pub const KEYWORD_RADIUS: usize = 100;

/// Keywords that mark a number as budget-related in context-gated mode.
pub const BUDGET_KEYWORDS: &[&str] = &[
    "budget", "dollars", "fund", "million", "thousand", "revenue", "expense", "total",
];

/// Errors that can occur while building a [`Scanner`].
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The literal pattern built from the options failed to compile.
    #[error("Invalid number pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Controls which numeric literals a [`Scanner`] reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Only accept literals with a fractional part (`12.50`, not `12`).
    pub require_decimal: bool,
    /// Accept a leading `-` as part of the literal.
    pub allow_negative: bool,
    /// Maximum number of `,ddd` groups. `None` means unbounded.
    pub max_comma_groups: Option<usize>,
    /// Reject literals whose integer part has more digits than this.
    pub max_integer_digits: Option<usize>,
    /// Drop literals touching a letter on either side (`A12`, `12b`).
    pub skip_code_like: bool,
    /// Drop literals that start right after a `,` or `.` that follows a
    /// digit. These are tails of a longer literal the pattern could not
    /// consume whole, such as the last groups of `1,000,000,000,000.00`
    /// when comma groups are capped.
    pub skip_fragments: bool,
    /// When non-empty, drop literals with none of these words (matched
    /// case-insensitively) within [`KEYWORD_RADIUS`] characters.
    pub context_keywords: Vec<String>,
    /// Radius, in characters, of the snippet stored on each match.
    pub context_radius: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScanOptions {
    /// Every literal the base pattern finds, with no filtering.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            require_decimal: false,
            allow_negative: false,
            max_comma_groups: None,
            max_integer_digits: None,
            skip_code_like: false,
            skip_fragments: false,
            context_keywords: Vec::new(),
            context_radius: CONTEXT_RADIUS,
        }
    }

    /// Decimal amounts near budget wording, excluding identifiers and
    /// values above thirteen integer digits.
    #[must_use]
    pub fn budget() -> Self {
        Self {
            require_decimal: true,
            allow_negative: true,
            max_comma_groups: Some(3),
            max_integer_digits: Some(13),
            skip_code_like: true,
            skip_fragments: true,
            context_keywords: BUDGET_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            context_radius: CONTEXT_RADIUS,
        }
    }

    /// Builds the regex source for these options.
    #[must_use]
    pub fn pattern(&self) -> String {
        let sign = if self.allow_negative { "-?" } else { "" };
        let groups = self
            .max_comma_groups
            .map_or_else(|| "*".to_string(), |n| format!("{{0,{n}}}"));
        let fraction = if self.require_decimal {
            r"\.[0-9]+"
        } else {
            r"(?:\.[0-9]+)?"
        };

        format!(r"{sign}\b[0-9]{{1,3}}(?:,[0-9]{{3}}){groups}{fraction}\b")
    }
}

/// Finds numeric literals in page text.
#[derive(Debug, Clone)]
pub struct Scanner {
    regex: Regex,
    options: ScanOptions,
    /// Lowercased copy of `options.context_keywords`.
    keywords: Vec<String>,
}

impl Scanner {
    /// Compiles a scanner for the given options.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Pattern`] if the generated pattern does not
    /// compile.
    pub fn new(options: ScanOptions) -> Result<Self, ScanError> {
        let regex = Regex::new(&options.pattern())?;
        let keywords = options
            .context_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        Ok(Self {
            regex,
            options,
            keywords,
        })
    }

    /// Scans `text` (the text of page `page`) and returns the surviving
    /// literals in left-to-right order.
    #[must_use]
    pub fn scan(&self, text: &str, page: usize) -> Vec<NumberMatch> {
        let mut found = Vec::new();
        let mut skipped = 0_usize;

        for m in self.regex.find_iter(text) {
            let raw = m.as_str();

            if self.options.skip_code_like && is_code_like(text, m.start(), m.end()) {
                skipped += 1;
                continue;
            }

            if self.options.skip_fragments && is_fragment(text, m.start()) {
                skipped += 1;
                continue;
            }

            if let Some(max) = self.options.max_integer_digits
                && literal::integer_digits(raw) > max
            {
                skipped += 1;
                continue;
            }

            if !self.keywords.is_empty() && !self.has_keyword_nearby(text, m.start(), m.end()) {
                skipped += 1;
                continue;
            }

            let Some(value) = parse_literal(raw) else {
                skipped += 1;
                continue;
            };

            let context = context_window(
                text,
                m.start(),
                m.start(),
                self.options.context_radius,
            );

            found.push(NumberMatch {
                raw: raw.to_string(),
                value,
                page,
                start: m.start(),
                end: m.end(),
                context: context.trim().to_string(),
            });
        }

        log::trace!(
            "Page {page}: {} literal(s) kept, {skipped} filtered",
            found.len()
        );

        found
    }

    fn has_keyword_nearby(&self, text: &str, start: usize, end: usize) -> bool {
        let window = context_window(text, start, end, KEYWORD_RADIUS).to_lowercase();
        self.keywords.iter().any(|k| window.contains(k.as_str()))
    }
}

/// Whether the literal at `start..end` touches a letter on either side,
/// which marks it as part of an identifier such as `FY2024A` or `A12.50`.
#[must_use]
pub fn is_code_like(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    before.is_some_and(char::is_alphabetic) || after.is_some_and(char::is_alphabetic)
}

/// Whether the literal starting at `start` directly follows a digit
/// separator that itself follows a digit (`1,2|34` or `1.2|34`).
#[must_use]
pub fn is_fragment(text: &str, start: usize) -> bool {
    let mut before = text[..start].chars().rev();
    matches!(before.next(), Some(',' | '.')) && before.next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(scanner: &Scanner, text: &str) -> Vec<f64> {
        scanner.scan(text, 1).into_iter().map(|m| m.value).collect()
    }

    fn standard() -> Scanner {
        Scanner::new(ScanOptions::standard()).unwrap()
    }

    fn budget() -> Scanner {
        Scanner::new(ScanOptions::budget()).unwrap()
    }

    #[test]
    fn no_digits_means_no_matches() {
        assert!(standard().scan("No numeric content here.", 1).is_empty());
        assert!(budget().scan("Total budget, in dollars.", 1).is_empty());
    }

    #[test]
    fn finds_plain_integers_in_order() {
        assert_eq!(values(&standard(), "Numbers: 10, 500, 42"), vec![10.0, 500.0, 42.0]);
    }

    #[test]
    fn parses_comma_grouped_decimals() {
        let found = standard().scan("Revenue: 1,234.56\nExpense: 2,000.00", 3);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].raw, "1,234.56");
        assert!((found[0].value - 1234.56).abs() < 1e-9);
        assert!((found[1].value - 2000.0).abs() < 1e-9);
        assert_eq!(found[1].page, 3);
    }

    #[test]
    fn records_byte_span_and_context() {
        let text = "Budget: 3.15, 450";
        let found = standard().scan(text, 1);
        let last = found.last().unwrap();
        assert_eq!(&text[last.start..last.end], "450");
        assert_eq!(last.context, text);
    }

    #[test]
    fn ungrouped_long_runs_are_not_literals() {
        // Four digits without a separator do not fit the 1-3 digit lead.
        assert!(standard().scan("Fiscal year 2024", 1).is_empty());
    }

    #[test]
    fn standard_ignores_sign() {
        assert_eq!(values(&standard(), "change of -12"), vec![12.0]);
    }

    #[test]
    fn budget_requires_decimal_and_keeps_sign() {
        let text = "Total expense: -1,250.75 and 300 units";
        assert_eq!(values(&budget(), text), vec![-1250.75]);
    }

    #[test]
    fn budget_skips_code_like_numbers() {
        let text = "Total fund codes ID-7.25, A12.50 and 12.50b, amount 99.95";
        assert_eq!(values(&budget(), text), vec![99.95]);
    }

    #[test]
    fn budget_requires_keyword_context() {
        let filler = "x ".repeat(80);
        let text = format!("Revenue 10.50 {filler} unrelated 20.75");
        assert_eq!(values(&budget(), &text), vec![10.5]);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(values(&budget(), "TOTAL: 5.25"), vec![5.25]);
    }

    #[test]
    fn caps_comma_groups() {
        // Four groups exceed the budget cap of three; the only thing the
        // pattern can match is a tail fragment, which is dropped.
        assert!(budget().scan("total 1,000,000,000,000.00", 1).is_empty());
        assert_eq!(
            values(&budget(), "total 1,000,000,000.00"),
            vec![1_000_000_000.0]
        );
    }

    #[test]
    fn rejects_too_many_integer_digits() {
        let scanner = Scanner::new(ScanOptions {
            max_integer_digits: Some(4),
            ..ScanOptions::standard()
        })
        .unwrap();
        assert_eq!(values(&scanner, "1,234 and 12,345"), vec![1234.0]);
    }

    #[test]
    fn fragments_follow_a_digit_separator() {
        assert!(is_fragment("1,000", 2));
        assert!(is_fragment("1.5", 2));
        assert!(!is_fragment("a, 500", 3));
        assert!(!is_fragment(", 500", 2));
        assert!(!is_fragment("500", 0));
    }

    #[test]
    fn standard_keeps_fragments() {
        // European-style grouping: the standard preset reports both pieces.
        assert_eq!(values(&standard(), "1.234.567"), vec![1.234, 567.0]);
    }

    #[test]
    fn code_like_detection_checks_both_sides() {
        assert!(is_code_like("A12", 1, 3));
        assert!(is_code_like("12b", 0, 2));
        assert!(!is_code_like("(12)", 1, 3));
        assert!(!is_code_like("12", 0, 2));
    }

    #[test]
    fn pattern_reflects_options() {
        assert_eq!(
            ScanOptions::standard().pattern(),
            r"\b[0-9]{1,3}(?:,[0-9]{3})*(?:\.[0-9]+)?\b"
        );
        assert_eq!(
            ScanOptions::budget().pattern(),
            r"-?\b[0-9]{1,3}(?:,[0-9]{3}){0,3}\.[0-9]+\b"
        );
    }
}
