//! Text and JSON rendering of a [`Ranking`].

use std::fmt::Write as _;

use pdf_max_models::{Multiplier, RankedResult};

use crate::{Ranking, Strategy};

const RULE_WIDTH: usize = 80;

/// Formats `value` with comma thousands separators and `decimals` places.
///
/// `format_grouped(-1234567.891, 2)` is `"-1,234,567.89"`.
#[must_use]
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.decimals$}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').map_or((fixed.as_str(), None), |(i, f)| {
        (i, Some(f))
    });

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    // -0.00 is printed as 0.00
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }

    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }

    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }

    out
}

/// `Multiplier::Million` is `"1,000,000"`.
#[must_use]
pub fn format_factor(multiplier: Multiplier) -> String {
    format_grouped(multiplier.factor(), 0)
}

/// Formats a `[0, 1]` confidence as a percentage with one decimal.
#[must_use]
pub fn format_percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// The info line printed ahead of a report when the document states a unit.
#[must_use]
pub fn unit_line(ranking: &Ranking) -> Option<String> {
    (ranking.global.confidence > 0.0).then(|| {
        format!(
            "[INFO] Detected unit multiplier: {} (confidence: {})",
            format_factor(ranking.global.multiplier),
            format_percent(ranking.global.confidence)
        )
    })
}

/// Renders a ranking as the human-readable report.
#[must_use]
pub fn render_text(ranking: &Ranking) -> String {
    let mut out = String::new();
    let rule = "-".repeat(RULE_WIDTH);

    let heading = match ranking.strategy {
        Strategy::Ranked => format!("Top {} largest numbers found:", ranking.results.len()),
        Strategy::Budget => "Largest number found:".to_string(),
    };

    writeln!(out, "{heading}").unwrap();
    writeln!(out, "{rule}").unwrap();

    for (i, result) in ranking.results.iter().enumerate() {
        write_result(&mut out, i + 1, result);
    }

    writeln!(out, "{rule}").unwrap();
    out
}

fn write_result(out: &mut String, index: usize, result: &RankedResult) {
    writeln!(out).unwrap();
    writeln!(out, "{index}. Value: {}", format_grouped(result.value, 2)).unwrap();
    writeln!(out, "   Raw text: {}", result.raw_text).unwrap();
    writeln!(out, "   Page: {}", result.page).unwrap();
    writeln!(out, "   Context: ...{}...", result.context).unwrap();
    if result.applied {
        writeln!(
            out,
            "   Unit multiplier: {} (confidence: {})",
            format_factor(result.multiplier),
            format_percent(result.confidence)
        )
        .unwrap();
    }
}

/// Renders a ranking as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if serialization fails.
pub fn render_json(ranking: &Ranking) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(ranking)
}
