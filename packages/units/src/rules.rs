//! Rule tables for unit detection, loaded from TOML.
//!
//! The built-in table lives in `packages/units/rules/default.toml` and is
//! baked into the binary with [`include_str!`]. A replacement table with the
//! same shape can be loaded from disk with [`RuleSet::from_path`].

use std::path::Path;

use pdf_max_models::Multiplier;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::RuleError;

/// The rule table shipped with the binary.
const DEFAULT_RULES_TOML: &str = include_str!("../rules/default.toml");

// ── File format ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    rule: Vec<RuleDef>,
    #[serde(default)]
    header: Vec<HeaderDef>,
    #[serde(default)]
    unit_word: Vec<UnitWordDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDef {
    name: String,
    pattern: String,
    multiplier: Multiplier,
    #[serde(default)]
    qualified: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeaderDef {
    phrase: String,
    multiplier: Multiplier,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitWordDef {
    word: String,
    symbol: String,
    multiplier: Multiplier,
}

// ── Compiled rules ───────────────────────────────────────────────────────

/// One phrase or symbol pattern mapped to a multiplier.
#[derive(Debug, Clone)]
pub struct UnitRule {
    name: String,
    regex: Regex,
    multiplier: Multiplier,
    qualified: bool,
}

impl UnitRule {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    #[must_use]
    pub const fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    /// Whether the rule is phrased with a strong qualifier ("all figures
    /// are in millions") and earns the confidence bonus.
    #[must_use]
    pub const fn qualified(&self) -> bool {
        self.qualified
    }
}

/// A document-wide header phrase such as "dollars in millions".
#[derive(Debug, Clone)]
pub struct HeaderPhrase {
    /// Lowercased phrase, matched as a substring.
    pub phrase: String,
    pub multiplier: Multiplier,
}

/// A unit word ("million") or its parenthesised symbol ("($M)").
#[derive(Debug, Clone)]
pub struct UnitWord {
    pub word: String,
    pub regex: Regex,
    pub multiplier: Multiplier,
}

/// An ordered, immutable set of detection rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<UnitRule>,
    headers: Vec<HeaderPhrase>,
    unit_words: Vec<UnitWord>,
}

impl RuleSet {
    /// Returns the rule table embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded table is malformed (this is a compile-time
    /// guarantee since the table is embedded and covered by tests).
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(DEFAULT_RULES_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse default.toml: {e}"))
    }

    /// Parses and compiles a rule table.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the TOML is malformed, a pattern fails to
    /// compile, or the table is unusable (no rules, or a rule mapped to
    /// `"one"`).
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RuleError> {
        let file: RuleFile = toml::de::from_str(toml_str)?;

        if file.rule.is_empty() {
            return Err(RuleError::Invalid(
                "rule table defines no [[rule]] entries".to_string(),
            ));
        }

        let rules = file
            .rule
            .into_iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>, _>>()?;

        let headers = file
            .header
            .into_iter()
            .map(|h| {
                reject_identity(&h.phrase, h.multiplier)?;
                Ok(HeaderPhrase {
                    phrase: h.phrase.to_lowercase(),
                    multiplier: h.multiplier,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        let unit_words = file
            .unit_word
            .into_iter()
            .map(compile_unit_word)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Loaded {} rule(s), {} header phrase(s), {} unit word(s)",
            rules.len(),
            headers.len(),
            unit_words.len()
        );

        Ok(Self {
            rules,
            headers,
            unit_words,
        })
    }

    /// Reads and compiles a rule table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Io`] if the file cannot be read, or any error
    /// from [`RuleSet::from_toml_str`].
    pub fn from_path(path: &Path) -> Result<Self, RuleError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Detection rules in priority order.
    #[must_use]
    pub fn rules(&self) -> &[UnitRule] {
        &self.rules
    }

    /// Header phrases in priority order.
    #[must_use]
    pub fn headers(&self) -> &[HeaderPhrase] {
        &self.headers
    }

    /// Unit words in priority order.
    #[must_use]
    pub fn unit_words(&self) -> &[UnitWord] {
        &self.unit_words
    }
}

fn compile_rule(def: RuleDef) -> Result<UnitRule, RuleError> {
    reject_identity(&def.name, def.multiplier)?;

    let regex = RegexBuilder::new(&def.pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RuleError::Regex {
            name: def.name.clone(),
            source,
        })?;

    Ok(UnitRule {
        name: def.name,
        regex,
        multiplier: def.multiplier,
        qualified: def.qualified,
    })
}

fn compile_unit_word(def: UnitWordDef) -> Result<UnitWord, RuleError> {
    reject_identity(&def.word, def.multiplier)?;

    // The word is case-insensitive; the symbol must appear as written.
    let pattern = format!(
        r"(?i:\b{}s?\b)|\(\s*\${}\s*\)",
        regex::escape(&def.word),
        regex::escape(&def.symbol)
    );
    let regex = Regex::new(&pattern).map_err(|source| RuleError::Regex {
        name: def.word.clone(),
        source,
    })?;

    Ok(UnitWord {
        word: def.word,
        regex,
        multiplier: def.multiplier,
    })
}

fn reject_identity(name: &str, multiplier: Multiplier) -> Result<(), RuleError> {
    if multiplier == Multiplier::One {
        return Err(RuleError::Invalid(format!(
            "'{name}' maps to multiplier \"one\", which scales nothing"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let rules = RuleSet::builtin();
        assert_eq!(rules.rules().len(), 12);
        assert_eq!(rules.headers().len(), 4);
        assert_eq!(rules.unit_words().len(), 4);
    }

    #[test]
    fn builtin_families_are_ordered_millions_billions_thousands() {
        let rules = RuleSet::builtin();
        let families: Vec<Multiplier> = rules.rules().iter().map(UnitRule::multiplier).collect();
        assert_eq!(families[..4], [Multiplier::Million; 4]);
        assert_eq!(families[4..8], [Multiplier::Billion; 4]);
        assert_eq!(families[8..], [Multiplier::Thousand; 4]);
    }

    #[test]
    fn only_phrase_rules_are_qualified() {
        let rules = RuleSet::builtin();
        let qualified: Vec<&str> = rules
            .rules()
            .iter()
            .filter(|r| r.qualified())
            .map(UnitRule::name)
            .collect();
        assert_eq!(
            qualified,
            vec![
                "millions_qualified_phrase",
                "billions_qualified_phrase",
                "thousands_qualified_phrase",
            ]
        );
    }

    #[test]
    fn reports_bad_pattern_by_rule_name() {
        let toml = r#"
            [[rule]]
            name = "broken"
            pattern = '(unclosed'
            multiplier = "million"
        "#;
        let err = RuleSet::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, RuleError::Regex { ref name, .. } if name == "broken"));
    }

    #[test]
    fn rejects_unknown_multiplier() {
        let toml = r#"
            [[rule]]
            name = "weird"
            pattern = 'x'
            multiplier = "gazillion"
        "#;
        assert!(matches!(
            RuleSet::from_toml_str(toml).unwrap_err(),
            RuleError::Toml(_)
        ));
    }

    #[test]
    fn rejects_identity_multiplier() {
        let toml = r#"
            [[rule]]
            name = "noop"
            pattern = 'x'
            multiplier = "one"
        "#;
        assert!(matches!(
            RuleSet::from_toml_str(toml).unwrap_err(),
            RuleError::Invalid(_)
        ));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(matches!(
            RuleSet::from_toml_str("").unwrap_err(),
            RuleError::Invalid(_)
        ));
    }

    #[test]
    fn rule_patterns_ignore_case() {
        let toml = r#"
            [[rule]]
            name = "k"
            pattern = '\$K\b'
            multiplier = "thousand"
        "#;
        let rules = RuleSet::from_toml_str(toml).unwrap();
        assert!(rules.rules()[0].regex().is_match("costs ($k)"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RuleSet::from_path(Path::new("/no/such/rules.toml")).unwrap_err();
        assert!(matches!(err, RuleError::Io { .. }));
    }
}
