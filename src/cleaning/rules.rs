//! Ordered cell rewrite rules.
//!
//! Both the spelling corrections and the missing-value sentinels are
//! expressed as `(pattern, replacement)` lists and applied by the same
//! pure function over a single cell.

use crate::models::Cell;
use once_cell::sync::Lazy;
use regex::Regex;

/// What a rule matches against a text cell.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Case-sensitive match of the whole value.
    Exact(&'static str),
    /// Regex search anywhere in the value.
    Regex(Regex),
}

impl Pattern {
    fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(expected) => value == *expected,
            Pattern::Regex(re) => re.is_match(value),
        }
    }
}

/// What a matching cell becomes.
#[derive(Debug, Clone)]
pub enum Replacement {
    /// The whole value becomes this text.
    Text(&'static str),
    /// Only the matched part is replaced; the rest of the value is kept.
    Substitute(&'static str),
    Missing,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: Pattern,
    pub replacement: Replacement,
}

impl Rule {
    /// The rewritten cell, or `None` if the rule does not apply to `value`.
    fn rewrite(&self, value: &str) -> Option<Cell> {
        if !self.pattern.matches(value) {
            return None;
        }

        let cell = match (&self.replacement, &self.pattern) {
            (Replacement::Substitute(with), Pattern::Regex(re)) => {
                Cell::Text(re.replace(value, *with).into_owned())
            }
            (Replacement::Substitute(with), Pattern::Exact(_)) | (Replacement::Text(with), _) => {
                Cell::Text((*with).to_string())
            }
            (Replacement::Missing, _) => Cell::Missing,
        };
        Some(cell)
    }
}

impl Rule {
    pub fn exact(from: &'static str, to: &'static str) -> Self {
        Self {
            pattern: Pattern::Exact(from),
            replacement: Replacement::Text(to),
        }
    }

    fn regex(pattern: &str, replacement: Replacement) -> Self {
        Self {
            pattern: Pattern::Regex(Regex::new(pattern).expect("rule pattern is a valid regex")),
            replacement,
        }
    }
}

/// Known misspellings and regional names in the ratings file.
pub static CORRECTIONS: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::exact("Domincan Republic", "Dominican Republic"),
        Rule::exact("Hawaii", "United States"),
        Rule::exact("Cost Rica, Ven", "Costa Rica, Venezuela"),
        Rule::exact("Niacragua", "Nicaragua"),
        Rule::exact("Eucador", "Ecuador"),
        Rule::exact("Mad., Java, PNG", "Madagascar, Java, Papua New Guinea"),
        Rule::regex(r"^Ven,", Replacement::Substitute("Venezuela")),
        Rule::exact("Amsterdam", "Netherlands"),
        Rule::exact("Scotland", "United Kingdom"),
        Rule::exact("Wales", "United Kingdom"),
    ]
});

/// Values that stand for "no data".
pub static MISSING_SENTINELS: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // \s is Unicode-aware, so a lone U+00A0 counts as blank
        Rule::regex(r"^\s*$", Replacement::Missing),
        Rule::regex(r"^not found$", Replacement::Missing),
    ]
});

/// Run a cell through an ordered rule list.
///
/// Each rule sees the output of the previous one. Only text cells are
/// rewritten; numbers and missing markers pass through untouched.
pub fn apply_rules(cell: Cell, rules: &[Rule]) -> Cell {
    rules.iter().fold(cell, |cell, rule| {
        let rewritten = cell.as_text().and_then(|value| rule.rewrite(value));
        rewritten.unwrap_or(cell)
    })
}

/// Apply the spelling corrections to one cell.
pub fn correct(cell: Cell) -> Cell {
    apply_rules(cell, &CORRECTIONS)
}

/// Turn blank and `not found` cells into the missing marker.
pub fn mark_missing(cell: Cell) -> Cell {
    apply_rules(cell, &MISSING_SENTINELS)
}
