//! Country name canonicalization.
//!
//! The cleaner only depends on the [`CountryResolver`] trait. The default
//! [`StaticCountryTable`] searches each raw value against a table of
//! case-insensitive country patterns and reports every country it finds,
//! in the order they appear in the value.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

/// Maps raw, inconsistently spelled country names to canonical short names.
pub trait CountryResolver {
    /// Canonicalize a batch of raw names.
    ///
    /// The result is parallel to `names`; `None` marks an unresolved entry.
    /// A value naming several countries resolves to one `", "`-joined string.
    fn canonicalize(&self, names: &[&str]) -> Vec<Option<String>>;
}

/// One row of the lookup table.
#[derive(Debug, Clone)]
struct CountryPattern {
    name: String,
    pattern: Regex,
    /// A hit here vetoes the main pattern (e.g. "Democratic" for Congo).
    exclude: Option<Regex>,
}

impl CountryPattern {
    fn build(name: &str, pattern: &str, exclude: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            pattern: case_insensitive(pattern)?,
            exclude: exclude.map(case_insensitive).transpose()?,
        })
    }

    /// Byte offset of the first hit, if the entry applies to `value`.
    fn find(&self, value: &str) -> Option<usize> {
        if let Some(ref exclude) = self.exclude {
            if exclude.is_match(value) {
                return None;
            }
        }
        self.pattern.find(value).map(|m| m.start())
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// (short name, pattern, exclusion pattern)
const COUNTRIES: &[(&str, &str, Option<&str>)] = &[
    ("Argentina", r"argentin", None),
    ("Australia", r"australia", None),
    ("Austria", r"austria", None),
    ("Belgium", r"belgi", None),
    ("Belize", r"belize", None),
    ("Bolivia", r"bolivia", None),
    ("Brazil", r"bra[sz]il", None),
    ("Cameroon", r"cameroon", None),
    ("Canada", r"canada", None),
    ("Chile", r"\bchile", None),
    ("China", r"\bchina\b", None),
    ("Colombia", r"colombia", None),
    ("Congo Republic", r"\bcongo", Some(r"dem|\bd\.?r\b|kinshasa")),
    ("Costa Rica", r"costa.?rica", None),
    ("Cote d'Ivoire", r"ivory|ivoire", None),
    ("Cuba", r"\bcuba", None),
    ("Czech Republic", r"czech", None),
    ("DR Congo", r"dem.*congo|congo.*dem|\bdrc\b|\bd\.?r\.?\s*congo|congo.*kinshasa", None),
    ("Denmark", r"denmark", None),
    ("Dominican Republic", r"dominican|dom\.?\s?rep|domin\.|\bd\.?r\b", Some(r"congo")),
    ("Ecuador", r"ecuad|\becu\b", None),
    ("El Salvador", r"salvador", None),
    ("Fiji", r"fiji", None),
    ("Finland", r"finland", None),
    ("France", r"france|french", None),
    ("Gabon", r"gabon", None),
    ("Germany", r"germany", None),
    ("Ghana", r"ghana", None),
    ("Grenada", r"grenada|\bgre\b", None),
    ("Guatemala", r"guatemala|\bguat\b", None),
    ("Haiti", r"haiti", None),
    ("Honduras", r"honduras", None),
    ("Hungary", r"hungary", None),
    ("Iceland", r"iceland", None),
    ("India", r"\bindia\b", None),
    ("Indonesia", r"indonesia", None),
    ("Ireland", r"ireland", Some(r"north")),
    ("Israel", r"israel", None),
    ("Italy", r"\bital", None),
    ("Jamaica", r"jamaica", None),
    ("Japan", r"japan", None),
    ("Liberia", r"liberia", None),
    ("Lithuania", r"lithuania", None),
    ("Madagascar", r"madagascar|\bmad\b", None),
    ("Malaysia", r"malaysia", None),
    ("Martinique", r"martinique", None),
    ("Mexico", r"mexic|\bmex\b", None),
    ("Myanmar", r"myanmar|burma", None),
    ("Netherlands", r"netherlands|holland", None),
    ("New Zealand", r"new.?zealand", None),
    ("Nicaragua", r"nicaragua|\bnic\b", None),
    ("Nigeria", r"nigeria", None),
    ("Panama", r"panama", None),
    ("Papua New Guinea", r"papua|\bpng\b", None),
    ("Peru", r"\bperu\b", None),
    ("Philippines", r"philippine", None),
    ("Poland", r"poland", None),
    ("Portugal", r"portugal", None),
    ("Puerto Rico", r"puerto.?rico", None),
    ("Russia", r"russia", None),
    ("Samoa", r"samoa", Some(r"amer")),
    ("Sao Tome and Principe", r"s[aã]o.?tom[eé]|principe", None),
    ("Sierra Leone", r"sierra.?leone", None),
    ("Singapore", r"singapore", None),
    ("Solomon Islands", r"solomon", None),
    ("South Africa", r"south.?africa", None),
    ("South Korea", r"korea", Some(r"north|dem|people")),
    ("Spain", r"spain", None),
    ("Sri Lanka", r"sri.?lanka", None),
    ("St. Lucia", r"(saint|st\.?).?lucia", None),
    ("Suriname", r"surinam", None),
    ("Sweden", r"sweden", None),
    ("Switzerland", r"switzerland|swiss", None),
    ("Tanzania", r"tanzania", None),
    ("Thailand", r"thailand", None),
    ("Togo", r"\btogo\b", None),
    ("Trinidad and Tobago", r"trinidad|tobago", None),
    ("Uganda", r"uganda", None),
    ("United Kingdom", r"united.?kingdom|britain|england|scotland|wales|\bu\.?k\b", None),
    ("United States", r"united.?states|\bu\.?s\.?a\b", None),
    ("Vanuatu", r"vanuatu", None),
    ("Venezuela", r"venez|\bven\b", None),
    ("Vietnam", r"viet.?nam", None),
];

static DEFAULT_TABLE: Lazy<Vec<CountryPattern>> = Lazy::new(|| {
    COUNTRIES
        .iter()
        .map(|(name, pattern, exclude)| {
            CountryPattern::build(name, pattern, *exclude).expect("built-in country pattern is valid")
        })
        .collect()
});

/// Regex-table country resolver.
#[derive(Debug, Clone)]
pub struct StaticCountryTable {
    entries: Vec<CountryPattern>,
}

impl Default for StaticCountryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticCountryTable {
    /// The built-in table.
    pub fn new() -> Self {
        Self {
            entries: DEFAULT_TABLE.to_vec(),
        }
    }

    /// The built-in table plus user aliases (`pattern -> short name`).
    ///
    /// Alias keys are case-insensitive regexes, e.g. `"\\bbali\\b" = "Indonesia"`.
    pub fn with_aliases(aliases: &BTreeMap<String, String>) -> Result<Self, regex::Error> {
        let mut table = Self::new();
        for (pattern, name) in aliases {
            table.entries.push(CountryPattern::build(name, pattern, None)?);
        }
        Ok(table)
    }

    /// Number of patterns in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a single raw value.
    pub fn lookup(&self, raw: &str) -> Option<String> {
        let mut hits: Vec<(usize, &str)> = self
            .entries
            .iter()
            .filter_map(|entry| entry.find(raw).map(|pos| (pos, entry.name.as_str())))
            .collect();

        // stable: ties keep table order
        hits.sort_by_key(|(pos, _)| *pos);

        let mut names: Vec<&str> = Vec::with_capacity(hits.len());
        for (_, name) in hits {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    }
}

impl CountryResolver for StaticCountryTable {
    fn canonicalize(&self, names: &[&str]) -> Vec<Option<String>> {
        names.iter().map(|name| self.lookup(name)).collect()
    }
}
