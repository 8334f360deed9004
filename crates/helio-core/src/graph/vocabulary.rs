//! Relationship vocabulary: metaedge codes and the verbs they stand for.
//!
//! A code names the source category, the relation and the target category,
//! e.g. `CtD` is Compound-treats-Disease. Casing inside the code carries the
//! direction; `Gr>G` spells it out for the one gene-to-gene relation that is
//! asymmetric.

use std::collections::BTreeMap;

use super::models::Category;

/// Codes and verbs shipped with the Hetionet tables.
pub const HETIONET_METAEDGES: &[(&str, &str)] = &[
    ("CrC", "Resembles"),
    ("CtD", "Treats"),
    ("CpD", "Palliates"),
    ("CbG", "Binds"),
    ("CuG", "Upregulates"),
    ("CdG", "Downregulates"),
    ("DrD", "Resembles"),
    ("DuG", "Upregulates"),
    ("DdG", "Downregulates"),
    ("DaG", "Associates"),
    ("DlA", "Localizes"),
    ("AuG", "Upregulates"),
    ("AdG", "Downregulates"),
    ("AeG", "Expresses"),
    ("Gr>G", "Regulates"),
    ("GcG", "Covariates"),
    ("GiG", "Interacts"),
];

/// One vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEdge {
    pub code: String,
    pub verb: String,
    /// Category of the relationship source, when the code abbreviates one.
    pub source: Option<Category>,
    /// Category of the relationship target, when the code abbreviates one.
    pub target: Option<Category>,
}

impl MetaEdge {
    pub fn new(code: impl Into<String>, verb: impl Into<String>) -> Self {
        let code = code.into();
        let source = code.chars().next().and_then(Category::from_abbreviation);
        let target = code.chars().last().and_then(Category::from_abbreviation);
        Self {
            code,
            verb: verb.into(),
            source,
            target,
        }
    }
}

/// Immutable code-to-verb lookup.
///
/// Built once at startup and shared by reference; there is no way to mutate
/// it after construction.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: BTreeMap<String, MetaEdge>,
}

impl Vocabulary {
    /// The Hetionet metaedges.
    pub fn hetionet() -> Self {
        Self::from_pairs(HETIONET_METAEDGES.iter().copied())
    }

    /// Build from `(code, verb)` pairs. Later pairs win.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(code, verb)| (code.to_string(), MetaEdge::new(code, verb)))
            .collect();
        Self { entries }
    }

    /// Copy of this vocabulary with verbs added or replaced.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, String>) -> Self {
        let mut entries = self.entries.clone();
        for (code, verb) in overrides {
            entries.insert(code.clone(), MetaEdge::new(code.as_str(), verb.as_str()));
        }
        Self { entries }
    }

    pub fn get(&self, code: &str) -> Option<&MetaEdge> {
        self.entries.get(code)
    }

    /// Verb for a code, e.g. `Treats` for `CtD`.
    pub fn verb(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(|m| m.verb.as_str())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Entries ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = &MetaEdge> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::hetionet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hetionet_lookup() {
        let vocabulary = Vocabulary::hetionet();
        assert_eq!(vocabulary.len(), 17);
        assert_eq!(vocabulary.verb("CtD"), Some("Treats"));
        assert_eq!(vocabulary.verb("Gr>G"), Some("Regulates"));
        assert_eq!(vocabulary.verb("ctd"), None);
    }

    #[test]
    fn test_endpoint_categories() {
        let vocabulary = Vocabulary::hetionet();
        let dla = vocabulary.get("DlA").unwrap();
        assert_eq!(dla.source, Some(Category::Disease));
        assert_eq!(dla.target, Some(Category::Anatomy));

        let regulates = vocabulary.get("Gr>G").unwrap();
        assert_eq!(regulates.source, Some(Category::Gene));
        assert_eq!(regulates.target, Some(Category::Gene));
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("CtD".to_string(), "Cures".to_string());
        overrides.insert("PcG".to_string(), "Participates".to_string());

        let base = Vocabulary::hetionet();
        let vocabulary = base.with_overrides(&overrides);
        assert_eq!(vocabulary.verb("CtD"), Some("Cures"));
        assert_eq!(vocabulary.verb("PcG"), Some("Participates"));
        assert_eq!(vocabulary.get("PcG").unwrap().source, None);
        assert_eq!(base.verb("CtD"), Some("Treats"));
    }
}
