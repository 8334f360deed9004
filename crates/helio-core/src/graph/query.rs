//! One-hop neighborhood queries.
//!
//! A query starts from an anchor entity and, for every [`FilterRule`],
//! collects the entities one matching relationship away. Results are
//! grouped by the neighbor's category, deduplicated by entity id and sorted
//! by name.

use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::GraphError;
use super::models::{Category, Entity};
use super::retry::with_timeout;
use super::vocabulary::Vocabulary;
use super::GraphStore;

/// Which end of a relationship the anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Anchor is the target; the neighbor is the source.
    Incoming,
    /// Anchor is the source; the neighbor is the target.
    Outgoing,
}

impl Direction {
    /// Relationship fields as `(anchor end, neighbor end)`.
    pub fn endpoints(&self) -> (&'static str, &'static str) {
        match self {
            Self::Incoming => ("target", "source"),
            Self::Outgoing => ("source", "target"),
        }
    }
}

/// Neighbors of one category reached through a set of codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    /// Category the neighbor must carry.
    pub category: Category,
    pub direction: Direction,
    /// Accepted metaedge codes.
    pub metaedges: Vec<String>,
}

impl FilterRule {
    pub fn new(category: Category, direction: Direction, metaedges: &[&str]) -> Self {
        Self {
            category,
            direction,
            metaedges: metaedges.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Neighbors that point at the anchor.
    pub fn incoming(category: Category, metaedges: &[&str]) -> Self {
        Self::new(category, Direction::Incoming, metaedges)
    }

    /// Neighbors the anchor points at.
    pub fn outgoing(category: Category, metaedges: &[&str]) -> Self {
        Self::new(category, Direction::Outgoing, metaedges)
    }
}

/// The rule set of a neighborhood query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodFilters {
    rules: Vec<FilterRule>,
}

impl NeighborhoodFilters {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Compounds that treat or palliate the disease, genes it associates
    /// with, and anatomy it localizes to.
    pub fn disease() -> Self {
        Self::new(vec![
            FilterRule::incoming(Category::Compound, &["CtD", "CpD"]),
            FilterRule::outgoing(Category::Gene, &["DaG"]),
            FilterRule::outgoing(Category::Anatomy, &["DlA"]),
        ])
    }

    /// Every code in `vocabulary`, anchor as source, one rule per target
    /// category.
    pub fn all_outgoing(vocabulary: &Vocabulary) -> Self {
        Self::grouped(vocabulary, Direction::Outgoing)
    }

    /// Every code in `vocabulary`, anchor as target, one rule per source
    /// category.
    pub fn all_incoming(vocabulary: &Vocabulary) -> Self {
        Self::grouped(vocabulary, Direction::Incoming)
    }

    fn grouped(vocabulary: &Vocabulary, direction: Direction) -> Self {
        let mut by_category: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for meta in vocabulary.iter() {
            let neighbor = match direction {
                Direction::Outgoing => &meta.target,
                Direction::Incoming => &meta.source,
            };
            if let Some(category) = neighbor {
                by_category
                    .entry(category.clone())
                    .or_default()
                    .push(meta.code.clone());
            }
        }

        let rules = by_category
            .into_iter()
            .map(|(category, metaedges)| FilterRule {
                category,
                direction,
                metaedges,
            })
            .collect();
        Self { rules }
    }

    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Reject rule sets that name unknown codes or can never match.
    pub fn validate(&self, vocabulary: &Vocabulary) -> Result<(), GraphError> {
        if self.rules.is_empty() {
            return Err(GraphError::InvalidFilter("no filter rules".to_string()));
        }

        for rule in &self.rules {
            if rule.metaedges.is_empty() {
                return Err(GraphError::InvalidFilter(format!(
                    "{} rule has no metaedge codes",
                    rule.category
                )));
            }

            for code in &rule.metaedges {
                let meta = vocabulary
                    .get(code)
                    .ok_or_else(|| GraphError::UnknownMetaEdge(code.clone()))?;

                let neighbor = match rule.direction {
                    Direction::Incoming => &meta.source,
                    Direction::Outgoing => &meta.target,
                };
                if let Some(expected) = neighbor {
                    if *expected != rule.category {
                        return Err(GraphError::InvalidFilter(format!(
                            "{} never reaches a {} neighbor in {:?} direction",
                            code, rule.category, rule.direction
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for NeighborhoodFilters {
    fn default() -> Self {
        Self::disease()
    }
}

/// Result of a neighborhood query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    /// The entity the query started from.
    pub anchor: Entity,
    /// Neighbor names per category. Every rule's category is present.
    pub groups: BTreeMap<Category, Vec<String>>,
}

impl Neighborhood {
    /// Names for `category`; empty when the category had no rule.
    pub fn get(&self, category: &Category) -> &[String] {
        self.groups.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total neighbors across categories.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON object keyed by plural category name.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "anchor".to_string(),
            json!({
                "id": self.anchor.entity_id,
                "name": self.anchor.name,
                "kind": self.anchor.kind.as_str(),
            }),
        );
        for (category, names) in &self.groups {
            object.insert(category.group_name(), json!(names));
        }
        Value::Object(object)
    }
}

impl fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} ({})",
            self.anchor.kind, self.anchor.name, self.anchor.entity_id
        )?;
        for (category, names) in &self.groups {
            let label = capitalize(&category.group_name());
            if names.is_empty() {
                writeln!(f, "  {} (0): -", label)?;
            } else {
                writeln!(f, "  {} ({}): {}", label, names.len(), names.join(", "))?;
            }
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Answers neighborhood queries against whichever layout backs the store.
///
/// Holds no mutable state, so it can be shared across tasks and called off
/// the UI thread.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn GraphStore>,
    vocabulary: Arc<Vocabulary>,
    timeout: Option<Duration>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn GraphStore>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            store,
            vocabulary,
            timeout: None,
        }
    }

    /// Bound each query; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Neighbors of `anchor_id` matched by `filters`, grouped by category.
    ///
    /// An anchor missing from the store is [`GraphError::EntityNotFound`];
    /// an anchor without matches yields empty groups.
    pub async fn neighborhood(
        &self,
        anchor_id: &str,
        filters: &NeighborhoodFilters,
    ) -> Result<Neighborhood, GraphError> {
        filters.validate(&self.vocabulary)?;
        with_timeout("neighborhood query", self.timeout, self.resolve(anchor_id, filters)).await
    }

    async fn resolve(
        &self,
        anchor_id: &str,
        filters: &NeighborhoodFilters,
    ) -> Result<Neighborhood, GraphError> {
        let anchor = self
            .store
            .get_entity(anchor_id)
            .await?
            .ok_or_else(|| GraphError::EntityNotFound(anchor_id.to_string()))?;

        // entity_id -> name, per category
        let mut found: BTreeMap<Category, HashMap<String, String>> = BTreeMap::new();

        for rule in filters.rules() {
            let candidates = self.store.candidates(anchor_id, rule).await?;
            debug!(
                anchor = anchor_id,
                category = %rule.category,
                candidates = candidates.len(),
                "resolved filter rule"
            );

            let names = found.entry(rule.category.clone()).or_default();
            for candidate in candidates {
                if candidate.kind != rule.category {
                    warn!(
                        anchor = anchor_id,
                        neighbor = %candidate.entity_id,
                        expected = %rule.category,
                        actual = %candidate.kind,
                        "category mismatch, omitting neighbor"
                    );
                    continue;
                }
                names.entry(candidate.entity_id).or_insert(candidate.name);
            }
        }

        let groups = found
            .into_iter()
            .map(|(category, by_id)| {
                let mut names: Vec<String> = by_id.into_values().collect();
                names.sort();
                (category, names)
            })
            .collect();

        Ok(Neighborhood { anchor, groups })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_are_valid() {
        let vocabulary = Vocabulary::default();
        let filters = NeighborhoodFilters::default();
        assert_eq!(filters.rules().len(), 3);
        assert!(filters.validate(&vocabulary).is_ok());
    }

    #[test]
    fn test_unknown_code_rejected() {
        let vocabulary = Vocabulary::default();
        let filters = NeighborhoodFilters::new(vec![FilterRule::incoming(
            Category::Compound,
            &["CxD"],
        )]);
        assert!(matches!(
            filters.validate(&vocabulary),
            Err(GraphError::UnknownMetaEdge(code)) if code == "CxD"
        ));
    }

    #[test]
    fn test_impossible_rule_rejected() {
        let vocabulary = Vocabulary::default();
        // DaG points from the disease to a gene; no compound is ever its source
        let filters = NeighborhoodFilters::new(vec![FilterRule::incoming(
            Category::Compound,
            &["DaG"],
        )]);
        assert!(matches!(
            filters.validate(&vocabulary),
            Err(GraphError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_empty_rules_rejected() {
        let vocabulary = Vocabulary::default();
        assert!(NeighborhoodFilters::new(Vec::new()).validate(&vocabulary).is_err());
        let empty_codes = NeighborhoodFilters::new(vec![FilterRule::outgoing(Category::Gene, &[])]);
        assert!(empty_codes.validate(&vocabulary).is_err());
    }

    #[test]
    fn test_all_outgoing_covers_vocabulary() {
        let vocabulary = Vocabulary::default();
        let filters = NeighborhoodFilters::all_outgoing(&vocabulary);
        let codes: usize = filters.rules().iter().map(|r| r.metaedges.len()).sum();
        assert_eq!(codes, vocabulary.len());
        assert!(filters.validate(&vocabulary).is_ok());

        let genes = filters
            .rules()
            .iter()
            .find(|r| r.category == Category::Gene)
            .unwrap();
        assert!(genes.metaedges.contains(&"DaG".to_string()));
        assert!(genes.metaedges.contains(&"Gr>G".to_string()));
    }

    #[test]
    fn test_neighborhood_rendering() {
        let mut groups = BTreeMap::new();
        groups.insert(Category::Compound, vec!["Albuterol".to_string()]);
        groups.insert(Category::Anatomy, Vec::new());
        let hood = Neighborhood {
            anchor: Entity::new("D1", "Asthma", "Disease"),
            groups,
        };

        let text = hood.to_string();
        assert!(text.contains("Disease: Asthma (D1)"));
        assert!(text.contains("Compounds (1): Albuterol"));
        assert!(text.contains("Anatomies (0): -"));

        let json = hood.to_json();
        assert_eq!(json["compounds"], json!(["Albuterol"]));
        assert_eq!(json["anatomies"], json!([]));
        assert_eq!(json["anchor"]["name"], "Asthma");
        assert_eq!(hood.get(&Category::Gene), &[] as &[String]);
        assert_eq!(hood.len(), 1);
    }
}
