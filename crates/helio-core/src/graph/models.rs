//! Data models for the knowledge graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::vocabulary::Vocabulary;

/// Category (Hetionet "kind") of an entity.
///
/// Stored as its display string; strings outside the four known kinds
/// round-trip through [`Category::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Compound,
    Disease,
    Gene,
    Anatomy,
    Other(String),
}

impl Category {
    /// Stored and displayed name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Compound => "Compound",
            Self::Disease => "Disease",
            Self::Gene => "Gene",
            Self::Anatomy => "Anatomy",
            Self::Other(s) => s,
        }
    }

    /// Key used when a neighborhood is rendered as a JSON object.
    pub fn group_name(&self) -> String {
        match self {
            Self::Compound => "compounds".to_string(),
            Self::Disease => "diseases".to_string(),
            Self::Gene => "genes".to_string(),
            Self::Anatomy => "anatomies".to_string(),
            Self::Other(s) => s.to_lowercase(),
        }
    }

    /// Category abbreviated by a metaedge letter (`C`, `D`, `G`, `A`).
    pub fn from_abbreviation(letter: char) -> Option<Self> {
        match letter {
            'C' => Some(Self::Compound),
            'D' => Some(Self::Disease),
            'G' => Some(Self::Gene),
            'A' => Some(Self::Anatomy),
            _ => None,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Compound" => Self::Compound,
            "Disease" => Self::Disease,
            "Gene" => Self::Gene,
            "Anatomy" => Self::Anatomy,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the graph, as read from the entity table and stored in the
/// edge-list layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier, e.g. `Disease::DOID:2841`.
    pub entity_id: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub kind: Category,
}

impl Entity {
    pub fn new(
        entity_id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<Category>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// A directed, typed edge: `source -metaedge-> target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub metaedge: String,
    pub target: String,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        metaedge: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            metaedge: metaedge.into(),
            target: target.into(),
        }
    }

    /// Human-readable form, e.g. `Compound::DB01048 Treats Disease::DOID:2841`.
    pub fn describe(&self, vocabulary: &Vocabulary) -> String {
        let verb = vocabulary.verb(&self.metaedge).unwrap_or(&self.metaedge);
        format!("{} {} {}", self.source, verb, self.target)
    }
}

/// Outgoing adjacency entry of an embedded entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutEdge {
    pub target: String,
    pub metaedge: String,
}

/// Incoming adjacency entry of an embedded entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InEdge {
    pub source: String,
    pub metaedge: String,
}

/// Entity document of the embedded-adjacency layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedEntity {
    pub entity_id: String,
    pub name: String,
    pub kind: Category,
    /// Edges where this entity is the source.
    pub edges_out: Vec<OutEdge>,
    /// Edges where this entity is the target.
    pub edges_in: Vec<InEdge>,
}

impl From<Entity> for EmbeddedEntity {
    fn from(e: Entity) -> Self {
        Self {
            entity_id: e.entity_id,
            name: e.name,
            kind: e.kind,
            edges_out: Vec::new(),
            edges_in: Vec::new(),
        }
    }
}

/// Record counts of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Documents in the entity collection.
    pub entities: usize,
    /// Relationship documents (edge-list) or sum of outgoing adjacency
    /// entries (embedded).
    pub relationships: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        let json = serde_json::to_string(&Category::Anatomy).unwrap();
        assert_eq!(json, "\"Anatomy\"");

        let other: Category = serde_json::from_str("\"Side Effect\"").unwrap();
        assert_eq!(other, Category::Other("Side Effect".to_string()));
        assert_eq!(other.group_name(), "side effect");
    }

    #[test]
    fn test_category_abbreviation() {
        assert_eq!(Category::from_abbreviation('G'), Some(Category::Gene));
        assert_eq!(Category::from_abbreviation('X'), None);
    }

    #[test]
    fn test_describe_relationship() {
        let vocabulary = Vocabulary::default();
        let rel = Relationship::new("C1", "CtD", "D1");
        assert_eq!(rel.describe(&vocabulary), "C1 Treats D1");

        let unknown = Relationship::new("C1", "CxD", "D1");
        assert_eq!(unknown.describe(&vocabulary), "C1 CxD D1");
    }
}
