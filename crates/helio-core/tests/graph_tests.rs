use std::collections::BTreeMap;
use std::sync::Arc;

use helio_core::graph::{
    memory_store, Category, Entity, GraphBatch, GraphError, GraphLoader, GraphStore, Layout,
    Neighborhood, NeighborhoodFilters, QueryEngine, Relationship, Vocabulary,
};

const LAYOUTS: [Layout; 2] = [Layout::EdgeList, Layout::Embedded];

fn asthma_entities() -> Vec<Entity> {
    vec![
        Entity::new("D1", "Asthma", "Disease"),
        Entity::new("C1", "Albuterol", "Compound"),
        Entity::new("G1", "ADRB2", "Gene"),
    ]
}

fn asthma_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new("C1", "CtD", "D1"),
        Relationship::new("D1", "DaG", "G1"),
    ]
}

/// Small graph with no parallel (source, target) pairs.
fn sample_entities() -> Vec<Entity> {
    vec![
        Entity::new("D1", "Asthma", "Disease"),
        Entity::new("D2", "COPD", "Disease"),
        Entity::new("D3", "Gout", "Disease"),
        Entity::new("C1", "Albuterol", "Compound"),
        Entity::new("C2", "Budesonide", "Compound"),
        Entity::new("G1", "ADRB2", "Gene"),
        Entity::new("G2", "IL13", "Gene"),
        Entity::new("A1", "lung", "Anatomy"),
        Entity::new("A2", "bronchus", "Anatomy"),
    ]
}

fn sample_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new("C1", "CtD", "D1"),
        Relationship::new("C2", "CpD", "D1"),
        Relationship::new("C1", "CtD", "D2"),
        Relationship::new("C2", "CbG", "G1"),
        Relationship::new("D1", "DaG", "G1"),
        Relationship::new("D1", "DaG", "G2"),
        Relationship::new("D2", "DaG", "G1"),
        Relationship::new("D1", "DlA", "A1"),
        Relationship::new("D1", "DlA", "A2"),
        Relationship::new("D2", "DlA", "A1"),
        Relationship::new("D1", "DrD", "D2"),
        Relationship::new("G1", "GiG", "G2"),
        Relationship::new("A1", "AeG", "G1"),
    ]
}

async fn loaded_engine(
    layout: Layout,
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
) -> QueryEngine {
    let vocabulary = Arc::new(Vocabulary::default());
    let store = memory_store(layout).await.unwrap();
    GraphLoader::new(vocabulary.clone())
        .with_batch_size(4)
        .load(store.as_ref(), entities, relationships)
        .await
        .unwrap();
    QueryEngine::new(store, vocabulary)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

async fn all_neighborhoods(
    engine: &QueryEngine,
    filters: &NeighborhoodFilters,
) -> BTreeMap<String, Neighborhood> {
    let mut result = BTreeMap::new();
    for entity in sample_entities() {
        let hood = engine.neighborhood(&entity.entity_id, filters).await.unwrap();
        result.insert(entity.entity_id, hood);
    }
    result
}

#[tokio::test]
async fn test_asthma_example_on_both_layouts() {
    for layout in LAYOUTS {
        let engine = loaded_engine(layout, asthma_entities(), asthma_relationships()).await;
        let hood = engine
            .neighborhood("D1", &NeighborhoodFilters::default())
            .await
            .unwrap();

        assert_eq!(hood.anchor.name, "Asthma", "{layout}");
        assert_eq!(hood.get(&Category::Compound), names(&["Albuterol"]).as_slice());
        assert_eq!(hood.get(&Category::Gene), names(&["ADRB2"]).as_slice());
        assert!(hood.get(&Category::Anatomy).is_empty());
        assert!(hood.get(&Category::Disease).is_empty());
    }
}

#[tokio::test]
async fn test_layouts_agree() {
    let vocabulary = Vocabulary::default();
    let filter_sets = [
        NeighborhoodFilters::default(),
        NeighborhoodFilters::all_outgoing(&vocabulary),
        NeighborhoodFilters::all_incoming(&vocabulary),
    ];

    let edge_list = loaded_engine(Layout::EdgeList, sample_entities(), sample_relationships()).await;
    let embedded = loaded_engine(Layout::Embedded, sample_entities(), sample_relationships()).await;

    for filters in &filter_sets {
        let left = all_neighborhoods(&edge_list, filters).await;
        let right = all_neighborhoods(&embedded, filters).await;
        assert_eq!(left, right);
    }
}

#[tokio::test]
async fn test_every_relationship_covered_once() {
    let vocabulary = Vocabulary::default();
    let expected = sample_relationships().len();

    for layout in LAYOUTS {
        let engine = loaded_engine(layout, sample_entities(), sample_relationships()).await;

        let outgoing = all_neighborhoods(&engine, &NeighborhoodFilters::all_outgoing(&vocabulary)).await;
        let source_side: usize = outgoing.values().map(Neighborhood::len).sum();
        assert_eq!(source_side, expected, "{layout} source side");

        let incoming = all_neighborhoods(&engine, &NeighborhoodFilters::all_incoming(&vocabulary)).await;
        let target_side: usize = incoming.values().map(Neighborhood::len).sum();
        assert_eq!(target_side, expected, "{layout} target side");
    }
}

#[tokio::test]
async fn test_repeated_matches_appear_once() {
    let mut relationships = asthma_relationships();
    relationships.push(Relationship::new("C1", "CtD", "D1"));
    relationships.push(Relationship::new("C1", "CpD", "D1"));
    relationships.push(Relationship::new("D1", "DaG", "G1"));

    for layout in LAYOUTS {
        let engine = loaded_engine(layout, asthma_entities(), relationships.clone()).await;
        let hood = engine
            .neighborhood("D1", &NeighborhoodFilters::default())
            .await
            .unwrap();
        assert_eq!(hood.get(&Category::Compound), names(&["Albuterol"]).as_slice());
        assert_eq!(hood.get(&Category::Gene), names(&["ADRB2"]).as_slice());
    }
}

#[tokio::test]
async fn test_isolated_anchor_has_empty_groups() {
    for layout in LAYOUTS {
        let engine = loaded_engine(layout, sample_entities(), sample_relationships()).await;
        let hood = engine
            .neighborhood("D3", &NeighborhoodFilters::default())
            .await
            .unwrap();

        assert!(hood.is_empty());
        assert_eq!(hood.groups.len(), 3);
        assert!(hood.groups.values().all(Vec::is_empty));
    }
}

#[tokio::test]
async fn test_missing_anchor_is_not_found() {
    for layout in LAYOUTS {
        let engine = loaded_engine(layout, sample_entities(), sample_relationships()).await;
        let err = engine
            .neighborhood("Disease::DOID:404", &NeighborhoodFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::EntityNotFound(id) if id == "Disease::DOID:404"));
    }
}

#[tokio::test]
async fn test_category_mismatch_omitted() {
    let mut entities = asthma_entities();
    // A gene recorded as treating the disease: matched by code, wrong kind
    entities.push(Entity::new("G9", "Mislabeled", "Gene"));
    let mut relationships = asthma_relationships();
    relationships.push(Relationship::new("G9", "CtD", "D1"));

    for layout in LAYOUTS {
        let engine = loaded_engine(layout, entities.clone(), relationships.clone()).await;
        let hood = engine
            .neighborhood("D1", &NeighborhoodFilters::default())
            .await
            .unwrap();
        assert_eq!(hood.get(&Category::Compound), names(&["Albuterol"]).as_slice());
        assert!(!hood.get(&Category::Gene).contains(&"Mislabeled".to_string()));
    }
}

#[tokio::test]
async fn test_rich_disease_neighborhood() {
    let filters = NeighborhoodFilters::default().with_rule(
        helio_core::graph::FilterRule::outgoing(Category::Disease, &["DrD"]),
    );

    for layout in LAYOUTS {
        let engine = loaded_engine(layout, sample_entities(), sample_relationships()).await;
        let hood = engine.neighborhood("D1", &filters).await.unwrap();

        assert_eq!(
            hood.get(&Category::Compound),
            names(&["Albuterol", "Budesonide"]).as_slice()
        );
        assert_eq!(hood.get(&Category::Gene), names(&["ADRB2", "IL13"]).as_slice());
        assert_eq!(hood.get(&Category::Anatomy), names(&["bronchus", "lung"]).as_slice());
        assert_eq!(hood.get(&Category::Disease), names(&["COPD"]).as_slice());
    }
}

#[tokio::test]
async fn test_unknown_filter_code_rejected() {
    let engine = loaded_engine(Layout::EdgeList, asthma_entities(), asthma_relationships()).await;
    let filters = NeighborhoodFilters::new(vec![helio_core::graph::FilterRule::incoming(
        Category::Compound,
        &["CzD"],
    )]);
    let err = engine.neighborhood("D1", &filters).await.unwrap_err();
    assert!(matches!(err, GraphError::UnknownMetaEdge(_)));
}

#[tokio::test]
async fn test_query_from_background_task() {
    for layout in LAYOUTS {
        let engine = loaded_engine(layout, asthma_entities(), asthma_relationships()).await;
        let worker = engine.clone();
        let handle = tokio::spawn(async move {
            worker
                .neighborhood("D1", &NeighborhoodFilters::default())
                .await
        });

        let hood = handle.await.unwrap().unwrap();
        assert_eq!(hood.get(&Category::Gene), names(&["ADRB2"]).as_slice());
    }
}

#[tokio::test]
async fn test_store_rejects_other_layout_batches() {
    let edge_list = memory_store(Layout::EdgeList).await.unwrap();
    let err = edge_list
        .insert_batch(GraphBatch::Embedded(Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::LayoutMismatch { .. }));

    let embedded = memory_store(Layout::Embedded).await.unwrap();
    let err = embedded
        .insert_batch(GraphBatch::Relationships(Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::LayoutMismatch { .. }));
}

#[tokio::test]
async fn test_store_ping_and_get_entity() {
    for layout in LAYOUTS {
        let engine = loaded_engine(layout, asthma_entities(), asthma_relationships()).await;
        let store: &dyn GraphStore = engine.store().as_ref();
        store.ping().await.unwrap();

        let entity = store.get_entity("C1").await.unwrap().unwrap();
        assert_eq!(entity, Entity::new("C1", "Albuterol", "Compound"));
        assert!(store.get_entity("C404").await.unwrap().is_none());
    }
}
