//! World model: the entity arena, per-entity metadata, the relationship
//! graph, and the batched `execute` mutation interface.
//!
//! Recipes propose `WorldModelAction`s without committing them; `execute`
//! applies a batch. Separating "propose" from "commit" lets the property
//! resolver preview the world cost of a candidate binding before taking it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::graph::EntityGraph;
use crate::schema::action::{WorldActionKind, WorldModelAction};
use crate::schema::entity::{EntityId, MetaData, WorldEntity};

/// Owns every world entity, its metadata, and the entity graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldStore {
    entities: FxHashMap<EntityId, WorldEntity>,
    metadata: FxHashMap<EntityId, MetaData>,
    graph: EntityGraph,
    next_id: u64,
}

impl Default for WorldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldStore {
    pub fn new() -> Self {
        Self {
            entities: FxHashMap::default(),
            metadata: FxHashMap::default(),
            graph: EntityGraph::new(),
            // 0 is the reserved unassigned id.
            next_id: 1,
        }
    }

    /// Hands out the next entity id. Ids are monotone and never reused,
    /// even when the proposed entity is never committed.
    pub fn reserve_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Applies a batch of actions, each independently, in list order.
    /// Returns true iff every action applied. There is no rollback: actions
    /// that applied before a failing one stay applied.
    pub fn execute(&mut self, actions: &[WorldModelAction]) -> bool {
        let mut all_ok = true;
        for action in actions {
            if !self.apply(action) {
                all_ok = false;
            }
        }
        all_ok
    }

    fn apply(&mut self, action: &WorldModelAction) -> bool {
        match action.kind {
            WorldActionKind::Create => {
                let mut entity = action.entity.clone();
                if !entity.id.is_assigned() {
                    entity.id = self.reserve_id();
                }
                if self.entities.contains_key(&entity.id) {
                    warn!(id = entity.id.0, "create rejected: id already in use");
                    return false;
                }
                let id = entity.id;
                debug!(id = id.0, kind = entity.type_tag(), "entity created");
                self.entities.insert(id, entity);
                self.metadata.insert(id, action.metadata.clone());
                let mut edges_ok = true;
                for (other, kind) in &action.edges {
                    if let Err(error) = self.graph.add_edge(id, *other, *kind) {
                        warn!(id = id.0, other = other.0, %error, "edge rejected");
                        edges_ok = false;
                    }
                }
                edges_ok
            }
            WorldActionKind::Update | WorldActionKind::Keep => {
                let id = action.entity.id;
                if !self.entities.contains_key(&id) {
                    warn!(id = id.0, "update rejected: unknown entity");
                    return false;
                }
                self.metadata.entry(id).or_default().merge(&action.metadata);
                true
            }
        }
    }

    /// All entities, in ascending id order.
    pub fn entities(&self) -> Vec<&WorldEntity> {
        let mut all: Vec<&WorldEntity> = self.entities.values().collect();
        all.sort_by_key(|entity| entity.id);
        all
    }

    pub fn entity(&self, id: EntityId) -> Option<&WorldEntity> {
        self.entities.get(&id)
    }

    /// Entities of a given type tag, in ascending id order.
    pub fn entities_of_type(&self, type_tag: &str) -> Vec<&WorldEntity> {
        let mut matching: Vec<&WorldEntity> = self
            .entities
            .values()
            .filter(|entity| entity.type_tag() == type_tag)
            .collect();
        matching.sort_by_key(|entity| entity.id);
        matching
    }

    /// Metadata for `id`; missing entries read as empty (all keys 0).
    pub fn metadata(&self, id: EntityId) -> MetaData {
        self.metadata.get(&id).cloned().unwrap_or_default()
    }

    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

/// Capability interface a quest domain implements on top of the store.
/// Domain-specific creation recipes live on the concrete model type.
pub trait WorldModel {
    fn store(&self) -> &WorldStore;

    fn store_mut(&mut self) -> &mut WorldStore;

    /// Proposes a minimal starting world, used once at simulation start.
    /// The caller decides whether to `execute` it.
    fn initialize_new_world(
        &mut self,
        rng: &mut crate::core::rng::RandomStream,
    ) -> Vec<WorldModelAction>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::EdgeKind;
    use crate::schema::entity::EntityKind;

    fn location(id: EntityId) -> WorldEntity {
        WorldEntity::new(id, EntityKind::Location { x: 0, y: 0, z: 0 })
    }

    #[test]
    fn reserve_id_is_monotone() {
        let mut store = WorldStore::new();
        let first = store.reserve_id();
        let second = store.reserve_id();
        assert!(first.is_assigned());
        assert!(second > first);
    }

    #[test]
    fn create_inserts_entity_metadata_and_edges() {
        let mut store = WorldStore::new();
        let system = store.reserve_id();
        let planet = store.reserve_id();
        let mut meta = MetaData::new();
        meta.set("Size", 7);
        let actions = vec![
            WorldModelAction::create(
                WorldEntity::new(
                    system,
                    EntityKind::SolarSystem {
                        name: "Wega".to_string(),
                    },
                ),
                MetaData::new(),
            ),
            WorldModelAction::create(location(planet), meta)
                .with_edge(system, EdgeKind::InSystem),
        ];
        assert!(store.execute(&actions));
        assert_eq!(store.entity_count(), 2);
        assert_eq!(store.metadata(planet).get("Size"), 7);
        assert_eq!(store.graph().neighbors(planet, EdgeKind::InSystem), vec![system]);
    }

    #[test]
    fn update_merges_metadata() {
        let mut store = WorldStore::new();
        let id = store.reserve_id();
        let mut meta = MetaData::new();
        meta.set("progress", 10);
        store.execute(&[WorldModelAction::create(location(id), meta)]);

        let mut delta = MetaData::new();
        delta.set("progress", 60);
        assert!(store.execute(&[WorldModelAction::update(location(id), delta)]));
        assert_eq!(store.metadata(id).get("progress"), 60);
    }

    #[test]
    fn keep_records_observation() {
        let mut store = WorldStore::new();
        let id = store.reserve_id();
        store.execute(&[WorldModelAction::create(location(id), MetaData::new())]);

        let mut delta = MetaData::new();
        delta.set("explorable", 1);
        assert!(store.execute(&[WorldModelAction::keep(location(id), delta)]));
        assert_eq!(store.metadata(id).get("explorable"), 1);
        assert_eq!(store.entity_count(), 1);
    }

    #[test]
    fn update_of_unknown_entity_fails_without_aborting_batch() {
        let mut store = WorldStore::new();
        let ghost = location(EntityId(99));
        let real = store.reserve_id();
        let mut delta = MetaData::new();
        delta.set("seen", 1);
        let actions = vec![
            WorldModelAction::update(ghost, delta),
            WorldModelAction::create(location(real), MetaData::new()),
        ];
        // Batch reports failure, but the later create still applied.
        assert!(!store.execute(&actions));
        assert!(store.entity(real).is_some());
    }

    #[test]
    fn duplicate_create_fails() {
        let mut store = WorldStore::new();
        let id = store.reserve_id();
        assert!(store.execute(&[WorldModelAction::create(location(id), MetaData::new())]));
        assert!(!store.execute(&[WorldModelAction::create(location(id), MetaData::new())]));
        assert_eq!(store.entity_count(), 1);
    }

    #[test]
    fn create_with_unassigned_id_gets_one() {
        let mut store = WorldStore::new();
        assert!(store.execute(&[WorldModelAction::create(
            location(EntityId::NONE),
            MetaData::new()
        )]));
        assert_eq!(store.entity_count(), 1);
        assert!(store.entities()[0].id.is_assigned());
    }

    #[test]
    fn entities_of_type_filters() {
        let mut store = WorldStore::new();
        let loc = store.reserve_id();
        let agent = store.reserve_id();
        store.execute(&[
            WorldModelAction::create(location(loc), MetaData::new()),
            WorldModelAction::create(
                WorldEntity::new(
                    agent,
                    EntityKind::Agent {
                        name: "Vex".to_string(),
                    },
                ),
                MetaData::new(),
            ),
        ]);
        assert_eq!(store.entities_of_type("location").len(), 1);
        assert_eq!(store.entities_of_type("agent").len(), 1);
        assert!(store.entities_of_type("planet").is_empty());
    }
}
