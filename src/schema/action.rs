use serde::{Deserialize, Serialize};

use super::entity::{EntityId, MetaData, WorldEntity};
use crate::core::graph::EdgeKind;

/// How a single world mutation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldActionKind {
    /// Insert a new entity, its metadata, and any declared edges.
    Create,
    /// Merge a metadata delta into an existing entity.
    Update,
    /// No structural change, but record this metadata delta/observation.
    Keep,
}

/// One unit of world mutation. A `Vec<WorldModelAction>` is the unit handed
/// to `WorldStore::execute`; each item is applied independently, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldModelAction {
    pub kind: WorldActionKind,
    pub entity: WorldEntity,
    pub metadata: MetaData,
    /// Edges to add on `Create`, as (far endpoint, edge kind) pairs.
    pub edges: Vec<(EntityId, EdgeKind)>,
}

impl WorldModelAction {
    pub fn create(entity: WorldEntity, metadata: MetaData) -> Self {
        Self {
            kind: WorldActionKind::Create,
            entity,
            metadata,
            edges: Vec::new(),
        }
    }

    pub fn update(entity: WorldEntity, metadata: MetaData) -> Self {
        Self {
            kind: WorldActionKind::Update,
            entity,
            metadata,
            edges: Vec::new(),
        }
    }

    pub fn keep(entity: WorldEntity, metadata: MetaData) -> Self {
        Self {
            kind: WorldActionKind::Keep,
            entity,
            metadata,
            edges: Vec::new(),
        }
    }

    /// Declares an edge to be added when this `Create` is applied.
    pub fn with_edge(mut self, other: EntityId, kind: EdgeKind) -> Self {
        self.edges.push((other, kind));
        self
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::entity::EntityKind;

    fn location(id: u64) -> WorldEntity {
        WorldEntity::new(EntityId(id), EntityKind::Location { x: 0, y: 0, z: 0 })
    }

    #[test]
    fn create_action_carries_entity() {
        let action = WorldModelAction::create(location(3), MetaData::new());
        assert_eq!(action.kind, WorldActionKind::Create);
        assert_eq!(action.entity_id(), EntityId(3));
        assert!(action.edges.is_empty());
    }

    #[test]
    fn with_edge_appends() {
        let action = WorldModelAction::create(location(3), MetaData::new())
            .with_edge(EntityId(1), EdgeKind::InSystem)
            .with_edge(EntityId(2), EdgeKind::Orbits);
        assert_eq!(action.edges.len(), 2);
        assert_eq!(action.edges[0], (EntityId(1), EdgeKind::InSystem));
    }
}
