//! Typed, deduplicated, undirected edges between world entities.
//!
//! The graph is the substrate for relational candidate queries ("locations
//! in this system"). Edges are stored once per unordered id pair; adding a
//! second edge between the same pair merges the type tag in instead.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::schema::entity::EntityId;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cannot create an edge between a node and itself: {0}")]
    SelfEdge(EntityId),
    #[error("cannot combine edges connecting different node pairs")]
    EdgeMismatch,
}

/// Relationship tag carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// A planet or location belongs to a solar system.
    InSystem,
    /// A planet orbits a star.
    Orbits,
    /// An agent resides at a location.
    ResidesAt,
}

/// An undirected edge: an unordered pair of entity ids plus an ordered list
/// of relationship tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    a: EntityId,
    b: EntityId,
    kinds: Vec<EdgeKind>,
}

impl Edge {
    pub fn new(a: EntityId, b: EntityId, kind: EdgeKind) -> Result<Self, GraphError> {
        if a == b {
            return Err(GraphError::SelfEdge(a));
        }
        Ok(Self {
            a,
            b,
            kinds: vec![kind],
        })
    }

    pub fn kinds(&self) -> &[EdgeKind] {
        &self.kinds
    }

    pub fn endpoints(&self) -> (EntityId, EntityId) {
        (self.a, self.b)
    }

    /// The far endpoint as seen from `from`, or `None` when `from` is not
    /// an endpoint of this edge.
    pub fn other(&self, from: EntityId) -> Option<EntityId> {
        if from == self.a {
            Some(self.b)
        } else if from == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn connects(&self, id: EntityId) -> bool {
        id == self.a || id == self.b
    }

    /// Appends the other edge's tags; fails unless both edges connect the
    /// same unordered pair.
    pub fn add_kinds_from(&mut self, other: &Edge) -> Result<(), GraphError> {
        if *self != *other {
            return Err(GraphError::EdgeMismatch);
        }
        self.kinds.extend(other.kinds.iter().copied());
        Ok(())
    }
}

/// Two edges are equal iff they connect the same unordered pair.
impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

impl Eq for Edge {}

/// Total order by endpoint-id sum. Used for deterministic iteration only;
/// it is not consistent with equality.
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.a.0 + self.b.0).cmp(&(other.a.0 + other.b.0))
    }
}

/// The entity relationship graph.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EntityGraph {
    edges: Vec<Edge>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or augments the edge between `a` and `b`. When an edge for
    /// the unordered pair already exists, the new tag is merged in.
    pub fn add_edge(&mut self, a: EntityId, b: EntityId, kind: EdgeKind) -> Result<(), GraphError> {
        let incoming = Edge::new(a, b, kind)?;
        for edge in &mut self.edges {
            if *edge == incoming {
                return edge.add_kinds_from(&incoming);
            }
        }
        self.edges.push(incoming);
        Ok(())
    }

    /// All edges incident to `id`.
    pub fn edges_of(&self, id: EntityId) -> Vec<&Edge> {
        self.edges.iter().filter(|edge| edge.connects(id)).collect()
    }

    /// Far endpoints of every incident edge carrying `kind`.
    pub fn neighbors(&self, id: EntityId, kind: EdgeKind) -> Vec<EntityId> {
        self.edges
            .iter()
            .filter(|edge| edge.connects(id) && edge.kinds.contains(&kind))
            .filter_map(|edge| edge.other(id))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
