use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Newtype wrapper for world entity IDs.
///
/// IDs are assigned monotonically by the world store. `EntityId::NONE` (0)
/// marks an entity that has not been persisted yet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Reserved id for not-yet-persisted entities.
    pub const NONE: EntityId = EntityId(0);

    /// Returns true if this id refers to a persisted entity.
    pub fn is_assigned(&self) -> bool {
        *self != Self::NONE
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of thing an entity is. The engine itself only cares about the
/// type tag and the human-readable form; the variants belong to the shipped
/// space domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Agent { name: String },
    Location { x: i64, y: i64, z: i64 },
    SolarSystem { name: String },
    Planet { name: String },
}

impl EntityKind {
    /// Stable type tag used for relational queries and edge walks.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Agent { .. } => "agent",
            Self::Location { .. } => "location",
            Self::SolarSystem { .. } => "solar_system",
            Self::Planet { .. } => "planet",
        }
    }

    /// Human-readable form substituted into quest text.
    pub fn describe(&self) -> String {
        match self {
            Self::Agent { name } | Self::SolarSystem { name } | Self::Planet { name } => {
                name.clone()
            }
            Self::Location { x, y, z } => format!("({}, {}, {})", x, y, z),
        }
    }
}

/// A persistent object in the simulated world. Owned by the world store;
/// every other holder keeps an `EntityId` back-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEntity {
    pub id: EntityId,
    pub kind: EntityKind,
}

impl WorldEntity {
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self { id, kind }
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    pub fn describe(&self) -> String {
        self.kind.describe()
    }
}

/// Integer key/value metadata attached to an entity — the substrate for
/// quest-progress counters and observation flags.
///
/// A `BTreeMap` keeps serialization and iteration order stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MetaData {
    values: BTreeMap<String, i64>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, or 0 when the key was never set.
    pub fn get(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    /// Sets a value, returning `&mut self` so calls can chain.
    pub fn set(&mut self, key: &str, value: i64) -> &mut Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Overlays every entry of `delta` onto this map.
    pub fn merge(&mut self, delta: &MetaData) {
        for (key, value) in &delta.values {
            self.values.insert(key.clone(), *value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
