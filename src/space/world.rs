//! The shipped "space" domain: a world model whose recipes build agents,
//! locations, and solar systems.
//!
//! Recipes only propose `WorldModelAction`s — callers decide whether and
//! when to `execute` them, so several recipes can be composed into one
//! commit.

use serde::{Deserialize, Serialize};

use crate::core::graph::EdgeKind;
use crate::core::rng::RandomStream;
use crate::core::world::{WorldModel, WorldStore};
use crate::schema::action::WorldModelAction;
use crate::schema::entity::{EntityKind, MetaData, WorldEntity};

const AGENT_GIVEN_NAMES: &[&str] = &[
    "Iras", "Vex", "Talin", "Moa", "Ceres", "Juno", "Orlan", "Sef", "Kira", "Dathan",
];
const AGENT_TITLES: &[&str] = &["Captain", "Commander", "Envoy", "Scout", "Warden"];
const SYSTEM_NAMES: &[&str] = &[
    "Wega", "Altair", "Cygni", "Procyon", "Rigel", "Sarin", "Tauris", "Helike",
];
const PLANET_SUFFIXES: &[&str] = &["Prime", "Minor", "II", "III", "IV"];

/// Coordinate bound for generated locations, in each axis.
const SPACE_EXTENT: i64 = 1000;

/// World model for the space domain.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpaceWorldModel {
    store: WorldStore,
}

impl SpaceWorldModel {
    pub fn new() -> Self {
        Self {
            store: WorldStore::new(),
        }
    }

    pub fn from_store(store: WorldStore) -> Self {
        Self { store }
    }

    /// Proposes a named agent.
    pub fn create_agent(&mut self, rng: &mut RandomStream) -> WorldModelAction {
        let id = self.store.reserve_id();
        let name = format!(
            "{} {}",
            rng.pick(AGENT_TITLES),
            rng.pick(AGENT_GIVEN_NAMES)
        );
        WorldModelAction::create(
            WorldEntity::new(id, EntityKind::Agent { name }),
            MetaData::new(),
        )
    }

    /// Proposes a location at random coordinates.
    pub fn create_location(&mut self, rng: &mut RandomStream) -> WorldModelAction {
        let id = self.store.reserve_id();
        let kind = EntityKind::Location {
            x: rng.range(-SPACE_EXTENT, SPACE_EXTENT),
            y: rng.range(-SPACE_EXTENT, SPACE_EXTENT),
            z: rng.range(-SPACE_EXTENT, SPACE_EXTENT),
        };
        WorldModelAction::create(WorldEntity::new(id, kind), MetaData::new())
    }

    /// Proposes a coherent sub-structure: a solar system, one to three
    /// planets orbiting inside it, and one location, all wired with
    /// `in-system` edges on the dependent actions.
    pub fn create_solar_system(&mut self, rng: &mut RandomStream) -> Vec<WorldModelAction> {
        let system_id = self.store.reserve_id();
        let system_name = rng.pick(SYSTEM_NAMES).to_string();
        let mut actions = vec![WorldModelAction::create(
            WorldEntity::new(
                system_id,
                EntityKind::SolarSystem {
                    name: system_name.clone(),
                },
            ),
            MetaData::new(),
        )];

        let planet_count = rng.range(1, 3);
        for _ in 0..planet_count {
            let planet_id = self.store.reserve_id();
            let name = format!("{} {}", system_name, rng.pick(PLANET_SUFFIXES));
            actions.push(
                WorldModelAction::create(
                    WorldEntity::new(planet_id, EntityKind::Planet { name }),
                    MetaData::new(),
                )
                .with_edge(system_id, EdgeKind::InSystem)
                .with_edge(system_id, EdgeKind::Orbits),
            );
        }

        let location = self
            .create_location(rng)
            .with_edge(system_id, EdgeKind::InSystem);
        actions.push(location);
        actions
    }
}

impl WorldModel for SpaceWorldModel {
    fn store(&self) -> &WorldStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut WorldStore {
        &mut self.store
    }

    /// One solar system and one agent — the minimal starting world.
    fn initialize_new_world(&mut self, rng: &mut RandomStream) -> Vec<WorldModelAction> {
        let mut actions = self.create_solar_system(rng);
        actions.push(self.create_agent(rng));
        actions
    }
}
