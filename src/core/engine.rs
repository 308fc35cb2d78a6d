//! The top-level quest system: template selection → property resolution →
//! quest composition → registration, plus the tick loop that drives every
//! quest's lifecycle, and save/restore of the whole simulation state.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::catalog::{Directories, TemplateCatalog, TemplateFactory};
use crate::core::registry::{QuestModelAction, QuestRegistry};
use crate::core::resolver::fill_template;
use crate::core::rng::{RandomStream, RandomStreamState};
use crate::core::template::TemplateError;
use crate::core::world::WorldModel;
use crate::schema::quest::{Quest, QuestChange};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("cannot fulfill mandatory property: {0}")]
    CannotFulfill(String),
    #[error("quest not found: {0}")]
    QuestNotFound(u64),
    #[error("RON serialization error: {0}")]
    RonEncode(#[from] ron::Error),
    #[error("RON deserialization error: {0}")]
    RonDecode(#[from] ron::error::SpannedError),
    #[error("binary serialization error: {0}")]
    BinaryEncode(#[from] rmp_serde::encode::Error),
    #[error("binary deserialization error: {0}")]
    BinaryDecode(#[from] rmp_serde::decode::Error),
    #[error("save data is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// On-disk formats for `save`/`restore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Human-readable RON.
    Ron,
    /// Compact MessagePack.
    Binary,
}

/// Everything a save captures. Template factories are not serialized;
/// they re-register on restore.
#[derive(Debug, Deserialize)]
struct SavedState<W> {
    world: W,
    quests: QuestRegistry,
    rng: RandomStreamState,
    time: u64,
}

/// Borrowed mirror of `SavedState` used on the write side; field names
/// must stay in sync so both formats round-trip.
#[derive(Debug, Serialize)]
struct SavedStateRef<'a, W> {
    world: &'a W,
    quests: &'a QuestRegistry,
    rng: RandomStreamState,
    time: u64,
}

/// The quest engine. Owns the world model, the template catalog, the quest
/// registry, and the one random stream threaded through everything.
pub struct QuestSystem<W: WorldModel> {
    rng: RandomStream,
    catalog: TemplateCatalog<W>,
    world: W,
    quests: QuestRegistry,
    time: u64,
}

/// Builder for a fresh simulation (seed, directories, factories, world).
pub struct QuestSystemBuilder<W: WorldModel> {
    seed: u64,
    dirs: Directories,
    world: W,
    factories: Vec<Box<dyn TemplateFactory<W>>>,
}

impl<W: WorldModel> QuestSystem<W> {
    pub fn builder(world: W) -> QuestSystemBuilder<W> {
        QuestSystemBuilder {
            seed: 0,
            dirs: Directories::default(),
            world,
            factories: Vec::new(),
        }
    }

    /// Creates one new quest: pick a template, bind its properties against
    /// the world (mutating it), compose the quest, register it at
    /// `Proposed`. A failure partway discards the quest; world effects
    /// already committed remain.
    pub fn create_new_quest(&mut self) -> Result<Quest, EngineError> {
        let template = self.catalog.template_for_new_quest(&mut self.rng)?;
        let values = fill_template(template.as_ref(), &mut self.world, &mut self.rng)?;
        let quest = template.to_quest(&values)?;
        let id = self.quests.register_new(quest, &values, "");
        info!(id, "quest created");
        self.quests
            .quest(id)
            .cloned()
            .ok_or(EngineError::QuestNotFound(id))
    }

    /// Creates `count` new quests, stopping at the first failure.
    pub fn create_new_quests(&mut self, count: usize) -> Result<Vec<Quest>, EngineError> {
        (0..count).map(|_| self.create_new_quest()).collect()
    }

    /// Advances the simulation by `delta` ticks and evaluates every
    /// non-terminal quest once, in ascending id order. Each quest's world
    /// changes are fully applied before the next quest is examined.
    pub fn tick(&mut self, delta: u64) {
        self.time += delta;
        for id in self.quests.tickable_quest_ids() {
            let Some(quest) = self.quests.quest(id) else {
                continue;
            };
            let result = quest
                .logic
                .clone()
                .tick(quest.state, self.time, self.world.store());
            debug!(id, change = ?result.change, "quest ticked");
            self.world.store_mut().execute(&result.world_actions);
            if result.change != QuestChange::Keep {
                self.quests.execute(QuestModelAction {
                    quest_id: id,
                    change: result.change,
                });
            }
        }
    }

    pub fn active_quests(&self) -> Vec<&Quest> {
        self.quests.active_quests()
    }

    pub fn all_quests(&self) -> Vec<&Quest> {
        self.quests.all_quests().collect()
    }

    pub fn quest(&self, id: u64) -> Option<&Quest> {
        self.quests.quest(id)
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn registry(&self) -> &QuestRegistry {
        &self.quests
    }

    pub fn current_time(&self) -> u64 {
        self.time
    }

    /// Swaps the template directory configuration at runtime.
    pub fn change_directories(&mut self, dirs: Directories) {
        self.catalog.change_directories(dirs);
    }

    /// Serializes world, registry, stream seed, and clock.
    pub fn save(&self, format: SaveFormat) -> Result<Vec<u8>, EngineError>
    where
        W: Serialize,
    {
        let state = SavedStateRef {
            world: &self.world,
            quests: &self.quests,
            rng: RandomStreamState::from(&self.rng),
            time: self.time,
        };
        match format {
            SaveFormat::Ron => Ok(ron::to_string(&state)?.into_bytes()),
            SaveFormat::Binary => Ok(rmp_serde::to_vec(&state)?),
        }
    }

    /// Rebuilds a system from saved bytes. Factories re-register here
    /// since they are not part of the save.
    pub fn restore(
        bytes: &[u8],
        format: SaveFormat,
        dirs: Directories,
        factories: Vec<Box<dyn TemplateFactory<W>>>,
    ) -> Result<Self, EngineError>
    where
        W: DeserializeOwned,
    {
        let state: SavedState<W> = match format {
            SaveFormat::Ron => ron::from_str(std::str::from_utf8(bytes)?)?,
            SaveFormat::Binary => rmp_serde::from_slice(bytes)?,
        };
        let mut catalog = TemplateCatalog::new(dirs);
        for factory in factories {
            catalog.register_template_factory(factory);
        }
        Ok(Self {
            rng: RandomStream::from(state.rng),
            catalog,
            world: state.world,
            quests: state.quests,
            time: state.time,
        })
    }
}

impl<W: WorldModel> QuestSystemBuilder<W> {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn directories(mut self, dirs: Directories) -> Self {
        self.dirs = dirs;
        self
    }

    pub fn register_factory(mut self, factory: Box<dyn TemplateFactory<W>>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Builds the system and bootstraps the starting world.
    pub fn build(self) -> QuestSystem<W> {
        let mut rng = RandomStream::new(self.seed);
        let mut catalog = TemplateCatalog::new(self.dirs);
        for factory in self.factories {
            catalog.register_template_factory(factory);
        }
        let mut world = self.world;
        let bootstrap = world.initialize_new_world(&mut rng);
        world.store_mut().execute(&bootstrap);
        QuestSystem {
            rng,
            catalog,
            world,
            quests: QuestRegistry::new(),
            time: 0,
        }
    }
}
