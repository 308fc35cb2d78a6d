use serde::{Deserialize, Serialize};

use super::action::WorldModelAction;
use super::entity::EntityId;
use crate::core::world::WorldStore;

/// Lifecycle state of a quest. Transitions are monotone along
/// `Proposed → Active → {Succeeded, Failed}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestState {
    Proposed,
    Active,
    Succeeded,
    Failed,
}

impl QuestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// The state-change instruction a tick reports for its quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestChange {
    Keep,
    Activate,
    Succeed,
    Fail,
}

/// Result of ticking one quest: a state-change instruction plus the world
/// mutations the quest wants applied.
#[derive(Debug, Clone)]
pub struct QuestTickResult {
    pub change: QuestChange,
    pub world_actions: Vec<WorldModelAction>,
}

impl QuestTickResult {
    pub fn keep() -> Self {
        Self {
            change: QuestChange::Keep,
            world_actions: Vec::new(),
        }
    }

    pub fn change(change: QuestChange) -> Self {
        Self {
            change,
            world_actions: Vec::new(),
        }
    }
}

/// Per-variant lifecycle behavior, as a closed tagged enum so quests stay
/// serializable. New quest kinds add a variant here and a template that
/// builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestLogic {
    /// Succeeds once the target entity's `"progress"` metadata reaches the
    /// threshold; fails when the target is flagged `"unreachable"`.
    ExploreRegion { target: EntityId, threshold: i64 },
}

impl QuestLogic {
    /// Evaluates one simulation step. Pure with respect to the world except
    /// for the actions in the returned result — the caller applies them.
    pub fn tick(&self, state: QuestState, _time: u64, world: &WorldStore) -> QuestTickResult {
        match self {
            Self::ExploreRegion { target, threshold } => {
                if state == QuestState::Proposed {
                    // Auto-accept: progress counts only once active.
                    return QuestTickResult::change(QuestChange::Activate);
                }
                let meta = world.metadata(*target);
                if meta.get("progress") >= *threshold {
                    QuestTickResult::change(QuestChange::Succeed)
                } else if meta.get("unreachable") != 0 {
                    QuestTickResult::change(QuestChange::Fail)
                } else {
                    QuestTickResult::keep()
                }
            }
        }
    }
}

/// An accepted mission. Immutable after creation: the registry clones it
/// with a fresh id on registration and owns the state from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub state: QuestState,
    pub logic: QuestLogic,
}

/// Reserved quest id for not-yet-registered quests.
pub const NO_QUEST_ID: u64 = 0;

impl Quest {
    /// Builds a freshly proposed quest, id unassigned until registration.
    pub fn proposed(title: String, description: String, logic: QuestLogic) -> Self {
        Self {
            id: NO_QUEST_ID,
            title,
            description,
            state: QuestState::Proposed,
            logic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::action::WorldModelAction;
    use crate::schema::entity::{EntityId, EntityKind, MetaData, WorldEntity};

    fn world_with_location(progress: i64, unreachable: i64) -> (WorldStore, EntityId) {
        let mut store = WorldStore::new();
        let id = store.reserve_id();
        let mut meta = MetaData::new();
        meta.set("progress", progress).set("unreachable", unreachable);
        let entity = WorldEntity::new(id, EntityKind::Location { x: 0, y: 0, z: 0 });
        assert!(store.execute(&[WorldModelAction::create(entity, meta)]));
        (store, id)
    }

    #[test]
    fn proposed_quest_activates() {
        let (store, target) = world_with_location(0, 0);
        let logic = QuestLogic::ExploreRegion { target, threshold: 100 };
        let result = logic.tick(QuestState::Proposed, 1, &store);
        assert_eq!(result.change, QuestChange::Activate);
        assert!(result.world_actions.is_empty());
    }

    #[test]
    fn below_threshold_keeps() {
        let (store, target) = world_with_location(50, 0);
        let logic = QuestLogic::ExploreRegion { target, threshold: 100 };
        let result = logic.tick(QuestState::Active, 1, &store);
        assert_eq!(result.change, QuestChange::Keep);
        assert!(result.world_actions.is_empty());
    }

    #[test]
    fn at_threshold_succeeds() {
        let (store, target) = world_with_location(100, 0);
        let logic = QuestLogic::ExploreRegion { target, threshold: 100 };
        let result = logic.tick(QuestState::Active, 1, &store);
        assert_eq!(result.change, QuestChange::Succeed);
        assert!(result.world_actions.is_empty());
    }

    #[test]
    fn unreachable_target_fails() {
        let (store, target) = world_with_location(50, 1);
        let logic = QuestLogic::ExploreRegion { target, threshold: 100 };
        let result = logic.tick(QuestState::Active, 1, &store);
        assert_eq!(result.change, QuestChange::Fail);
    }

    #[test]
    fn consecutive_keeps_without_progress() {
        let (store, target) = world_with_location(10, 0);
        let logic = QuestLogic::ExploreRegion { target, threshold: 100 };
        assert_eq!(logic.tick(QuestState::Active, 1, &store).change, QuestChange::Keep);
        assert_eq!(logic.tick(QuestState::Active, 2, &store).change, QuestChange::Keep);
    }

    #[test]
    fn terminal_states() {
        assert!(QuestState::Succeeded.is_terminal());
        assert!(QuestState::Failed.is_terminal());
        assert!(!QuestState::Active.is_terminal());
        assert!(!QuestState::Proposed.is_terminal());
    }
}
