//! Quest registry — owns every quest and its state, enforces legal state
//! transitions, tracks the entities each quest depends on, and logs applied
//! transitions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::schema::entity::EntityId;
use crate::schema::quest::{Quest, QuestChange, QuestState, NO_QUEST_ID};
use crate::schema::template::QuestPropertyValue;

/// One logged (or replayable) state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestModelAction {
    pub quest_id: u64,
    pub change: QuestChange,
}

/// Registry of all quests. `BTreeMap` keys keep iteration (and therefore
/// tick order) ascending by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestRegistry {
    quests: BTreeMap<u64, Quest>,
    quest_states: BTreeMap<u64, QuestState>,
    quest_entities: BTreeMap<u64, BTreeSet<EntityId>>,
    stories: BTreeMap<u64, String>,
    action_history: Vec<QuestModelAction>,
    next_id: u64,
}

impl Default for QuestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestRegistry {
    pub fn new() -> Self {
        Self {
            quests: BTreeMap::new(),
            quest_states: BTreeMap::new(),
            quest_entities: BTreeMap::new(),
            stories: BTreeMap::new(),
            action_history: Vec::new(),
            next_id: NO_QUEST_ID + 1,
        }
    }

    /// Registers a freshly composed quest: assigns the next id, records it
    /// at `Proposed`, and remembers the entities its bindings reference.
    pub fn register_new(
        &mut self,
        quest: Quest,
        values: &[QuestPropertyValue],
        story: &str,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let mut registered = quest;
        registered.id = id;
        registered.state = QuestState::Proposed;

        let entities: BTreeSet<EntityId> =
            values.iter().map(|value| value.entity.id).collect();

        debug!(id, title = %registered.title, "quest registered");
        self.quests.insert(id, registered);
        self.quest_states.insert(id, QuestState::Proposed);
        self.quest_entities.insert(id, entities);
        self.stories.insert(id, story.to_string());
        id
    }

    /// Guarded transition — the sole mutation path for quest state.
    /// Succeeds only when the current state equals `required`; otherwise a
    /// no-op returning false.
    pub fn set_quest_state(&mut self, id: u64, required: QuestState, new: QuestState) -> bool {
        let Some(current) = self.quest_states.get_mut(&id) else {
            return false;
        };
        if *current != required {
            return false;
        }
        *current = new;
        if let Some(quest) = self.quests.get_mut(&id) {
            quest.state = new;
        }
        debug!(id, ?required, ?new, "quest state changed");
        true
    }

    pub fn activate_quest(&mut self, id: u64) -> bool {
        self.set_quest_state(id, QuestState::Proposed, QuestState::Active)
    }

    pub fn succeed_quest(&mut self, id: u64) -> bool {
        self.set_quest_state(id, QuestState::Active, QuestState::Succeeded)
    }

    pub fn fail_quest(&mut self, id: u64) -> bool {
        self.set_quest_state(id, QuestState::Active, QuestState::Failed)
    }

    /// Applies a logged action and appends it to the history, whether or
    /// not the transition took effect (the log is an audit trail of what
    /// was attempted and replayed).
    pub fn execute(&mut self, action: QuestModelAction) -> bool {
        let applied = match action.change {
            QuestChange::Keep => true,
            QuestChange::Activate => self.activate_quest(action.quest_id),
            QuestChange::Succeed => self.succeed_quest(action.quest_id),
            QuestChange::Fail => self.fail_quest(action.quest_id),
        };
        self.action_history.push(action);
        applied
    }

    pub fn quest(&self, id: u64) -> Option<&Quest> {
        self.quests.get(&id)
    }

    pub fn quest_state(&self, id: u64) -> Option<QuestState> {
        self.quest_states.get(&id).copied()
    }

    /// Entities the quest depends on, recorded at registration.
    pub fn quest_entities(&self, id: u64) -> Option<&BTreeSet<EntityId>> {
        self.quest_entities.get(&id)
    }

    pub fn story(&self, id: u64) -> Option<&str> {
        self.stories.get(&id).map(String::as_str)
    }

    /// Every quest, ascending by id.
    pub fn all_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub fn quest_count(&self) -> usize {
        self.quests.len()
    }

    pub fn active_quests(&self) -> Vec<&Quest> {
        self.quests
            .values()
            .filter(|quest| quest.state == QuestState::Active)
            .collect()
    }

    /// Ids of quests the engine should tick, in ascending order: everything
    /// not yet terminal.
    pub fn tickable_quest_ids(&self) -> Vec<u64> {
        self.quest_states
            .iter()
            .filter(|(_, state)| !state.is_terminal())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn action_history(&self) -> &[QuestModelAction] {
        &self.action_history
    }
}
