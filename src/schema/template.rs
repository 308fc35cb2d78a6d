use serde::{Deserialize, Serialize};

use super::action::WorldModelAction;
use super::entity::WorldEntity;

/// A named slot a quest template needs filled with a world entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateQuestProperty {
    pub name: String,
    pub mandatory: bool,
}

impl TemplateQuestProperty {
    pub fn mandatory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mandatory: true,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mandatory: false,
        }
    }
}

/// A conditional narrative text for a template: usable only when every one
/// of its condition properties has been bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateQuestDescription {
    pub conditions: Vec<String>,
    pub text: String,
}

impl TemplateQuestDescription {
    pub fn new(conditions: Vec<String>, text: &str) -> Self {
        Self {
            conditions,
            text: text.to_string(),
        }
    }

    /// True iff every condition is present among `bound` property names.
    pub fn supports_conditions(&self, bound: &[&str]) -> bool {
        self.conditions
            .iter()
            .all(|condition| bound.contains(&condition.as_str()))
    }
}

/// Binding of a template property to a concrete world entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestPropertyValue {
    pub property: TemplateQuestProperty,
    pub entity: WorldEntity,
}

impl QuestPropertyValue {
    pub fn new(property: TemplateQuestProperty, entity: WorldEntity) -> Self {
        Self { property, entity }
    }
}

/// An admissible entity for a property, paired with the world mutations
/// needed to realize the binding.
#[derive(Debug, Clone)]
pub struct PropertyCandidate {
    pub entity: WorldEntity,
    pub actions: Vec<WorldModelAction>,
}

impl PropertyCandidate {
    pub fn new(entity: WorldEntity, actions: Vec<WorldModelAction>) -> Self {
        Self { entity, actions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_equality_uses_name_and_flag() {
        assert_eq!(
            TemplateQuestProperty::mandatory("location"),
            TemplateQuestProperty::mandatory("location")
        );
        assert_ne!(
            TemplateQuestProperty::mandatory("location"),
            TemplateQuestProperty::optional("location")
        );
        assert_ne!(
            TemplateQuestProperty::mandatory("location"),
            TemplateQuestProperty::mandatory("sponsor")
        );
    }

    #[test]
    fn supports_conditions_requires_all() {
        let description = TemplateQuestDescription::new(
            vec!["mandy".to_string(), "sandy".to_string()],
            "Why %mandy loves %sandy...",
        );
        assert!(description.supports_conditions(&["mandy", "sandy", "opti"]));
        assert!(!description.supports_conditions(&["mandy"]));
    }

    #[test]
    fn empty_conditions_always_supported() {
        let description = TemplateQuestDescription::new(Vec::new(), "A plain tale.");
        assert!(description.supports_conditions(&[]));
    }
}
