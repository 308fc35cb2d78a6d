//! Quest template runtime — the template capability trait, best-fit
//! description selection, and `%name` placeholder rendering.

use thiserror::Error;
use tracing::trace;

use crate::core::rng::RandomStream;
use crate::core::world::WorldModel;
use crate::schema::quest::Quest;
use crate::schema::template::{
    PropertyCandidate, QuestPropertyValue, TemplateQuestDescription, TemplateQuestProperty,
};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unknown template key: {0}")]
    UnknownKey(String),
    #[error("no templates available")]
    NoTemplates,
    #[error("mandatory property has no bound value: {0}")]
    MissingMandatory(String),
    #[error("no description matches the bound properties")]
    NoDescription,
    #[error("unresolved placeholder in quest text: %{0}")]
    UnresolvedPlaceholder(String),
}

/// A parameterized quest blueprint. Variants supply candidate search and
/// quest composition; the shared selection/rendering logic lives in the
/// free functions below.
///
/// Generic over the world model type so a variant can use its domain's
/// creation recipes while the catalog and resolver stay domain-agnostic.
pub trait QuestTemplate<W: WorldModel> {
    fn title(&self) -> &str;

    /// Declared properties, in resolution order.
    fn properties(&self) -> &[TemplateQuestProperty];

    fn descriptions(&self) -> &[TemplateQuestDescription];

    /// Admissible candidates for one property, each paired with the world
    /// actions needed to realize the binding. Nothing is committed here;
    /// the resolver executes the actions.
    fn property_candidates(
        &self,
        property: &TemplateQuestProperty,
        world: &mut W,
        rng: &mut RandomStream,
    ) -> Result<Vec<PropertyCandidate>, TemplateError>;

    /// Composes the immutable quest record from bound property values.
    fn to_quest(&self, values: &[QuestPropertyValue]) -> Result<Quest, TemplateError>;
}

/// Fails unless every mandatory property in `properties` has a binding.
pub fn check_mandatory_bound(
    properties: &[TemplateQuestProperty],
    values: &[QuestPropertyValue],
) -> Result<(), TemplateError> {
    for property in properties.iter().filter(|p| p.mandatory) {
        let bound = values.iter().any(|value| value.property.name == property.name);
        if !bound {
            return Err(TemplateError::MissingMandatory(property.name.clone()));
        }
    }
    Ok(())
}

/// Picks the best-fitting description for the bound property set: among the
/// descriptions whose conditions are all bound, the one with the largest
/// condition count wins; ties go to declaration order.
pub fn best_description<'a>(
    descriptions: &'a [TemplateQuestDescription],
    values: &[QuestPropertyValue],
) -> Result<&'a TemplateQuestDescription, TemplateError> {
    let bound: Vec<&str> = values
        .iter()
        .map(|value| value.property.name.as_str())
        .collect();
    let mut best: Option<&TemplateQuestDescription> = None;
    for description in descriptions {
        if !description.supports_conditions(&bound) {
            continue;
        }
        let beats = match best {
            Some(current) => description.conditions.len() > current.conditions.len(),
            None => true,
        };
        if beats {
            best = Some(description);
        }
    }
    best.ok_or(TemplateError::NoDescription)
}

/// Substitutes every `%name` placeholder with the bound entity's
/// human-readable form. `%%` renders a literal percent sign.
pub fn render(text: &str, values: &[QuestPropertyValue]) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            output.push(ch);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            output.push('%');
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        let value = values
            .iter()
            .find(|value| value.property.name == name)
            .ok_or_else(|| TemplateError::UnresolvedPlaceholder(name.clone()))?;
        output.push_str(&value.entity.describe());
    }
    Ok(output)
}

/// Shared `to_quest` front half: validates mandatory bindings, selects the
/// description, and renders description and title text.
pub fn compose_texts(
    title: &str,
    properties: &[TemplateQuestProperty],
    descriptions: &[TemplateQuestDescription],
    values: &[QuestPropertyValue],
) -> Result<(String, String), TemplateError> {
    check_mandatory_bound(properties, values)?;
    let description = best_description(descriptions, values)?;
    trace!(conditions = description.conditions.len(), "description selected");
    let rendered_description = render(&description.text, values)?;
    let rendered_title = render(title, values)?;
    Ok((rendered_title, rendered_description))
}
