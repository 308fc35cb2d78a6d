//! Space quest templates — RON definition parsing, the template factory,
//! and the `explore_region` template variant.

use serde::Deserialize;

use crate::core::catalog::{Directories, TemplateFactory};
use crate::core::rng::RandomStream;
use crate::core::template::{compose_texts, QuestTemplate, TemplateError};
use crate::core::world::WorldModel;
use crate::schema::action::WorldModelAction;
use crate::schema::entity::MetaData;
use crate::schema::quest::{Quest, QuestLogic};
use crate::schema::template::{
    PropertyCandidate, QuestPropertyValue, TemplateQuestDescription, TemplateQuestProperty,
};
use crate::space::world::SpaceWorldModel;

/// Progress a target's `"progress"` counter must reach for an
/// `explore_region` quest to succeed.
pub const EXPLORE_PROGRESS_THRESHOLD: i64 = 100;

/// Built-in definitions, used when no template directory is configured.
const EMBEDDED_TEMPLATES: &str = include_str!("../../data/space_templates.ron");

const TEMPLATE_FILE: &str = "space_templates.ron";

// RON deserialization helpers — the file shape differs from the internal
// types, so intermediate structs bridge the two.

#[derive(Debug, Deserialize)]
struct RonProperty {
    name: String,
    mandatory: bool,
}

#[derive(Debug, Deserialize)]
struct RonDescription {
    conditions: Vec<String>,
    text: String,
}

#[derive(Debug, Deserialize)]
struct RonTemplateDef {
    key: String,
    title: String,
    properties: Vec<RonProperty>,
    descriptions: Vec<RonDescription>,
}

#[derive(Debug, Clone)]
struct TemplateDef {
    key: String,
    title: String,
    properties: Vec<TemplateQuestProperty>,
    descriptions: Vec<TemplateQuestDescription>,
}

fn parse_definitions(input: &str) -> Result<Vec<TemplateDef>, TemplateError> {
    let raw: Vec<RonTemplateDef> = ron::from_str(input)?;
    Ok(raw
        .into_iter()
        .map(|def| TemplateDef {
            key: def.key,
            title: def.title,
            properties: def
                .properties
                .into_iter()
                .map(|p| TemplateQuestProperty {
                    name: p.name,
                    mandatory: p.mandatory,
                })
                .collect(),
            descriptions: def
                .descriptions
                .into_iter()
                .map(|d| TemplateQuestDescription {
                    conditions: d.conditions,
                    text: d.text,
                })
                .collect(),
        })
        .collect())
}

/// Parses space quest template definitions and creates template instances
/// by key. Definitions load lazily and are cached until the directory
/// configuration changes.
#[derive(Debug, Default)]
pub struct SpaceTemplateFactory {
    dirs: Directories,
    cache: Option<Vec<TemplateDef>>,
}

impl SpaceTemplateFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn definitions(&mut self) -> Result<&[TemplateDef], TemplateError> {
        if self.cache.is_none() {
            let defs = match self.dirs.resolve(TEMPLATE_FILE) {
                Some(path) => parse_definitions(&std::fs::read_to_string(path)?)?,
                None => parse_definitions(EMBEDDED_TEMPLATES)?,
            };
            self.cache = Some(defs);
        }
        Ok(self.cache.as_deref().unwrap_or_default())
    }

    /// Creates the template instance for `key`.
    pub fn build_template(
        &mut self,
        key: &str,
    ) -> Result<Box<dyn QuestTemplate<SpaceWorldModel>>, TemplateError> {
        let def = self
            .definitions()?
            .iter()
            .find(|def| def.key == key)
            .cloned()
            .ok_or_else(|| TemplateError::UnknownKey(key.to_string()))?;
        match def.key.as_str() {
            "explore_region" => Ok(Box::new(ExploreRegionTemplate {
                title: def.title,
                properties: def.properties,
                descriptions: def.descriptions,
            })),
            other => Err(TemplateError::UnknownKey(other.to_string())),
        }
    }
}

impl TemplateFactory<SpaceWorldModel> for SpaceTemplateFactory {
    fn template_keys(&mut self) -> Result<Vec<String>, TemplateError> {
        Ok(self.definitions()?.iter().map(|def| def.key.clone()).collect())
    }

    fn create_template(
        &mut self,
        key: &str,
    ) -> Result<Box<dyn QuestTemplate<SpaceWorldModel>>, TemplateError> {
        self.build_template(key)
    }

    fn set_directories(&mut self, dirs: &Directories) {
        self.dirs = dirs.clone();
        self.cache = None;
    }
}

/// "Explore a region of space": the mandatory target is a location; a
/// containing solar system and a sponsoring agent enrich the description
/// when bound.
pub struct ExploreRegionTemplate {
    title: String,
    properties: Vec<TemplateQuestProperty>,
    descriptions: Vec<TemplateQuestDescription>,
}

impl ExploreRegionTemplate {
    /// Picks an existing entity of `type_tag`, or proposes the given
    /// creation recipe when the world has none yet.
    fn existing_or_create(
        world: &mut SpaceWorldModel,
        rng: &mut RandomStream,
        type_tag: &str,
        create: impl FnOnce(&mut SpaceWorldModel, &mut RandomStream) -> Vec<WorldModelAction>,
    ) -> PropertyCandidate {
        let existing: Vec<_> = world
            .store()
            .entities_of_type(type_tag)
            .into_iter()
            .cloned()
            .collect();
        if existing.is_empty() {
            let actions = create(world, rng);
            // The recipe's first action for the requested type carries the
            // candidate entity.
            let entity = actions
                .iter()
                .find(|action| action.entity.type_tag() == type_tag)
                .map(|action| action.entity.clone())
                .unwrap_or_else(|| actions[0].entity.clone());
            PropertyCandidate::new(entity, actions)
        } else {
            PropertyCandidate::new(rng.pick(&existing).clone(), Vec::new())
        }
    }
}

impl QuestTemplate<SpaceWorldModel> for ExploreRegionTemplate {
    fn title(&self) -> &str {
        &self.title
    }

    fn properties(&self) -> &[TemplateQuestProperty] {
        &self.properties
    }

    fn descriptions(&self) -> &[TemplateQuestDescription] {
        &self.descriptions
    }

    fn property_candidates(
        &self,
        property: &TemplateQuestProperty,
        world: &mut SpaceWorldModel,
        rng: &mut RandomStream,
    ) -> Result<Vec<PropertyCandidate>, TemplateError> {
        let candidate = match property.name.as_str() {
            "location" => {
                let mut candidate =
                    Self::existing_or_create(world, rng, "location", |world, rng| {
                        vec![world.create_location(rng)]
                    });
                // Mark the chosen location as explorable: a plain observation
                // for an existing entity, an update for a freshly proposed one.
                let mut delta = MetaData::new();
                delta.set("explorable", 1);
                let marker = if candidate.actions.is_empty() {
                    WorldModelAction::keep(candidate.entity.clone(), delta)
                } else {
                    WorldModelAction::update(candidate.entity.clone(), delta)
                };
                candidate.actions.push(marker);
                candidate
            }
            "solar_system" => Self::existing_or_create(world, rng, "solar_system", |world, rng| {
                world.create_solar_system(rng)
            }),
            "sponsor" => Self::existing_or_create(world, rng, "agent", |world, rng| {
                vec![world.create_agent(rng)]
            }),
            _ => return Ok(Vec::new()),
        };
        Ok(vec![candidate])
    }

    fn to_quest(&self, values: &[QuestPropertyValue]) -> Result<Quest, TemplateError> {
        let (title, description) =
            compose_texts(&self.title, &self.properties, &self.descriptions, values)?;
        let target = values
            .iter()
            .find(|value| value.property.name == "location")
            .map(|value| value.entity.id)
            .ok_or_else(|| TemplateError::MissingMandatory("location".to_string()))?;
        Ok(Quest::proposed(
            title,
            description,
            QuestLogic::ExploreRegion {
                target,
                threshold: EXPLORE_PROGRESS_THRESHOLD,
            },
        ))
    }
}
