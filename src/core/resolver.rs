//! Property resolver — fills a template's properties with admissible world
//! entities, committing each binding's world actions before the next
//! property is examined.
//!
//! Greedy and single-pass: once a property is bound its world-side effects
//! are permanent for the rest of the resolution. No backtracking, no
//! rollback.

use tracing::{trace, warn};

use crate::core::engine::EngineError;
use crate::core::rng::RandomStream;
use crate::core::template::QuestTemplate;
use crate::core::world::WorldModel;
use crate::schema::template::QuestPropertyValue;

/// Binds every declared property (mandatory and optional), in declaration
/// order. Later properties observe the world mutations committed for
/// earlier ones.
pub fn fill_template<W: WorldModel>(
    template: &dyn QuestTemplate<W>,
    world: &mut W,
    rng: &mut RandomStream,
) -> Result<Vec<QuestPropertyValue>, EngineError> {
    fill(template, world, rng, true)
}

/// Binds only the mandatory properties; optional ones are skipped entirely
/// (no candidates requested), which never fails template completion.
pub fn fill_template_mandatory<W: WorldModel>(
    template: &dyn QuestTemplate<W>,
    world: &mut W,
    rng: &mut RandomStream,
) -> Result<Vec<QuestPropertyValue>, EngineError> {
    fill(template, world, rng, false)
}

fn fill<W: WorldModel>(
    template: &dyn QuestTemplate<W>,
    world: &mut W,
    rng: &mut RandomStream,
    include_optional: bool,
) -> Result<Vec<QuestPropertyValue>, EngineError> {
    let properties: Vec<_> = template.properties().to_vec();
    let mut values = Vec::with_capacity(properties.len());

    for property in &properties {
        if !property.mandatory && !include_optional {
            continue;
        }
        let candidates = template.property_candidates(property, world, rng)?;
        if candidates.is_empty() {
            if property.mandatory {
                return Err(EngineError::CannotFulfill(property.name.clone()));
            }
            continue;
        }
        let mut pending = Vec::new();
        for candidate in candidates {
            trace!(
                property = %property.name,
                entity = candidate.entity.id.0,
                "property bound"
            );
            values.push(QuestPropertyValue::new(
                property.clone(),
                candidate.entity.clone(),
            ));
            pending.extend(candidate.actions);
        }
        // Commit before the next property so its candidate query sees the
        // realized binding.
        if !world.store_mut().execute(&pending) {
            warn!(property = %property.name, "candidate actions did not fully apply");
        }
    }
    Ok(values)
}
