//! Template catalog — registered factories, directory/mod-override
//! resolution, and deterministic selection of the next quest template.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::core::rng::RandomStream;
use crate::core::template::{QuestTemplate, TemplateError};
use crate::core::world::WorldModel;

/// Where template definition files live. A mod directory shadows the base
/// directory per file. With no directories configured, factories fall back
/// to their built-in definitions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Directories {
    pub template_dir: Option<PathBuf>,
    pub mod_dir: Option<PathBuf>,
}

impl Directories {
    /// Resolves a factory-relative file name against the configured
    /// directories, preferring a mod override when it exists on disk.
    pub fn resolve(&self, file: &str) -> Option<PathBuf> {
        if let Some(mod_dir) = &self.mod_dir {
            let candidate = mod_dir.join(file);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        self.template_dir.as_ref().map(|dir| dir.join(file))
    }
}

/// Parses a domain's template definitions into `QuestTemplate` instances
/// keyed by string. Loading is lazy; `set_directories` drops any cache.
pub trait TemplateFactory<W: WorldModel> {
    /// Keys of every template this factory can create, in a stable order.
    fn template_keys(&mut self) -> Result<Vec<String>, TemplateError>;

    /// Creates the template for `key`; unknown keys fail.
    fn create_template(&mut self, key: &str) -> Result<Box<dyn QuestTemplate<W>>, TemplateError>;

    /// Applies a directory configuration and invalidates cached templates.
    fn set_directories(&mut self, dirs: &Directories);
}

/// Registry of template factories; supplies "the next quest template" from
/// a shared random stream.
pub struct TemplateCatalog<W: WorldModel> {
    factories: Vec<Box<dyn TemplateFactory<W>>>,
    dirs: Directories,
}

impl<W: WorldModel> TemplateCatalog<W> {
    pub fn new(dirs: Directories) -> Self {
        Self {
            factories: Vec::new(),
            dirs,
        }
    }

    /// Registers a factory under the catalog's current directory
    /// configuration.
    pub fn register_template_factory(&mut self, mut factory: Box<dyn TemplateFactory<W>>) {
        factory.set_directories(&self.dirs);
        self.factories.push(factory);
    }

    /// Swaps the directory configuration; every factory drops its cached
    /// template set, so stale definitions are never served.
    pub fn change_directories(&mut self, dirs: Directories) {
        self.dirs = dirs;
        for factory in &mut self.factories {
            factory.set_directories(&self.dirs);
        }
    }

    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    /// Deterministically selects a template for a new quest. The same seed
    /// and call order always pick the same template.
    pub fn template_for_new_quest(
        &mut self,
        rng: &mut RandomStream,
    ) -> Result<Box<dyn QuestTemplate<W>>, TemplateError> {
        let mut choices: Vec<(usize, String)> = Vec::new();
        for (index, factory) in self.factories.iter_mut().enumerate() {
            for key in factory.template_keys()? {
                choices.push((index, key));
            }
        }
        if choices.is_empty() {
            return Err(TemplateError::NoTemplates);
        }
        let (factory_index, key) = rng.pick(&choices).clone();
        debug!(%key, "template selected");
        self.factories[factory_index].create_template(&key)
    }
}
