//! Engine behavior: the random stream, entity graph, world store, template
//! catalog and runtime, property resolver, quest registry, and the
//! top-level quest system.

pub mod catalog;
pub mod engine;
pub mod graph;
pub mod registry;
pub mod resolver;
pub mod rng;
pub mod template;
pub mod world;
