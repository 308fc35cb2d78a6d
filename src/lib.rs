//! Quest Forge — procedural quest generation for games.
//!
//! Generates missions from declarative templates by binding each template's
//! properties to entities drawn from a simulated world, then drives every
//! accepted quest through a tick-based lifecycle until it succeeds or
//! fails. Replaying the same seed through the same call sequence yields the
//! same quests.

pub mod core;
pub mod schema;
pub mod space;
