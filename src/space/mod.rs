//! The shipped space quest domain: world recipes and quest templates.

pub mod templates;
pub mod world;
