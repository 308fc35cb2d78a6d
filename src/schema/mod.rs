//! Plain data types shared across the engine: world entities and metadata,
//! world mutation actions, template property/description records, and the
//! quest record itself.

pub mod action;
pub mod entity;
pub mod quest;
pub mod template;
