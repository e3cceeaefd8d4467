//! Domain types for the lesson catalog.
//!
//! - Resource: a normalized lesson record
//! - NavItem: a navigable category entry

pub mod nav;
pub mod resource;

// Re-export commonly used types
pub use nav::{NavItem, HOME_ID};
pub use resource::{Level, LevelBadge, MediaKind, Resource, ResourceId};
