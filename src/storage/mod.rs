//! Storage layer for the zone editor.
//!
//! The zone document is a single JSON file replaced atomically on save.

mod zones;

pub use zones::{empty_collection, ZoneStore};
