//! HTTP front for the zone editor.
//!
//! Serves the editor page and assets, and exposes the zone document
//! for reading and saving.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;
pub use types::Reply;
