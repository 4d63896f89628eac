//! Static asset route table.
//!
//! The asset root is scanned once at startup into an immutable mapping
//! from request path to backing file.

mod table;

pub use table::*;
