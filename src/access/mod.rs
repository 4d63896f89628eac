//! Network-origin access control.
//!
//! Requests are only served to the trusted ingress proxy unless
//! "allow all" is enabled. No credentials or headers are inspected.

mod middleware;
mod policy;

pub use middleware::*;
pub use policy::*;
