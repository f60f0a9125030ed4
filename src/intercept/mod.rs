//! Interception Controller
//!
//! Host-agnostic: the browser wiring lives in `web/`, tests drive the same
//! controller through in-memory hosts.

pub mod controller;
pub mod guard;
pub mod host;
pub mod resume;

pub use controller::*;
pub use guard::*;
pub use host::*;
pub use resume::*;
