//! Input/output helpers.
//!
//! - wide table CSV read/write (`table`)
//! - metadata sidecar JSON (`meta`)

pub mod meta;
pub mod table;

pub use meta::*;
pub use table::*;
