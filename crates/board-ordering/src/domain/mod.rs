//! Domain module for board ordering
//!
//! Contains commands, plans, errors, invariants and order assignment.

pub mod assignment;
pub mod entities;
pub mod errors;
pub mod invariants;

pub use entities::*;
pub use errors::*;
