//! # Board Types Crate
//!
//! Single source of truth for every type that crosses the client/server
//! boundary of the ordering engine.
//!
//! ## Design Principles
//!
//! - **Scopes are values**: a [`ScopeKey`] names exactly one order sequence.
//!   Moving a task between columns is a scope change, nothing more.
//! - **Parents are tagged**: [`ParentRef`] replaces presence checks on optional
//!   parent fields; the scope is derived per variant.
//! - **Owner-scoped identity**: payloads never carry an owner id; the
//!   authenticated owner is supplied by the caller of the server API.

pub mod entities;
pub mod errors;
pub mod ipc;
pub mod scope;

pub use entities::*;
pub use errors::*;
pub use ipc::*;
pub use scope::*;
