//! # Adapters Module
//!
//! Implementations of the outbound [`OrderingRepository`] port.
//!
//! - `memory`: copy-on-commit store for tests, with failure injection
//! - `sqlite`: production store on a single SQLite connection
//!
//! [`OrderingRepository`]: crate::ports::outbound::OrderingRepository

mod memory;
mod sqlite;

pub use memory::InMemoryOrderingRepository;
pub use sqlite::SqliteOrderingRepository;
