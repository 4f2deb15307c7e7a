//! IPC layer: wire payload handling for the ordering service.

pub mod handler;

pub use handler::{decode_move, BoardOrderingHandler};
