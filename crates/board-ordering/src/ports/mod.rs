//! Ports module for board ordering
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::BoardOrderingApi;
pub use outbound::{OrderingRepository, ScopeTransaction};
