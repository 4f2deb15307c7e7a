//! Application layer: transactional use cases over an [`OrderingRepository`].
//!
//! [`OrderingRepository`]: crate::ports::outbound::OrderingRepository

mod bulk;
mod reorder;
mod service;

pub use bulk::BulkUpdateCoordinator;
pub use reorder::TransactionalReorderExecutor;
pub use service::BoardOrderingService;
