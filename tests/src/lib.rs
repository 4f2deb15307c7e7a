//! # Board Ordering Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # In-process transport and board harness
//! └── integration/      # Client ⇄ handler ⇄ repository flows
//!     ├── drag_flows.rs
//!     ├── bulk_flows.rs
//!     └── persistence_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p board-tests
//! cargo test -p board-tests integration::drag_flows
//!
//! # Benchmarks
//! cargo bench -p board-tests
//! ```

pub mod support;
