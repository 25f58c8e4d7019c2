//! # MoniBot Reply Test Suite
//!
//! Cross-crate scenarios that wire the real ledger, content and dispatch
//! services over in-memory and scripted adapters.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs           # Record builders, Scenario harness
//! └── scenarios/
//!     ├── reply_flow.rs     # Per-record outcomes end to end
//!     ├── ledger_props.rs   # Terminal idempotence, retry monotonicity, fetch bounds
//!     ├── generation.rs     # Generative strategy with backoff
//!     └── runtime.rs        # Container, loop and health surface together
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mb-tests
//! cargo bench -p mb-tests
//! ```

pub mod fixtures;
pub mod scenarios;
