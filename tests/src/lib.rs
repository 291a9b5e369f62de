//! # HQSL Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (card codec, verification)
//! └── src/
//!     ├── fixtures.rs   # Root and signer keys generated at fixed instants
//!     ├── hkp.rs        # In-process HKP key directory (axum)
//!     └── integration/  # Card → signature → key directory → verdict
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hqsl-tests
//! cargo bench -p hqsl-tests
//! ```

pub mod hkp;
pub mod integration;
