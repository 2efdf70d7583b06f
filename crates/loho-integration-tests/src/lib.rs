//! Integration test crate for the LoHo revenue engine.
//!
//! This crate has no library code; it only contains integration tests
//! that exercise full period distributions across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p loho-integration-tests
//! ```
