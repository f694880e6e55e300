//! rigkit End-to-End Test Infrastructure
//!
//! This crate provides integration tests across the rigkit crates:
//!
//! - Realization: bone graph -> live rig
//! - Mirroring: live rig -> symmetrized rig
//! - Pipeline: graph document -> `rigkit realize` -> `rigkit mirror` -> rig file
//!
//! ## Running Tests
//!
//! ```bash
//! # Run every integration test
//! cargo test -p rigkit-tests
//!
//! # Run the property tests with more cases
//! PROPTEST_CASES=10000 cargo test -p rigkit-tests --test proptest_mirror
//! ```

pub mod fixtures;

pub use fixtures::{arm_chain_graph, field_map, realized, spine_graph, RigFiles, RIG_NAME};
