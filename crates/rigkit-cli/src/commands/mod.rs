//! CLI command implementations

pub mod flip;
pub mod mirror;
pub mod realize;

mod reporting;
