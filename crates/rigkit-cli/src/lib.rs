//! rigkit CLI library.
//!
//! This crate provides the command implementations behind the `rigkit` binary:
//! loading graph documents and rig files, realizing graphs, and mirroring bones.

pub mod commands;
pub mod input;
