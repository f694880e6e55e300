//! Flip command implementation
//!
//! Prints the mirrored form of bone names.

use anyhow::{Context, Result};
use colored::Colorize;
use rigkit_ir::flip_name;
use serde::Serialize;
use std::process::ExitCode;

/// One flipped name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlippedName {
    pub name: String,
    pub flipped: String,
    /// False when the name has no side marker and maps to itself.
    pub has_side: bool,
}

/// Flips every name.
pub fn flip_all(names: &[String]) -> Vec<FlippedName> {
    names
        .iter()
        .map(|name| {
            let flipped = flip_name(name);
            FlippedName {
                has_side: flipped != *name,
                name: name.clone(),
                flipped,
            }
        })
        .collect()
}

/// Run the flip command
///
/// # Returns
/// Exit code: always 0
pub fn run(names: &[String], json: bool) -> Result<ExitCode> {
    let flipped = flip_all(names);
    if json {
        let text = serde_json::to_string_pretty(&flipped).context("Failed to serialize names")?;
        println!("{}", text);
    } else {
        for entry in &flipped {
            if entry.has_side {
                println!("{} -> {}", entry.name, entry.flipped.green());
            } else {
                println!("{} -> {}", entry.name, entry.flipped.dimmed());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
