//! Realize command implementation
//!
//! Builds a bone graph from a graph document and realizes it into a rig file.

use anyhow::{Context, Result};
use colored::Colorize;
use rigkit_ir::{BoneSpec, MemoryRig, RealizeReport};
use serde::Serialize;
use std::process::ExitCode;

use super::reporting::{print_diagnostics, print_names};
use crate::input::{load_graph, load_rig, write_rig};

/// Machine-readable result of the realize command.
#[derive(Debug, Serialize)]
pub struct RealizeOutput {
    pub rig: String,
    pub out: String,
    pub report: RealizeReport,
    /// Bones left in the graph when `--keep-graph` was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<Vec<BoneSpec>>,
}

/// Run the realize command
///
/// # Arguments
/// * `graph_path` - Path to the graph document
/// * `rig_path` - Rig file to realize into (default: a new empty rig)
/// * `out` - Output rig file path
/// * `keep_graph` - Keep the graph after realizing and include it in JSON output
/// * `json` - Output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 if any bone was rejected
pub fn run(
    graph_path: &str,
    rig_path: Option<&str>,
    out: &str,
    keep_graph: bool,
    json: bool,
) -> Result<ExitCode> {
    if !json {
        println!("{} {}", "Realizing:".cyan().bold(), graph_path);
    }

    let document = load_graph(graph_path)?;
    let mut rig = match rig_path {
        Some(path) => load_rig(path)?,
        None => MemoryRig::new(document.rig_name()),
    };
    let mut graph = document.into_graph()?;

    let report = graph
        .realize(&mut rig, !keep_graph)
        .with_context(|| format!("Failed to realize into rig '{}'", rig.name))?;
    write_rig(&rig, out)?;

    let failed = report.rejected_count() > 0;
    if json {
        let output = RealizeOutput {
            rig: rig.name.clone(),
            out: out.to_string(),
            report,
            graph: keep_graph.then(|| graph.bones().to_vec()),
        };
        let text = serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        print_names("created:", &report.created);
        print_names("updated:", &report.updated);
        print_names("skipped:", &report.skipped);
        print_diagnostics(&report.diagnostics);
        if failed {
            println!(
                "\n{} {} bone(s) rejected; rig written to {}",
                "FAILED".red().bold(),
                report.rejected_count(),
                out
            );
        } else {
            println!("\n{} Rig written to: {}", "SUCCESS".green().bold(), out);
        }
    }

    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
