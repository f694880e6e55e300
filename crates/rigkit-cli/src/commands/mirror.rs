//! Mirror command implementation
//!
//! Mirrors selected bones of a rig file and writes the result.

use anyhow::{Context, Result};
use colored::Colorize;
use rigkit_mirror::{mirror_bones_with, MirrorOptions, MirrorReport};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::process::ExitCode;

use super::reporting::{print_diagnostics, print_names, print_rejections};
use crate::input::{load_rig, write_rig};

/// Machine-readable result of the mirror command.
#[derive(Debug, Serialize)]
pub struct MirrorOutput {
    pub rig: String,
    pub out: String,
    pub options: MirrorOptions,
    pub report: MirrorReport,
}

/// Reads mirror options from a JSON file.
fn load_options(path: &str) -> Result<MirrorOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse options: {}", path))
}

/// Run the mirror command
///
/// # Arguments
/// * `rig_path` - Path to the rig file
/// * `bones` - Names of the bones to mirror
/// * `split` - Allow splitting constraints of self-mirroring bones
/// * `options_path` - Optional JSON file with [`MirrorOptions`]
/// * `out` - Output rig file path (default: overwrite the input)
/// * `json` - Output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 if any item was rejected
pub fn run(
    rig_path: &str,
    bones: &[String],
    split: bool,
    options_path: Option<&str>,
    out: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    if !json {
        println!("{} {}", "Mirroring:".cyan().bold(), bones.join(", "));
    }

    let mut options = match options_path {
        Some(path) => load_options(path)?,
        None => MirrorOptions::default(),
    };
    options.allow_split |= split;

    let mut rig = load_rig(rig_path)?;
    let selection: BTreeSet<String> = bones.iter().cloned().collect();
    let report = mirror_bones_with(&mut rig, &selection, &options)
        .with_context(|| format!("Failed to mirror bones of '{}'", rig_path))?;

    let out = out.unwrap_or(rig_path);
    write_rig(&rig, out)?;

    let failed = !report.rejected.is_empty();
    if json {
        let output = MirrorOutput {
            rig: rig.name.clone(),
            out: out.to_string(),
            options,
            report,
        };
        let text = serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        print_names("mirrored:", &report.mirrored);
        print_names("created:", &report.created);
        for split in &report.split {
            println!(
                "  {} {}: {} -> {}",
                "split:".dimmed(),
                split.bone,
                split.original,
                split.mirrored
            );
        }
        print_rejections(&report.rejected);
        print_diagnostics(&report.diagnostics);
        if failed {
            println!(
                "\n{} {} item(s) rejected; rig written to {}",
                "FAILED".red().bold(),
                report.rejected.len(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use rigkit_ir::live::{Constraint, ConstraintData, ConstraintKind};
    use rigkit_ir::MemoryRig;
    use tempfile::tempdir;

    fn arm_rig() -> MemoryRig {
        let mut rig = MemoryRig::new("RIG").with_bone("Arm.L", [0.5, 0.0, 1.0], [1.5, 0.0, 1.0]);
        let mut limit = Constraint::new(ConstraintKind::LimitLocation);
        if let ConstraintData::LimitLocation(l) = &mut limit.data {
            l.min[0] = -1.0;
            l.max[0] = 2.0;
        }
        rig.record_mut("Arm.L")
            .unwrap()
            .pose
            .constraints
            .push(limit);
        rig
    }

    #[test]
    fn test_mirror_to_output_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("rig.json");
        let out = dir.path().join("mirrored.json");
        write_rig(&arm_rig(), input.to_str().unwrap()).unwrap();

        let code = run(
            input.to_str().unwrap(),
            &["Arm.L".to_string()],
            false,
            None,
            Some(out.to_str().unwrap()),
            true,
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let rig = load_rig(out.to_str().unwrap()).unwrap();
        let arm_r = rig.record("Arm.R").unwrap();
        let ConstraintData::LimitLocation(l) = &arm_r.pose.constraints[0].data else {
            panic!("expected a limit-location constraint");
        };
        assert_eq!(l.min[0], -2.0);
        assert_eq!(l.max[0], 1.0);

        // The input file is left alone.
        assert!(load_rig(input.to_str().unwrap()).unwrap().record("Arm.R").is_none());
    }

    #[test]
    fn test_unknown_bone_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("rig.json");
        write_rig(&arm_rig(), input.to_str().unwrap()).unwrap();

        let code = run(
            input.to_str().unwrap(),
            &["Leg.L".to_string()],
            false,
            None,
            None,
            true,
        )
        .unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_options_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("rig.json");
        let options = dir.path().join("options.json");
        write_rig(&arm_rig(), input.to_str().unwrap()).unwrap();
        fs::write(&options, r#"{ "mirror_structure": false }"#).unwrap();

        // Without the structural pass there is no Arm.R to mirror onto.
        let code = run(
            input.to_str().unwrap(),
            &["Arm.L".to_string()],
            false,
            Some(options.to_str().unwrap()),
            None,
            true,
        )
        .unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("rig.json");
        write_rig(&arm_rig(), input.to_str().unwrap()).unwrap();
        assert!(run(input.to_str().unwrap(), &[], false, None, None, true).is_err());
    }
}
