//! End-to-end tests of the command pipeline.
//!
//! A graph document on disk is realized into a rig file, the rig file is
//! mirrored, and the results are read back from disk.

use pretty_assertions::assert_eq;
use rigkit_cli::commands::{flip, mirror, realize};
use rigkit_ir::live::ConstraintData;
use rigkit_ir::RigHost;
use rigkit_tests::{RigFiles, RIG_NAME};
use serde_json::{json, Value};
use std::process::ExitCode;

fn arm_document() -> Value {
    json!({
        "name": RIG_NAME,
        "defaults": { "use_deform": true },
        "bones": [
            { "name": "Spine", "tail": [0, 0, 1.5] },
            {
                "name": "UpperArm.L",
                "head": [0.2, 0, 1.5],
                "tail": [0.6, 0, 1.5],
                "parent": "Spine",
                "custom_props_pose": {
                    "ik_fk": { "default": 1.0, "min": 0.0, "max": 1.0 }
                }
            },
            {
                "name": "Forearm.L",
                "head": [0.6, 0, 1.5],
                "tail": [1.0, 0, 1.5],
                "parent": "UpperArm.L",
                "use_connect": true,
                "constraints": [
                    {
                        "type": "IK",
                        "name": "IK.L",
                        "target": RIG_NAME,
                        "subtarget": "Hand.L",
                        "chain_count": 2
                    }
                ],
                "drivers": {
                    "constraints[\"IK.L\"].influence": {
                        "expression": "ik_fk",
                        "variables": [
                            {
                                "name": "ik_fk",
                                "type": "SINGLE_PROP",
                                "targets": [
                                    {
                                        "id": RIG_NAME,
                                        "data_path": "pose.bones[\"UpperArm.L\"][\"ik_fk\"]"
                                    }
                                ]
                            }
                        ]
                    }
                }
            },
            {
                "name": "Hand.L",
                "head": [1.0, 0, 1.5],
                "tail": [1.2, 0, 1.5],
                "parent": "Forearm.L",
                "use_connect": true,
                "use_deform": false
            }
        ]
    })
}

fn left_arm() -> Vec<String> {
    ["UpperArm.L", "Forearm.L", "Hand.L"]
        .iter()
        .map(|n| n.to_string())
        .collect()
}

#[test]
fn test_realize_then_mirror() {
    let files = RigFiles::new();
    let graph = files.write_json("arm.json", &arm_document());
    let rig_path = files.file("rig.json");
    let mirrored_path = files.file("mirrored.json");

    let code = realize::run(graph.to_str().unwrap(), None, &rig_path, false, true).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let rig = files.read_rig("rig.json");
    assert_eq!(rig.name, RIG_NAME);
    assert_eq!(rig.bones().len(), 4);
    assert!(!rig.record("Hand.L").unwrap().pose.behavior.use_deform);
    assert!(rig.record("Forearm.L").unwrap().pose.behavior.use_deform);

    let code = mirror::run(
        &rig_path,
        &left_arm(),
        false,
        None,
        Some(mirrored_path.as_str()),
        true,
    )
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let rig = files.read_rig("mirrored.json");
    assert_eq!(rig.bones().len(), 7);
    let ik = rig
        .record("Forearm.R")
        .unwrap()
        .pose
        .constraint("IK.R")
        .unwrap();
    assert_eq!(ik.subtarget, "Hand.R");
    assert!(matches!(ik.data, ConstraintData::Ik(_)));
    assert!(!rig.record("Hand.R").unwrap().pose.behavior.use_deform);

    let driver = rig
        .drivers()
        .iter()
        .find(|d| d.data_path.contains("Forearm.R"))
        .expect("mirrored driver");
    assert_eq!(
        driver.variables[0].targets()[0].data_path,
        "pose.bones[\"UpperArm.R\"][\"ik_fk\"]"
    );
}

#[test]
fn test_realize_over_mirrored_rig_keeps_right_side() {
    let files = RigFiles::new();
    let graph = files.write_json("arm.json", &arm_document());
    let rig_path = files.file("rig.json");

    realize::run(graph.to_str().unwrap(), None, &rig_path, false, true).unwrap();
    mirror::run(&rig_path, &left_arm(), false, None, None, true).unwrap();
    let before = files.read_rig("rig.json");

    // Realizing the same graph again only rewrites the left side.
    let code = realize::run(
        graph.to_str().unwrap(),
        Some(rig_path.as_str()),
        &rig_path,
        false,
        true,
    )
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let after = files.read_rig("rig.json");
    assert_eq!(after.bones(), before.bones());
    assert_eq!(after.drivers().len(), before.drivers().len());
}

#[test]
fn test_mirror_with_rejections_still_writes() {
    let files = RigFiles::new();
    let graph = files.write_json("arm.json", &arm_document());
    let rig_path = files.file("rig.json");
    realize::run(graph.to_str().unwrap(), None, &rig_path, false, true).unwrap();

    let mut bones = left_arm();
    bones.push("Tail".to_string());
    let code = mirror::run(&rig_path, &bones, false, None, None, true).unwrap();
    assert_eq!(code, ExitCode::from(1));

    let rig = files.read_rig("rig.json");
    assert!(rig.record("UpperArm.R").is_some());
    assert!(rig.record("Tail").is_none());
}

#[test]
fn test_broken_graph_document() {
    let files = RigFiles::new();
    let graph = files.write_json("bad.json", &json!({ "bones": [], "scale": 2 }));
    let err = realize::run(
        graph.to_str().unwrap(),
        None,
        &files.file("rig.json"),
        false,
        true,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("scale"), "{:#}", err);
    assert!(!files.path().join("rig.json").exists());
}

#[test]
fn test_flip_matches_mirror_targets() {
    let names = flip::flip_all(&left_arm());
    let flipped: Vec<_> = names.iter().map(|n| n.flipped.as_str()).collect();
    assert_eq!(flipped, ["UpperArm.R", "Forearm.R", "Hand.R"]);
    assert!(names.iter().all(|n| n.has_side));
}
