//! Graph construction and realization tests.

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::error::DiagnosticCode;
use crate::host::{HostMode, MemoryRig, RigHost};
use crate::live::{BoneId, ConstraintData, ConstraintKind, InheritScale};

fn fields(value: serde_json::Value) -> FieldMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("Expected object"),
    }
}

fn spine_graph() -> BoneGraph {
    let mut graph = BoneGraph::new();
    graph
        .bone_with_fields(
            "Spine",
            None,
            true,
            &fields(json!({"head": [0, 0, 0], "tail": [0, 1, 0]})),
        )
        .unwrap();
    graph
        .bone_with_fields(
            "Spine.001",
            None,
            true,
            &fields(json!({"parent": "Spine", "head": [0, 1, 0], "tail": [0, 2, 0]})),
        )
        .unwrap();
    graph
}

// =============================================================================
// Graph construction
// =============================================================================

#[test]
fn test_defaults_then_source_then_fields() {
    let mut graph = BoneGraph::with_defaults(fields(json!({
        "use_deform": false,
        "roll": 0.5,
        "bbone_segments": 3
    })))
    .unwrap();

    let plain = graph.bone("Plain").clone();
    assert!(!plain.behavior.use_deform);
    assert_eq!(plain.roll, 0.5);
    assert_eq!(plain.bbone.segments, 3);

    let mut source = BoneSpec::new("Source");
    source.roll = 1.5;
    source.tail = [0.0, 0.0, 2.0];
    let copied = graph
        .bone_with_fields(
            "Copy",
            Some(&BoneSource::Spec(source)),
            true,
            &fields(json!({"tail": [0, 0, 3]})),
        )
        .unwrap()
        .clone();
    assert_eq!(copied.name, "Copy");
    assert_eq!(copied.roll, 1.5);
    assert_eq!(copied.tail, [0.0, 0.0, 3.0]);
}

#[test]
fn test_invalid_defaults_rejected() {
    let err = BoneGraph::with_defaults(fields(json!({"wingspan": 2}))).unwrap_err();
    assert_eq!(err, crate::error::GraphError::UnknownField("wingspan".to_string()));
}

#[test]
fn test_last_write_wins_in_place() {
    let mut graph = BoneGraph::new();
    graph.bone("A").roll = 1.0;
    graph.bone("B");
    graph.bone("A").roll = 2.0;
    let names: Vec<_> = graph.bones().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
    assert_eq!(graph.find("A").unwrap().roll, 2.0);
    assert_eq!(graph.local_ref("B"), Some(BoneRef::Local(1)));
}

#[test]
fn test_overwrite_false_keeps_existing() {
    let mut graph = BoneGraph::new();
    graph.bone("A").roll = 1.0;
    let existing = graph.add_bone("A", None, false);
    assert_eq!(existing.roll, 1.0);
    let kept = graph
        .bone_with_fields("A", None, false, &fields(json!({"roll": 3.0})))
        .unwrap();
    assert_eq!(kept.roll, 1.0);
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_failed_fields_leave_graph_unchanged() {
    let mut graph = BoneGraph::new();
    graph.bone("A").roll = 1.0;
    let result = graph.bone_with_fields("A", None, true, &fields(json!({"roll": "big"})));
    assert!(result.is_err());
    assert_eq!(graph.find("A").unwrap().roll, 1.0);
}

#[test]
fn test_find_is_exact() {
    let graph = spine_graph();
    assert!(graph.find("Spine").is_some());
    assert!(graph.find("spine").is_none());
    assert!(graph.find("Spine.00").is_none());
}

// =============================================================================
// Realization
// =============================================================================

#[test]
fn test_spine_scenario() {
    let mut graph = spine_graph();
    let mut rig = MemoryRig::new("RIG");
    let report = graph.realize(&mut rig, true).unwrap();

    assert!(report.is_clean(), "{:?}", report.diagnostics);
    assert_eq!(report.created, ["Spine", "Spine.001"]);
    assert_eq!(rig.bones().len(), 2);
    let child = rig.record("Spine.001").unwrap();
    assert_eq!(child.edit.parent, Some(BoneId(0)));
    assert_eq!(rig.bone_name(BoneId(0)), Some("Spine"));
    assert!(graph.is_empty());
    assert_eq!(rig.mode(), HostMode::Object);
}

#[test]
fn test_forward_references_resolve() {
    let mut graph = BoneGraph::new();
    graph.bone("Child").parent = Some(BoneRef::from("Parent"));
    graph.bone("Parent").head = [0.0, 0.0, 1.0];
    graph.bone("Handle");
    let handle = graph.local_ref("Handle");
    graph.find_mut("Child").unwrap().bbone_custom_handle_end = handle;

    let mut rig = MemoryRig::new("RIG");
    let report = graph.realize(&mut rig, false).unwrap();
    assert!(report.is_clean());
    let child = &rig.record("Child").unwrap().edit;
    assert_eq!(child.parent, rig.bone_id("Parent"));
    assert_eq!(child.bbone_custom_handle_end, rig.bone_id("Handle"));
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_unresolved_reference_is_diagnostic() {
    let mut graph = BoneGraph::new();
    graph.bone("Arm").parent = Some(BoneRef::from("Shoulder"));
    graph.bone("Hand").custom_shape_transform = Some(BoneRef::Local(7));

    let mut rig = MemoryRig::new("RIG");
    let report = graph.realize(&mut rig, true).unwrap();
    assert_eq!(report.created, ["Arm", "Hand"]);
    assert_eq!(report.diagnostics.len(), 2);
    assert!(report
        .diagnostics
        .iter()
        .all(|d| d.code == DiagnosticCode::UnresolvedReference));
    assert_eq!(rig.record("Arm").unwrap().edit.parent, None);
}

#[test]
fn test_self_parent_is_rejected() {
    let mut graph = BoneGraph::new();
    graph.bone("Loop").parent = Some(BoneRef::from("Loop"));
    let mut rig = MemoryRig::new("RIG");
    let report = graph.realize(&mut rig, true).unwrap();
    assert_eq!(report.diagnostics[0].code, DiagnosticCode::UnresolvedReference);
    assert_eq!(rig.record("Loop").unwrap().edit.parent, None);
}

#[test]
fn test_zero_length_bone_skipped() {
    let mut with_tip = spine_graph();
    let tip = with_tip.bone("Tip");
    tip.head = [0.0, 2.0, 0.0];
    tip.tail = [0.0, 2.0, 0.0];
    tip.parent = Some(BoneRef::from("Spine.001"));
    with_tip.bone("Fin").parent = Some(BoneRef::Local(2));

    let mut rig_a = MemoryRig::new("RIG");
    let report = with_tip.realize(&mut rig_a, true).unwrap();
    assert_eq!(report.skipped, ["Tip"]);
    assert!(rig_a.record("Tip").is_none());
    assert_eq!(report.diagnostics[0].code, DiagnosticCode::ZeroLengthBone);
    assert_eq!(report.diagnostics[1].code, DiagnosticCode::UnresolvedReference);

    let mut without_tip = spine_graph();
    without_tip.bone("Fin");
    let mut rig_b = MemoryRig::new("RIG");
    without_tip.realize(&mut rig_b, true).unwrap();
    assert_eq!(rig_a, rig_b);
}

#[test]
fn test_mode_switches_are_batched() {
    let mut graph = BoneGraph::new();
    for i in 0..20 {
        let bone = graph.bone(&format!("Bone.{:03}", i));
        bone.head = [0.0, i as f64, 0.0];
        bone.tail = [0.0, i as f64 + 1.0, 0.0];
    }
    let mut rig = MemoryRig::new("RIG");
    graph.realize(&mut rig, true).unwrap();
    // Object -> Edit -> Pose -> Object.
    assert_eq!(rig.mode_switches(), 3);
}

#[test]
fn test_original_mode_restored() {
    let mut rig = MemoryRig::new("RIG");
    rig.set_mode(HostMode::Pose).unwrap();
    spine_graph().realize(&mut rig, true).unwrap();
    assert_eq!(rig.mode(), HostMode::Pose);

    rig.set_mode(HostMode::Edit).unwrap();
    spine_graph().realize(&mut rig, true).unwrap();
    assert_eq!(rig.mode(), HostMode::Edit);
}

#[test]
fn test_existing_bones_are_updated() {
    let mut rig = MemoryRig::new("RIG").with_bone("Spine", [0.0; 3], [0.0, 0.5, 0.0]);
    let report = spine_graph().realize(&mut rig, true).unwrap();
    assert_eq!(report.updated, ["Spine"]);
    assert_eq!(report.created, ["Spine.001"]);
    assert_eq!(rig.record("Spine").unwrap().edit.tail, [0.0, 1.0, 0.0]);
}

#[test]
fn test_behavioral_pass() {
    let mut graph = spine_graph();
    let spine = graph.find_mut("Spine").unwrap();
    spine.behavior.inherit_scale = InheritScale::Average;
    spine.custom_shape_transform = Some(BoneRef::from("Spine.001"));
    spine.add_pose_prop(PropertySpec::new("stretch", 1.0).with_range(0.0, 2.0));
    spine.add_edit_prop(PropertySpec::new("segments", 2));
    spine
        .add_constraint(
            ConstraintSpec::new(ConstraintKind::CopyRotation)
                .with("subtarget", "Spine.001")
                .with("influence", 0.5),
        )
        .add_constraint(ConstraintSpec::new(ConstraintKind::CopyRotation))
        .add_constraint(
            ConstraintSpec::new(ConstraintKind::Armature).with(
                "targets",
                json!([{"target": "RIG", "subtarget": "Spine.001", "weight": 0.5}]),
            ),
        );

    let mut rig = MemoryRig::new("RIG");
    let report = graph.realize(&mut rig, true).unwrap();
    assert!(report.is_clean(), "{:?}", report.diagnostics);

    let record = rig.record("Spine").unwrap();
    assert_eq!(record.pose.behavior.inherit_scale, InheritScale::Average);
    assert_eq!(record.pose.custom_shape_transform, rig.bone_id("Spine.001"));
    assert_eq!(record.pose.props["stretch"].ui.max, Some(2.0));
    assert_eq!(record.edit.props["segments"].value, json!(2));

    let names: Vec<_> = record.pose.constraints.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Copy Rotation", "Copy Rotation.001", "Armature"]);
    assert_eq!(record.pose.constraints[0].influence, 0.5);
    let ConstraintData::Armature(armature) = &record.pose.constraints[2].data else {
        panic!("Expected Armature");
    };
    assert_eq!(armature.targets[0].subtarget, "Spine.001");
}

#[test]
fn test_named_constraints_replace_in_place() {
    let build = |influence: f64| {
        let mut graph = BoneGraph::new();
        graph
            .bone("Arm")
            .add_constraint(
                ConstraintSpec::new(ConstraintKind::Ik)
                    .with("name", "IK")
                    .with("influence", influence),
            )
            .add_constraint(ConstraintSpec::new(ConstraintKind::LimitRotation).with("name", "Limit"));
        graph
    };
    let mut rig = MemoryRig::new("RIG");
    build(1.0).realize(&mut rig, true).unwrap();
    build(0.25).realize(&mut rig, true).unwrap();

    let constraints = &rig.record("Arm").unwrap().pose.constraints;
    assert_eq!(constraints.len(), 2);
    assert_eq!(constraints[0].name, "IK");
    assert_eq!(constraints[0].influence, 0.25);
}

#[test]
fn test_constraint_field_errors_are_diagnostics() {
    let mut graph = BoneGraph::new();
    graph.bone("Arm").add_constraint(
        ConstraintSpec::new(ConstraintKind::Ik)
            .with("chain_count", "two")
            .with("not_a_field", 1),
    );
    let mut rig = MemoryRig::new("RIG");
    let report = graph.realize(&mut rig, true).unwrap();
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].code, DiagnosticCode::InvalidFieldValue);
    assert_eq!(rig.record("Arm").unwrap().pose.constraints.len(), 1);
}

#[test]
fn test_drivers_attach_at_bone_paths() {
    let mut graph = spine_graph();
    let var = PropertySpec::new("stretch", 1.0).to_driver_variable("RIG", Some("Spine"));
    graph
        .find_mut("Spine.001")
        .unwrap()
        .add_driver("location[1]", DriverSpec::new("stretch").with_variable(var.clone()))
        .add_driver("[\"twist\"]", DriverSpec::new("stretch * 2").with_variable(var));

    let mut rig = MemoryRig::new("RIG");
    let report = graph.realize(&mut rig, true).unwrap();
    assert!(report.is_clean());

    let mut drivers: Vec<_> = rig
        .drivers()
        .iter()
        .map(|d| (d.data_path.as_str(), d.array_index))
        .collect();
    drivers.sort();
    assert_eq!(
        drivers,
        [
            ("pose.bones[\"Spine.001\"].location", 1),
            ("pose.bones[\"Spine.001\"][\"twist\"]", -1),
        ]
    );
}

#[test]
fn test_snapshot_seeded_editing() {
    let mut rig = MemoryRig::new("RIG");
    let mut graph = spine_graph();
    graph
        .find_mut("Spine.001")
        .unwrap()
        .add_constraint(ConstraintSpec::new(ConstraintKind::DampedTrack).with("head_tail", 0.5));
    graph.realize(&mut rig, true).unwrap();

    rig.set_mode(HostMode::Pose).unwrap();
    let snapshot = BoneSnapshot::capture(&rig, "Spine.001").unwrap().unwrap();
    let mut edit = BoneGraph::new();
    let spec = edit.add_bone("Spine.001", Some(&BoneSource::Snapshot(snapshot)), true);
    spec.head = [0.0, 1.0, 0.0];
    spec.tail = [0.0, 3.0, 0.0];
    spec.parent = Some(BoneRef::from("Spine"));
    edit.realize(&mut rig, true).unwrap();

    let record = rig.record("Spine.001").unwrap();
    assert_eq!(record.edit.tail, [0.0, 3.0, 0.0]);
    assert_eq!(record.pose.constraints.len(), 1);
    let ConstraintData::DampedTrack(track) = &record.pose.constraints[0].data else {
        panic!("Expected DampedTrack");
    };
    assert_eq!(track.head_tail, 0.5);
}
