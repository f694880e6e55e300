//! Test fixture utilities for building graphs, rigs and rig files.

use rigkit_ir::{
    BoneGraph, ConstraintKind, ConstraintSpec, DriverSpec, FieldMap, MemoryRig, PropertySpec,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Armature object name used by every fixture.
pub const RIG_NAME: &str = "RIG";

/// Turns a JSON object into a field map.
///
/// Panics if `value` is not an object.
pub fn field_map(value: Value) -> FieldMap {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected a JSON object, got {}", other),
    }
}

fn add(graph: &mut BoneGraph, name: &str, fields: Value) {
    graph
        .bone_with_fields(name, None, true, &field_map(fields))
        .unwrap_or_else(|e| panic!("Failed to add bone '{}': {}", name, e));
}

/// Two stacked spine bones, the second parented to the first.
pub fn spine_graph() -> BoneGraph {
    let mut graph = BoneGraph::new();
    add(
        &mut graph,
        "Spine",
        serde_json::json!({ "head": [0, 0, 0], "tail": [0, 0, 1] }),
    );
    add(
        &mut graph,
        "Spine.001",
        serde_json::json!({ "head": [0, 0, 1], "tail": [0, 0, 2], "parent": "Spine" }),
    );
    graph
}

/// A left arm chain on a spine with an IK solver, a limit and an IK/FK driver.
///
/// Bones: `Spine`, `UpperArm.L`, `Forearm.L`, `Hand.L` and `Pole.L`.
/// `Forearm.L` carries an `IK.L` constraint aimed at `Hand.L` with `Pole.L` as
/// pole; its influence is driven by the `ik_fk` property on `UpperArm.L`.
/// `Hand.L` carries a `Limit` rotation constraint on Y.
pub fn arm_chain_graph() -> BoneGraph {
    let mut graph = spine_graph();
    add(
        &mut graph,
        "UpperArm.L",
        serde_json::json!({
            "head": [0.2, 0.0, 1.5],
            "tail": [0.6, 0.05, 1.5],
            "roll": 0.1,
            "parent": "Spine.001"
        }),
    );
    add(
        &mut graph,
        "Forearm.L",
        serde_json::json!({
            "head": [0.6, 0.05, 1.5],
            "tail": [1.0, 0.0, 1.5],
            "roll": 0.2,
            "parent": "UpperArm.L",
            "use_connect": true
        }),
    );
    add(
        &mut graph,
        "Hand.L",
        serde_json::json!({
            "head": [1.0, 0.0, 1.5],
            "tail": [1.2, 0.0, 1.5],
            "parent": "Forearm.L",
            "use_connect": true
        }),
    );
    add(
        &mut graph,
        "Pole.L",
        serde_json::json!({ "head": [0.6, 0.5, 1.5], "tail": [0.6, 0.6, 1.5] }),
    );

    let ik_fk = PropertySpec::new("ik_fk", 1.0)
        .with_range(0.0, 1.0)
        .with_description("IK/FK switch");
    let variable = ik_fk.to_driver_variable(RIG_NAME, Some("UpperArm.L"));
    graph
        .find_mut("UpperArm.L")
        .expect("UpperArm.L was just added")
        .add_pose_prop(ik_fk);

    graph
        .find_mut("Forearm.L")
        .expect("Forearm.L was just added")
        .add_constraint(
            ConstraintSpec::new(ConstraintKind::Ik)
                .with("name", "IK.L")
                .with("target", RIG_NAME)
                .with("subtarget", "Hand.L")
                .with("pole_target", RIG_NAME)
                .with("pole_subtarget", "Pole.L")
                .with("pole_angle", -1.2)
                .with("chain_count", 2),
        )
        .add_driver(
            "constraints[\"IK.L\"].influence",
            DriverSpec::new("ik_fk").with_variable(variable),
        );

    graph
        .find_mut("Hand.L")
        .expect("Hand.L was just added")
        .add_constraint(
            ConstraintSpec::new(ConstraintKind::LimitRotation)
                .with("name", "Limit")
                .with("owner_space", "LOCAL")
                .with("use_limit_y", true)
                .with("min_y", -0.5)
                .with("max_y", 0.25),
        );

    graph
}

/// Realizes `graph` into a fresh rig named [`RIG_NAME`].
///
/// Panics if the realization reports anything.
pub fn realized(mut graph: BoneGraph) -> MemoryRig {
    let mut rig = MemoryRig::new(RIG_NAME);
    let report = graph
        .realize(&mut rig, true)
        .expect("Failed to realize graph");
    assert!(report.is_clean(), "unclean realization: {:?}", report);
    rig
}

/// A temporary directory holding graph documents and rig files.
pub struct RigFiles {
    pub root: TempDir,
}

impl RigFiles {
    /// Create a new empty directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        Self { root }
    }

    /// Get the directory path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Returns the path of `name` inside the directory as a string.
    pub fn file(&self, name: &str) -> String {
        self.root.path().join(name).to_string_lossy().into_owned()
    }

    /// Write a JSON document into the directory.
    ///
    /// # Arguments
    /// * `name` - The filename
    /// * `document` - The document content
    pub fn write_json(&self, name: &str, document: &Value) -> PathBuf {
        let path = self.root.path().join(name);
        let text = serde_json::to_string_pretty(document).expect("Failed to serialize document");
        fs::write(&path, text).expect("Failed to write document");
        path
    }

    /// Write a rig file into the directory.
    pub fn write_rig(&self, name: &str, rig: &MemoryRig) -> String {
        let path = self.file(name);
        rigkit_cli::input::write_rig(rig, &path).expect("Failed to write rig file");
        path
    }

    /// Read a rig file from the directory.
    pub fn read_rig(&self, name: &str) -> MemoryRig {
        rigkit_cli::input::load_rig(&self.file(name)).expect("Failed to read rig file")
    }
}

impl Default for RigFiles {
    fn default() -> Self {
        Self::new()
    }
}
