//! Driver mirroring.
//!
//! Drivers live on the rig object and address bones through their data path.
//! Mirroring a bone's drivers means recreating every driver under
//! `pose.bones["<source>"]` at the same relative path under the mirrored bone,
//! with each variable target pointed at the mirrored bone.

use rigkit_ir::live::DriverVariable;
use rigkit_ir::naming::{
    bone_in_path, constraint_in_path, constraint_path, pose_bone_path, replace_quoted_once,
    sub_path,
};
use rigkit_ir::{flip_name, DiagnosticCode, Diagnostics, Driver, RigHost};

/// Which drivers of a bone to mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverScope<'a> {
    /// Every driver on the bone, including its constraints' drivers.
    Bone,
    /// Only drivers on one constraint, recreated on another constraint.
    Constraint {
        /// Constraint on the source bone.
        source: &'a str,
        /// Constraint on the target bone.
        target: &'a str,
    },
}

/// Mirrors the drivers of `source` onto `target`.
///
/// Existing drivers at the destination paths are replaced. Bones referenced by
/// variable targets are flipped when the flipped bone exists; otherwise the
/// original name is kept and an M004 diagnostic recorded. Returns the number of
/// drivers written.
pub fn mirror_drivers<H: RigHost + ?Sized>(
    host: &mut H,
    source: &str,
    target: &str,
    scope: DriverScope<'_>,
    diagnostics: &mut Diagnostics,
) -> usize {
    let (prefix, target_prefix) = match scope {
        DriverScope::Bone => (pose_bone_path(source), pose_bone_path(target)),
        DriverScope::Constraint {
            source: src,
            target: dst,
        } => (constraint_path(source, src), constraint_path(target, dst)),
    };

    let matching: Vec<Driver> = host
        .drivers()
        .iter()
        .filter(|d| sub_path(&d.data_path, &prefix).is_some())
        .cloned()
        .collect();

    let mut written = 0;
    for driver in matching {
        let rest = &driver.data_path[prefix.len()..];
        // Renamed below the bone path; the bone itself may carry the same name.
        let rest = match (scope, constraint_in_path(rest)) {
            (DriverScope::Bone, Some(constraint)) => {
                replace_quoted_once(rest, constraint, &flip_name(constraint))
            }
            _ => rest.to_string(),
        };
        let path = format!("{}{}", target_prefix, rest);
        if path == driver.data_path {
            continue;
        }

        let variables: Vec<DriverVariable> = driver
            .variables
            .iter()
            .map(|v| mirror_variable(&*host, v, target, diagnostics))
            .collect();

        host.remove_driver(&path, driver.array_index);
        match host.add_driver(&path, driver.array_index) {
            Ok(live) => {
                live.driver_type = driver.driver_type;
                live.expression = driver.expression.clone();
                live.use_self = driver.use_self;
                live.variables = variables;
                written += 1;
                log::debug!("mirrored driver {} -> {}", driver.data_path, path);
            }
            Err(e) => diagnostics.bone(
                DiagnosticCode::DriverFailed,
                target,
                format!("driver '{}'[{}]: {}", path, driver.array_index, e),
            ),
        }
    }
    written
}

/// Returns a copy of `variable` with its bone references flipped.
fn mirror_variable<H: RigHost + ?Sized>(
    host: &H,
    variable: &DriverVariable,
    owner: &str,
    diagnostics: &mut Diagnostics,
) -> DriverVariable {
    let rig = host.object_name();
    let mut mirrored = variable.clone();
    for target in mirrored.targets_mut() {
        let on_rig = target.id.as_deref().map_or(true, |id| id == rig);
        if !on_rig {
            continue;
        }
        if !target.bone_target.is_empty() {
            target.bone_target = flip_existing(host, &target.bone_target, owner, diagnostics);
        }
        if let Some(bone) = bone_in_path(&target.data_path) {
            let flipped = flip_existing(host, bone, owner, diagnostics);
            if flipped != bone {
                target.data_path = replace_quoted_once(&target.data_path, bone, &flipped);
            }
        }
    }
    mirrored
}

fn flip_existing<H: RigHost + ?Sized>(
    host: &H,
    name: &str,
    owner: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    let flipped = flip_name(name);
    if flipped == name || host.bone_id(&flipped).is_some() {
        return flipped;
    }
    diagnostics.bone(
        DiagnosticCode::MissingMirrorBone,
        owner,
        format!("driver target bone '{}' does not exist; kept '{}'", flipped, name),
    );
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rigkit_ir::live::{TransformType, VariableType};
    use rigkit_ir::MemoryRig;

    fn rig() -> MemoryRig {
        let mut rig = MemoryRig::new("RIG")
            .with_bone("Arm.L", [1.0, 0.0, 0.0], [2.0, 0.0, 0.0])
            .with_bone("Arm.R", [-1.0, 0.0, 0.0], [-2.0, 0.0, 0.0])
            .with_bone("Ctrl.L", [1.0, 1.0, 0.0], [1.0, 2.0, 0.0])
            .with_bone("Ctrl.R", [-1.0, 1.0, 0.0], [-1.0, 2.0, 0.0])
            .with_bone("Solo.L", [3.0, 0.0, 0.0], [3.0, 1.0, 0.0])
            .with_bone("Arm.L.001", [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]);

        let driver = rig
            .add_driver("pose.bones[\"Arm.L\"].constraints[\"IK.L\"].influence", -1)
            .unwrap();
        driver.expression = "fk * 2".into();
        let var = driver.add_variable("fk");
        var.targets_mut()[0].id = Some("RIG".into());
        var.targets_mut()[0].data_path = "pose.bones[\"Ctrl.L\"][\"fk\"]".into();

        let driver = rig.add_driver("pose.bones[\"Arm.L\"].location", 0).unwrap();
        let var = driver.add_variable("x");
        var.set_type(VariableType::Transforms);
        var.targets_mut()[0].id = Some("RIG".into());
        var.targets_mut()[0].bone_target = "Solo.L".into();
        var.targets_mut()[0].transform_type = TransformType::LocX;

        // Different bone whose name starts with the source name.
        rig.add_driver("pose.bones[\"Arm.L.001\"].location", 1)
            .unwrap()
            .expression = "0".into();
        rig
    }

    #[test]
    fn test_mirror_bone_drivers() {
        let mut rig = rig();
        let mut diags = Diagnostics::new();
        let written = mirror_drivers(&mut rig, "Arm.L", "Arm.R", DriverScope::Bone, &mut diags);
        assert_eq!(written, 2);

        let ik = rig
            .driver_mut("pose.bones[\"Arm.R\"].constraints[\"IK.R\"].influence", -1)
            .unwrap()
            .clone();
        assert_eq!(ik.expression, "fk * 2");
        assert_eq!(
            ik.variables[0].targets()[0].data_path,
            "pose.bones[\"Ctrl.R\"][\"fk\"]"
        );

        // Solo.R does not exist: the original target is kept and reported.
        let loc = rig
            .driver_mut("pose.bones[\"Arm.R\"].location", 0)
            .unwrap()
            .clone();
        assert_eq!(loc.variables[0].var_type(), VariableType::Transforms);
        assert_eq!(loc.variables[0].targets()[0].bone_target, "Solo.L");
        assert!(diags.contains(DiagnosticCode::MissingMirrorBone));

        assert!(rig.driver_mut("pose.bones[\"Arm.R.001\"].location", 1).is_none());
    }

    #[test]
    fn test_mirror_twice_replaces() {
        let mut rig = rig();
        let before = rig.drivers().len();
        mirror_drivers(&mut rig, "Arm.L", "Arm.R", DriverScope::Bone, &mut Diagnostics::new());
        mirror_drivers(&mut rig, "Arm.L", "Arm.R", DriverScope::Bone, &mut Diagnostics::new());
        assert_eq!(rig.drivers().len(), before + 2);
    }

    #[test]
    fn test_constraint_named_like_flipped_bone() {
        let mut rig = MemoryRig::new("RIG")
            .with_bone("IK.L", [1.0, 0.0, 0.0], [1.0, 1.0, 0.0])
            .with_bone("IK.R", [-1.0, 0.0, 0.0], [-1.0, 1.0, 0.0]);
        rig.add_driver("pose.bones[\"IK.L\"].constraints[\"IK.R\"].influence", -1)
            .unwrap()
            .expression = "w".into();

        let mut diags = Diagnostics::new();
        let written = mirror_drivers(&mut rig, "IK.L", "IK.R", DriverScope::Bone, &mut diags);
        assert_eq!(written, 1);
        assert_eq!(
            rig.driver_mut("pose.bones[\"IK.R\"].constraints[\"IK.L\"].influence", -1)
                .unwrap()
                .expression,
            "w"
        );
        assert_eq!(rig.drivers().len(), 2);
    }

    #[test]
    fn test_constraint_scope_on_same_bone() {
        let mut rig = MemoryRig::new("RIG").with_bone("Spine", [0.0; 3], [0.0, 1.0, 0.0]);
        rig.add_driver("pose.bones[\"Spine\"].constraints[\"Lean.L\"].influence", -1)
            .unwrap()
            .expression = "var".into();
        rig.add_driver("pose.bones[\"Spine\"].location", 2).unwrap();

        let written = mirror_drivers(
            &mut rig,
            "Spine",
            "Spine",
            DriverScope::Constraint {
                source: "Lean.L",
                target: "Lean.R",
            },
            &mut Diagnostics::new(),
        );
        assert_eq!(written, 1);
        assert_eq!(
            rig.driver_mut("pose.bones[\"Spine\"].constraints[\"Lean.R\"].influence", -1)
                .unwrap()
                .expression,
            "var"
        );
        assert_eq!(rig.drivers().len(), 3);
    }
}
