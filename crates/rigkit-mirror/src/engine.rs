//! Mirroring selected bones of a live rig.
//!
//! A bone whose name flips to another name is mirrored onto that bone; the
//! counterpart is created if needed. A bone whose name does not flip mirrors
//! its own side-named constraints within itself. Structural work runs in one
//! edit session and behavioral work in one pose session; the host's mode is
//! restored on every exit path.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use rigkit_ir::live::{BoneId, Constraint, ConstraintData};
use rigkit_ir::{
    flip_name, Diagnostic, DiagnosticCode, Diagnostics, HostMode, HostResult, ModeGuard, RigHost,
};

use crate::action::mirror_action_curves;
use crate::constraints::{mirror_constraint, MirrorContext};
use crate::drivers::{mirror_drivers, DriverScope};
use crate::error::{MirrorError, MirrorResult};

// =============================================================================
// Options and report
// =============================================================================

/// What a mirror call touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorOptions {
    /// Split constraints of self-mirroring bones that have no opposite.
    pub allow_split: bool,
    /// Create counterparts and mirror their geometry and parenting.
    pub mirror_structure: bool,
    /// Mirror drivers on mirrored bones and constraints.
    pub mirror_drivers: bool,
    /// Mirror curves of actions used by action constraints.
    pub mirror_actions: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            allow_split: false,
            mirror_structure: true,
            mirror_drivers: true,
            mirror_actions: true,
        }
    }
}

impl MirrorOptions {
    /// Sets whether splitting is allowed.
    pub fn with_split(mut self, allow_split: bool) -> Self {
        self.allow_split = allow_split;
        self
    }
}

/// A constraint that was split into two half-influence constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConstraint {
    pub bone: String,
    pub original: String,
    pub mirrored: String,
}

/// An item the engine refused to mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorRejection {
    /// Selected bone.
    pub bone: String,
    /// Constraint on the bone, when only that constraint was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    pub code: DiagnosticCode,
    pub message: String,
}

impl std::fmt::Display for MirrorRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "[{}] {} / {}: {}", self.code, self.bone, c, self.message),
            None => write!(f, "[{}] {}: {}", self.code, self.bone, self.message),
        }
    }
}

/// Outcome of one mirror call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorReport {
    /// Bones that received mirrored data.
    pub mirrored: Vec<String>,
    /// Counterpart bones created by the structural pass.
    pub created: Vec<String>,
    /// Constraints split on self-mirroring bones.
    pub split: Vec<SplitConstraint>,
    pub rejected: Vec<MirrorRejection>,
    /// Non-fatal problems, in the order they happened.
    pub diagnostics: Vec<Diagnostic>,
}

impl MirrorReport {
    /// Returns true if nothing was rejected and no diagnostics were recorded.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.diagnostics.is_empty()
    }

    fn reject(
        &mut self,
        bone: &str,
        constraint: Option<&str>,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) {
        let rejection = MirrorRejection {
            bone: bone.to_string(),
            constraint: constraint.map(str::to_string),
            code,
            message: message.into(),
        };
        log::warn!("rejected {}", rejection);
        self.rejected.push(rejection);
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Mirrors the named bones with default options.
pub fn mirror_bones<H: RigHost + ?Sized>(
    host: &mut H,
    bone_names: &BTreeSet<String>,
    allow_split: bool,
) -> MirrorResult<MirrorReport> {
    let options = MirrorOptions::default().with_split(allow_split);
    mirror_bones_with(host, bone_names, &options)
}

/// Mirrors the named bones.
///
/// Per-item problems are collected on the report; `Err` is only returned for
/// an empty selection or a host failure, and the host's mode is restored in
/// both cases.
pub fn mirror_bones_with<H: RigHost + ?Sized>(
    host: &mut H,
    bone_names: &BTreeSet<String>,
    options: &MirrorOptions,
) -> MirrorResult<MirrorReport> {
    if bone_names.is_empty() {
        return Err(MirrorError::EmptySelection);
    }

    let mut report = MirrorReport::default();
    let mut diagnostics = Diagnostics::new();
    let pairs = plan(&*host, bone_names, &mut report);

    let needs_structure = options.mirror_structure && pairs.iter().any(|p| !p.is_self());
    let first_mode = if needs_structure {
        HostMode::Edit
    } else {
        HostMode::Pose
    };
    let mut guard = ModeGuard::enter(host, first_mode)?;

    if needs_structure {
        mirror_structure(&mut *guard, &pairs, &mut report, &mut diagnostics)?;
        guard.switch(HostMode::Pose)?;
    }

    let ctx = MirrorContext::new(guard.object_name(), guard.bone_names());
    for pair in &pairs {
        if pair.is_self() {
            mirror_within(
                &mut *guard,
                &pair.source,
                &ctx,
                options,
                &mut report,
                &mut diagnostics,
            )?;
        } else {
            mirror_onto(&mut *guard, pair, &ctx, options, &mut report, &mut diagnostics)?;
        }
    }
    drop(guard);

    report.diagnostics = diagnostics.into_vec();
    log::info!(
        "mirrored {} bones ({} created, {} split, {} rejected)",
        report.mirrored.len(),
        report.created.len(),
        report.split.len(),
        report.rejected.len()
    );
    Ok(report)
}

// =============================================================================
// Planning
// =============================================================================

#[derive(Debug)]
struct MirrorPair {
    source: String,
    target: String,
}

impl MirrorPair {
    fn is_self(&self) -> bool {
        self.source == self.target
    }
}

fn plan<H: RigHost + ?Sized>(
    host: &H,
    bone_names: &BTreeSet<String>,
    report: &mut MirrorReport,
) -> Vec<MirrorPair> {
    let mut pairs = Vec::with_capacity(bone_names.len());
    for name in bone_names {
        if host.bone_id(name).is_none() {
            report.reject(name, None, DiagnosticCode::UnknownBone, "bone does not exist");
            continue;
        }
        let target = flip_name(name);
        if target != *name && bone_names.contains(&target) {
            report.reject(
                name,
                None,
                DiagnosticCode::AmbiguousDirection,
                format!("'{}' and '{}' are both selected", name, target),
            );
            continue;
        }
        pairs.push(MirrorPair {
            source: name.clone(),
            target,
        });
    }
    pairs
}

/// Maps a bone link to its mirrored bone, keeping it when there is none.
fn flip_link<H: RigHost + ?Sized>(
    host: &H,
    link: Option<BoneId>,
    owner: &str,
    field: &str,
    diagnostics: &mut Diagnostics,
) -> Option<BoneId> {
    let id = link?;
    let Some(name) = host.bone_name(id) else {
        return Some(id);
    };
    let flipped = flip_name(name);
    if flipped == name {
        return Some(id);
    }
    match host.bone_id(&flipped) {
        Some(mirrored) => Some(mirrored),
        None => {
            diagnostics.bone(
                DiagnosticCode::MissingMirrorBone,
                owner,
                format!("{} '{}' has no mirrored bone '{}'", field, name, flipped),
            );
            Some(id)
        }
    }
}

fn mirror_point(p: [f64; 3]) -> [f64; 3] {
    [-p[0], p[1], p[2]]
}

// =============================================================================
// Structural pass (edit mode)
// =============================================================================

fn mirror_structure<H: RigHost + ?Sized>(
    host: &mut H,
    pairs: &[MirrorPair],
    report: &mut MirrorReport,
    diagnostics: &mut Diagnostics,
) -> HostResult<()> {
    let distinct: Vec<&MirrorPair> = pairs.iter().filter(|p| !p.is_self()).collect();

    // Create every counterpart first so links between them resolve.
    for pair in &distinct {
        if host.find_edit_bone(&pair.target)?.is_none() {
            host.new_edit_bone(&pair.target)?;
            report.created.push(pair.target.clone());
        }
    }

    for pair in &distinct {
        let (Some(src_id), Some(dst_id)) = (
            host.find_edit_bone(&pair.source)?,
            host.find_edit_bone(&pair.target)?,
        ) else {
            continue;
        };
        let source = host.edit_bone(src_id)?.clone();
        let parent = flip_link(&*host, source.parent, &pair.target, "parent", diagnostics);
        let handle_start = flip_link(
            &*host,
            source.bbone_custom_handle_start,
            &pair.target,
            "bbone_custom_handle_start",
            diagnostics,
        );
        let handle_end = flip_link(
            &*host,
            source.bbone_custom_handle_end,
            &pair.target,
            "bbone_custom_handle_end",
            diagnostics,
        );

        let target = host.edit_bone_mut(dst_id)?;
        target.head = mirror_point(source.head);
        target.tail = mirror_point(source.tail);
        target.roll = -source.roll;
        target.use_connect = source.use_connect;
        target.bbone = source.bbone.mirrored_x();
        target.parent = parent;
        target.bbone_custom_handle_start = handle_start;
        target.bbone_custom_handle_end = handle_end;
        target.props = source.props;
        log::debug!("mirrored structure {} -> {}", pair.source, pair.target);
    }
    Ok(())
}

// =============================================================================
// Behavioral pass (pose mode)
// =============================================================================

fn mirror_onto<H: RigHost + ?Sized>(
    host: &mut H,
    pair: &MirrorPair,
    ctx: &MirrorContext,
    options: &MirrorOptions,
    report: &mut MirrorReport,
    diagnostics: &mut Diagnostics,
) -> HostResult<()> {
    let Some(source) = host.pose_bone(&pair.source)?.cloned() else {
        report.reject(&pair.source, None, DiagnosticCode::UnknownBone, "bone has no pose data");
        return Ok(());
    };
    if host.bone_id(&pair.target).is_none() {
        report.reject(
            &pair.source,
            None,
            DiagnosticCode::NoMirrorTarget,
            format!("mirror target '{}' does not exist", pair.target),
        );
        return Ok(());
    }

    let constraints: Vec<Constraint> = source
        .constraints
        .iter()
        .map(|c| mirror_constraint(c, ctx, &pair.target, diagnostics))
        .collect();
    let shape_transform = flip_link(
        &*host,
        source.custom_shape_transform,
        &pair.target,
        "custom_shape_transform",
        diagnostics,
    );

    let Some(target) = host.pose_bone_mut(&pair.target)? else {
        report.reject(
            &pair.source,
            None,
            DiagnosticCode::NoMirrorTarget,
            format!("mirror target '{}' has no pose data", pair.target),
        );
        return Ok(());
    };
    target.behavior = source.behavior;
    target.props = source.props;
    target.custom_shape_transform = shape_transform;
    for constraint in &constraints {
        target.put_constraint(constraint.clone());
    }

    if options.mirror_drivers {
        mirror_drivers(host, &pair.source, &pair.target, DriverScope::Bone, diagnostics);
    }
    if options.mirror_actions {
        for constraint in &constraints {
            let ConstraintData::Action(settings) = &constraint.data else {
                continue;
            };
            let Some(action) = settings.action.as_deref() else {
                continue;
            };
            if mirror_action_curves(host, action, &pair.source, &pair.target).is_none() {
                diagnostics.bone(
                    DiagnosticCode::MissingAction,
                    &pair.target,
                    format!("action '{}' used by '{}' does not exist", action, constraint.name),
                );
            }
        }
    }

    log::debug!("mirrored {} -> {}", pair.source, pair.target);
    report.mirrored.push(pair.target.clone());
    Ok(())
}

/// Mirrors side-named constraints within a bone whose own name does not flip.
fn mirror_within<H: RigHost + ?Sized>(
    host: &mut H,
    bone: &str,
    ctx: &MirrorContext,
    options: &MirrorOptions,
    report: &mut MirrorReport,
    diagnostics: &mut Diagnostics,
) -> HostResult<()> {
    let Some(names) = host
        .pose_bone(bone)?
        .map(|p| p.constraints.iter().map(|c| c.name.clone()).collect::<Vec<_>>())
    else {
        report.reject(bone, None, DiagnosticCode::UnknownBone, "bone has no pose data");
        return Ok(());
    };

    // Constraints written in this call; they must not be mirrored back.
    let mut handled = BTreeSet::new();
    let mut changed = false;

    for name in names {
        if handled.contains(&name) {
            continue;
        }
        let flipped = flip_name(&name);
        if flipped == name {
            continue;
        }
        let Some(pose) = host.pose_bone_mut(bone)? else {
            break;
        };
        let Some(index) = pose.constraint_index(&name) else {
            continue;
        };
        let original = pose.constraints[index].clone();
        let mut mirrored = mirror_constraint(&original, ctx, bone, diagnostics);

        if pose.constraint(&flipped).is_some() {
            pose.put_constraint(mirrored);
        } else if options.allow_split {
            let half = original.influence / 2.0;
            pose.constraints[index].influence = half;
            mirrored.influence = original.influence - half;
            pose.constraints.insert(index + 1, mirrored);
            report.split.push(SplitConstraint {
                bone: bone.to_string(),
                original: name.clone(),
                mirrored: flipped.clone(),
            });
        } else {
            report.reject(
                bone,
                Some(name.as_str()),
                DiagnosticCode::NoMirrorTarget,
                format!("no constraint '{}' to mirror onto and splitting is off", flipped),
            );
            continue;
        }

        if options.mirror_drivers {
            let scope = DriverScope::Constraint {
                source: &name,
                target: &flipped,
            };
            mirror_drivers(host, bone, bone, scope, diagnostics);
        }
        handled.insert(flipped);
        changed = true;
    }

    if changed {
        log::debug!("mirrored constraints within {}", bone);
        report.mirrored.push(bone.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rigkit_ir::live::Space;
    use rigkit_ir::{ConstraintKind, MemoryRig, RigError};

    fn select(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn arm_rig() -> MemoryRig {
        let mut rig = MemoryRig::new("RIG")
            .with_bone("Spine", [0.0; 3], [0.0, 0.0, 1.0])
            .with_bone("Arm.L", [0.5, 0.0, 1.0], [1.5, 0.0, 1.0]);
        let arm = rig.record_mut("Arm.L").unwrap();
        arm.edit.roll = 0.25;
        arm.edit.parent = Some(BoneId(0));
        let mut limit = Constraint::named(ConstraintKind::LimitLocation, "Limit");
        if let ConstraintData::LimitLocation(l) = &mut limit.data {
            l.use_min[0] = true;
            l.use_max[0] = true;
            l.min[0] = -1.0;
            l.max[0] = 2.0;
        }
        limit.owner_space = Space::Local;
        arm.pose.constraints.push(limit);
        rig
    }

    #[test]
    fn test_arm_limit_location() {
        let mut rig = arm_rig();
        let report = mirror_bones(&mut rig, &select(&["Arm.L"]), false).unwrap();

        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(report.created, ["Arm.R"]);
        assert_eq!(report.mirrored, ["Arm.R"]);

        let arm_r = rig.record("Arm.R").unwrap();
        assert_eq!(arm_r.edit.head, [-0.5, 0.0, 1.0]);
        assert_eq!(arm_r.edit.tail, [-1.5, 0.0, 1.0]);
        assert_eq!(arm_r.edit.roll, -0.25);
        assert_eq!(arm_r.edit.parent, Some(BoneId(0)));

        let limit = arm_r.pose.constraint("Limit").unwrap();
        assert_eq!(limit.owner_space, Space::Local);
        let ConstraintData::LimitLocation(l) = &limit.data else {
            panic!("kind changed");
        };
        assert_eq!(l.min[0], -2.0);
        assert_eq!(l.max[0], 1.0);
    }

    #[test]
    fn test_batches_mode_switches_and_restores() {
        let mut rig = arm_rig();
        rig.set_mode(HostMode::Pose).unwrap();
        let before = rig.mode_switches();
        mirror_bones(&mut rig, &select(&["Arm.L"]), false).unwrap();
        assert_eq!(rig.mode(), HostMode::Pose);
        // Pose -> Edit -> Pose.
        assert_eq!(rig.mode_switches() - before, 2);
    }

    #[test]
    fn test_ambiguous_and_unknown_rejected() {
        let mut rig = arm_rig().with_bone("Arm.R", [-0.5, 0.0, 1.0], [-1.5, 0.0, 1.0]);
        let report =
            mirror_bones(&mut rig, &select(&["Arm.L", "Arm.R", "Ghost"]), false).unwrap();
        let codes: Vec<_> = report.rejected.iter().map(|r| r.code).collect();
        assert_eq!(
            codes,
            [
                DiagnosticCode::AmbiguousDirection,
                DiagnosticCode::AmbiguousDirection,
                DiagnosticCode::UnknownBone
            ]
        );
        assert!(report.mirrored.is_empty());
        assert_eq!(rig.mode(), HostMode::Object);
    }

    #[test]
    fn test_empty_selection() {
        let mut rig = arm_rig();
        let err = mirror_bones(&mut rig, &BTreeSet::new(), false).unwrap_err();
        assert_eq!(err.code(), "MIRROR_002");
    }

    fn spine_with_lean(influence: f64) -> MemoryRig {
        let mut rig = MemoryRig::new("RIG").with_bone("Spine", [0.0; 3], [0.0, 0.0, 1.0]);
        let mut lean = Constraint::named(ConstraintKind::TrackTo, "Lean.L");
        lean.influence = influence;
        rig.record_mut("Spine").unwrap().pose.constraints.push(lean);
        rig.record_mut("Spine")
            .unwrap()
            .pose
            .constraints
            .push(Constraint::named(ConstraintKind::CopyScale, "Scale"));
        rig
    }

    #[test]
    fn test_self_mirror_split() {
        let mut rig = spine_with_lean(0.7);
        let report = mirror_bones(&mut rig, &select(&["Spine"]), true).unwrap();

        assert_eq!(report.split.len(), 1);
        let names: Vec<_> = rig
            .record("Spine")
            .unwrap()
            .pose
            .constraints
            .iter()
            .map(|c| (c.name.clone(), c.influence))
            .collect();
        assert_eq!(names[0].0, "Lean.L");
        assert_eq!(names[1].0, "Lean.R");
        assert_eq!(names[2].0, "Scale");
        assert_eq!(names[0].1 + names[1].1, 0.7);
    }

    #[test]
    fn test_self_mirror_without_split_rejects() {
        let mut rig = spine_with_lean(1.0);
        let report = mirror_bones(&mut rig, &select(&["Spine"]), false).unwrap();
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].constraint.as_deref(), Some("Lean.L"));
        assert_eq!(rig.record("Spine").unwrap().pose.constraints.len(), 2);
    }

    #[test]
    fn test_self_mirror_overwrites_opposite() {
        let mut rig = spine_with_lean(1.0);
        let mut right = Constraint::named(ConstraintKind::TrackTo, "Lean.R");
        right.influence = 0.1;
        rig.record_mut("Spine").unwrap().pose.constraints.push(right);

        let report = mirror_bones(&mut rig, &select(&["Spine"]), false).unwrap();
        assert!(report.rejected.is_empty());
        let spine = &rig.record("Spine").unwrap().pose;
        assert_eq!(spine.constraints.len(), 3);
        assert_eq!(spine.constraint("Lean.R").unwrap().influence, 1.0);
        assert_eq!(spine.constraint("Lean.L").unwrap().influence, 1.0);
    }

    #[test]
    fn test_options_roundtrip_defaults() {
        let options: MirrorOptions = serde_json::from_str(r#"{"allow_split": true}"#).unwrap();
        assert!(options.allow_split);
        assert!(options.mirror_structure);
        assert!(serde_json::from_str::<MirrorOptions>(r#"{"split": true}"#).is_err());
    }
}
