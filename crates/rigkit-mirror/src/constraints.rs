//! Per-kind constraint mirroring.
//!
//! Every constraint is first copied field for field, then the kind-specific
//! correction is applied. The match over [`ConstraintData`] is exhaustive, so
//! a new constraint kind cannot be added without deciding how it mirrors.

use std::collections::BTreeSet;
use std::f64::consts::FRAC_PI_2;

use rigkit_ir::live::{Limits, RotationLimits};
use rigkit_ir::{flip_name, Constraint, ConstraintData, DiagnosticCode, Diagnostics};

use crate::transform_table::mirror_mapping;

/// What a mirror operation may refer to while rewriting bone names.
#[derive(Debug, Clone)]
pub struct MirrorContext {
    /// Name of the armature object; only targets pointing at it are flipped.
    pub rig: String,
    /// Every bone that exists on the rig.
    pub bones: BTreeSet<String>,
}

impl MirrorContext {
    /// Creates a context from the rig name and its bone names.
    pub fn new(rig: impl Into<String>, bones: impl IntoIterator<Item = String>) -> Self {
        Self {
            rig: rig.into(),
            bones: bones.into_iter().collect(),
        }
    }

    /// Returns the flipped bone name if that bone exists.
    ///
    /// When the flipped bone is missing the original name is kept and an M004
    /// diagnostic is recorded against `owner`.
    pub fn flip_bone(&self, name: &str, owner: &str, diagnostics: &mut Diagnostics) -> String {
        let flipped = flip_name(name);
        if flipped == name || self.bones.contains(&flipped) {
            return flipped;
        }
        diagnostics.bone(
            DiagnosticCode::MissingMirrorBone,
            owner,
            format!("mirrored bone '{}' does not exist; kept '{}'", flipped, name),
        );
        name.to_string()
    }

    fn is_rig(&self, target: Option<&str>) -> bool {
        target == Some(self.rig.as_str())
    }
}

/// Reflects an IK pole angle across the X axis.
pub fn mirror_pole_angle(angle: f64) -> f64 {
    -FRAC_PI_2 - (angle + FRAC_PI_2)
}

/// Returns the mirror of `constraint` as it should appear on the opposite bone.
///
/// The name is flipped, the subtarget is flipped when the target is the rig
/// itself, and the kind-specific correction is applied. `owner` is the bone the
/// mirrored constraint will live on and is only used for diagnostics.
pub fn mirror_constraint(
    constraint: &Constraint,
    ctx: &MirrorContext,
    owner: &str,
    diagnostics: &mut Diagnostics,
) -> Constraint {
    let mut mirrored = constraint.clone();
    mirrored.name = flip_name(&constraint.name);
    if ctx.is_rig(constraint.target.as_deref()) && !constraint.subtarget.is_empty() {
        mirrored.subtarget = ctx.flip_bone(&constraint.subtarget, owner, diagnostics);
    }

    match &mut mirrored.data {
        ConstraintData::LimitLocation(limits) => mirror_location_limits(limits),
        ConstraintData::LimitRotation(limits) => mirror_rotation_limits(limits),
        ConstraintData::Transform(mapping) => *mapping = mirror_mapping(mapping),
        ConstraintData::DampedTrack(tracking)
        | ConstraintData::LockedTrack(tracking)
        | ConstraintData::TrackTo(tracking) => {
            tracking.track_axis = tracking.track_axis.mirrored_x();
        }
        ConstraintData::Ik(ik) => {
            if ctx.is_rig(ik.pole_target.as_deref()) && !ik.pole_subtarget.is_empty() {
                ik.pole_subtarget = ctx.flip_bone(&ik.pole_subtarget, owner, diagnostics);
            }
            ik.pole_angle = mirror_pole_angle(ik.pole_angle);
        }
        ConstraintData::Armature(armature) => {
            for target in &mut armature.targets {
                let same_rig = target.target.is_none() || ctx.is_rig(target.target.as_deref());
                if same_rig && !target.subtarget.is_empty() {
                    target.subtarget = ctx.flip_bone(&target.subtarget, owner, diagnostics);
                }
            }
        }
        ConstraintData::ChildOf(_) => {
            diagnostics.bone(
                DiagnosticCode::ReducedFidelity,
                owner,
                format!(
                    "'{}': child-of inverse matrix copied without mirroring",
                    mirrored.name
                ),
            );
        }
        // Curves of the referenced action are mirrored by the engine.
        ConstraintData::Action(_) => {}
        ConstraintData::CopyLocation(_)
        | ConstraintData::CopyRotation(_)
        | ConstraintData::CopyScale(_)
        | ConstraintData::CopyTransforms(_)
        | ConstraintData::LimitScale(_)
        | ConstraintData::LimitDistance(_)
        | ConstraintData::StretchTo(_) => {}
    }

    mirrored
}

fn mirror_location_limits(limits: &mut Limits) {
    let (min, max) = (limits.min[0], limits.max[0]);
    limits.min[0] = -max;
    limits.max[0] = -min;
    let (use_min, use_max) = (limits.use_min[0], limits.use_max[0]);
    limits.use_min[0] = use_max;
    limits.use_max[0] = use_min;
}

fn mirror_rotation_limits(limits: &mut RotationLimits) {
    for i in 1..3 {
        let (min, max) = (limits.min[i], limits.max[i]);
        limits.min[i] = -max;
        limits.max[i] = -min;
    }
}
