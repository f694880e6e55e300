//! Live bone data: structural (edit) and behavioral (pose) halves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    write_field, Constraint, FieldStatus, HandleType, IdProperties, InheritScale, PropertyOwner,
    RotationMode, Vec3,
};
use crate::error::HostResult;

/// Stable identifier of a live bone, valid in every host mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoneId(pub usize);

// =============================================================================
// Bendy-bone shape
// =============================================================================

/// Bendy-bone (B-Bone) curvature, scale and handle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BBoneShape {
    /// Number of subdivisions.
    pub segments: u32,
    /// Start handle curve offset on X.
    pub curve_in_x: f64,
    /// Start handle curve offset on Z.
    pub curve_in_z: f64,
    /// End handle curve offset on X.
    pub curve_out_x: f64,
    /// End handle curve offset on Z.
    pub curve_out_z: f64,
    /// Roll at the start handle.
    pub roll_in: f64,
    /// Roll at the end handle.
    pub roll_out: f64,
    /// Ease at the start handle.
    pub ease_in: f64,
    /// Ease at the end handle.
    pub ease_out: f64,
    /// Scale at the start handle.
    pub scale_in: Vec3,
    /// Scale at the end handle.
    pub scale_out: Vec3,
    /// Start handle type.
    pub handle_type_start: HandleType,
    /// End handle type.
    pub handle_type_end: HandleType,
}

impl Default for BBoneShape {
    fn default() -> Self {
        Self {
            segments: 1,
            curve_in_x: 0.0,
            curve_in_z: 0.0,
            curve_out_x: 0.0,
            curve_out_z: 0.0,
            roll_in: 0.0,
            roll_out: 0.0,
            ease_in: 1.0,
            ease_out: 1.0,
            scale_in: [1.0; 3],
            scale_out: [1.0; 3],
            handle_type_start: HandleType::Auto,
            handle_type_end: HandleType::Auto,
        }
    }
}

impl BBoneShape {
    /// Writes a `bbone_*` field by its host name.
    pub fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        match field {
            "bbone_segments" => write_field(&mut self.segments, field, value),
            "bbone_curveinx" => write_field(&mut self.curve_in_x, field, value),
            "bbone_curveinz" => write_field(&mut self.curve_in_z, field, value),
            "bbone_curveoutx" => write_field(&mut self.curve_out_x, field, value),
            "bbone_curveoutz" => write_field(&mut self.curve_out_z, field, value),
            "bbone_rollin" => write_field(&mut self.roll_in, field, value),
            "bbone_rollout" => write_field(&mut self.roll_out, field, value),
            "bbone_easein" => write_field(&mut self.ease_in, field, value),
            "bbone_easeout" => write_field(&mut self.ease_out, field, value),
            "bbone_scalein" => write_field(&mut self.scale_in, field, value),
            "bbone_scaleout" => write_field(&mut self.scale_out, field, value),
            "bbone_handle_type_start" => write_field(&mut self.handle_type_start, field, value),
            "bbone_handle_type_end" => write_field(&mut self.handle_type_end, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }

    /// Returns the shape mirrored across X.
    ///
    /// Curvature along X and the handle rolls change sign; Z curvature, ease,
    /// scale and handle types are symmetric.
    pub fn mirrored_x(&self) -> Self {
        Self {
            curve_in_x: -self.curve_in_x,
            curve_out_x: -self.curve_out_x,
            roll_in: -self.roll_in,
            roll_out: -self.roll_out,
            ..self.clone()
        }
    }
}

// =============================================================================
// Behavioral flags
// =============================================================================

/// Pose-time bone flags that do not reference other bones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneBehavior {
    /// Whether the bone deforms geometry.
    pub use_deform: bool,
    /// Whether the bone inherits its parent's rotation.
    pub use_inherit_rotation: bool,
    /// How the bone inherits its parent's scale.
    pub inherit_scale: InheritScale,
    /// Armature layer bitmask.
    pub layers: u32,
    /// Name of the bone group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bone_group: Option<String>,
    /// Name of the custom shape object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_shape: Option<String>,
    /// Rotation mode of the pose bone.
    pub rotation_mode: RotationMode,
}

impl Default for BoneBehavior {
    fn default() -> Self {
        Self {
            use_deform: true,
            use_inherit_rotation: true,
            inherit_scale: InheritScale::Full,
            layers: 1,
            bone_group: None,
            custom_shape: None,
            rotation_mode: RotationMode::Quaternion,
        }
    }
}

impl BoneBehavior {
    /// Writes a behavioral field by its host name.
    pub fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        match field {
            "use_deform" => write_field(&mut self.use_deform, field, value),
            "use_inherit_rotation" => write_field(&mut self.use_inherit_rotation, field, value),
            "inherit_scale" => write_field(&mut self.inherit_scale, field, value),
            "layers" => write_field(&mut self.layers, field, value),
            "bone_group" => write_field(&mut self.bone_group, field, value),
            "custom_shape" => write_field(&mut self.custom_shape, field, value),
            "rotation_mode" => write_field(&mut self.rotation_mode, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

// =============================================================================
// Edit and pose bones
// =============================================================================

/// Structural half of a live bone, writable in edit mode only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditBone {
    /// Bone name.
    pub name: String,
    /// Head position in armature space.
    pub head: Vec3,
    /// Tail position in armature space.
    pub tail: Vec3,
    /// Roll around the bone's Y axis, in radians.
    pub roll: f64,
    /// Whether the head is locked to the parent's tail.
    #[serde(default)]
    pub use_connect: bool,
    /// Parent bone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<BoneId>,
    /// Bendy-bone settings.
    #[serde(default)]
    pub bbone: BBoneShape,
    /// Custom start handle bone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbone_custom_handle_start: Option<BoneId>,
    /// Custom end handle bone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbone_custom_handle_end: Option<BoneId>,
    /// Edit-time custom properties.
    #[serde(default, skip_serializing_if = "IdProperties::is_empty")]
    pub props: IdProperties,
}

impl EditBone {
    /// Creates a bone with the host's defaults: one unit long along +Y.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            head: [0.0, 0.0, 0.0],
            tail: [0.0, 1.0, 0.0],
            roll: 0.0,
            use_connect: false,
            parent: None,
            bbone: BBoneShape::default(),
            bbone_custom_handle_start: None,
            bbone_custom_handle_end: None,
            props: IdProperties::new(),
        }
    }

    /// Returns the bone length.
    pub fn length(&self) -> f64 {
        let d = [
            self.tail[0] - self.head[0],
            self.tail[1] - self.head[1],
            self.tail[2] - self.head[2],
        ];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }
}

impl PropertyOwner for EditBone {
    fn id_props(&self) -> &IdProperties {
        &self.props
    }

    fn id_props_mut(&mut self) -> &mut IdProperties {
        &mut self.props
    }
}

/// Behavioral half of a live bone, writable outside edit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseBone {
    /// Bone name.
    pub name: String,
    /// Behavioral flags.
    #[serde(default)]
    pub behavior: BoneBehavior,
    /// Bone whose transform drives the custom shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_shape_transform: Option<BoneId>,
    /// Pose-time custom properties.
    #[serde(default, skip_serializing_if = "IdProperties::is_empty")]
    pub props: IdProperties,
    /// Constraint stack, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl PoseBone {
    /// Creates a pose bone with default flags and no constraints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: BoneBehavior::default(),
            custom_shape_transform: None,
            props: IdProperties::new(),
            constraints: Vec::new(),
        }
    }

    /// Returns the constraint with the given name.
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Returns the constraint with the given name for writing.
    pub fn constraint_mut(&mut self, name: &str) -> Option<&mut Constraint> {
        self.constraints.iter_mut().find(|c| c.name == name)
    }

    /// Returns the stack index of the named constraint.
    pub fn constraint_index(&self, name: &str) -> Option<usize> {
        self.constraints.iter().position(|c| c.name == name)
    }

    /// Returns `name`, or `name.001`, `name.002`... if taken.
    pub fn unique_constraint_name(&self, name: &str) -> String {
        if self.constraint(name).is_none() {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{}.{:03}", name, n))
            .find(|candidate| self.constraint(candidate).is_none())
            .unwrap_or_else(|| name.to_string())
    }

    /// Appends a constraint, renaming it if its name is taken.
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> &mut Constraint {
        constraint.name = self.unique_constraint_name(&constraint.name);
        self.constraints.push(constraint);
        let last = self.constraints.len() - 1;
        &mut self.constraints[last]
    }

    /// Replaces the same-named constraint in place, or appends.
    pub fn put_constraint(&mut self, constraint: Constraint) -> &mut Constraint {
        match self.constraint_index(&constraint.name) {
            Some(index) => {
                self.constraints[index] = constraint;
                &mut self.constraints[index]
            }
            None => {
                self.constraints.push(constraint);
                let last = self.constraints.len() - 1;
                &mut self.constraints[last]
            }
        }
    }
}

impl PropertyOwner for PoseBone {
    fn id_props(&self) -> &IdProperties {
        &self.props
    }

    fn id_props_mut(&mut self) -> &mut IdProperties {
        &mut self.props
    }
}
