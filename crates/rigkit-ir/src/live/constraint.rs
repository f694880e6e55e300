//! Typed bone constraints with named-field write tables.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_field, write_field, Axis, FieldStatus, Space, Vec3};
use crate::error::{HostError, HostResult};

// =============================================================================
// Constraint kinds
// =============================================================================

/// The closed set of constraint kinds a rig may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    CopyLocation,
    CopyRotation,
    CopyScale,
    CopyTransforms,
    LimitLocation,
    LimitRotation,
    LimitScale,
    LimitDistance,
    DampedTrack,
    LockedTrack,
    TrackTo,
    StretchTo,
    Ik,
    Armature,
    Action,
    Transform,
    ChildOf,
}

impl ConstraintKind {
    /// Every constraint kind.
    pub const ALL: [ConstraintKind; 17] = [
        ConstraintKind::CopyLocation,
        ConstraintKind::CopyRotation,
        ConstraintKind::CopyScale,
        ConstraintKind::CopyTransforms,
        ConstraintKind::LimitLocation,
        ConstraintKind::LimitRotation,
        ConstraintKind::LimitScale,
        ConstraintKind::LimitDistance,
        ConstraintKind::DampedTrack,
        ConstraintKind::LockedTrack,
        ConstraintKind::TrackTo,
        ConstraintKind::StretchTo,
        ConstraintKind::Ik,
        ConstraintKind::Armature,
        ConstraintKind::Action,
        ConstraintKind::Transform,
        ConstraintKind::ChildOf,
    ];

    /// Returns the host identifier (e.g. "LIMIT_LOCATION").
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::CopyLocation => "COPY_LOCATION",
            ConstraintKind::CopyRotation => "COPY_ROTATION",
            ConstraintKind::CopyScale => "COPY_SCALE",
            ConstraintKind::CopyTransforms => "COPY_TRANSFORMS",
            ConstraintKind::LimitLocation => "LIMIT_LOCATION",
            ConstraintKind::LimitRotation => "LIMIT_ROTATION",
            ConstraintKind::LimitScale => "LIMIT_SCALE",
            ConstraintKind::LimitDistance => "LIMIT_DISTANCE",
            ConstraintKind::DampedTrack => "DAMPED_TRACK",
            ConstraintKind::LockedTrack => "LOCKED_TRACK",
            ConstraintKind::TrackTo => "TRACK_TO",
            ConstraintKind::StretchTo => "STRETCH_TO",
            ConstraintKind::Ik => "IK",
            ConstraintKind::Armature => "ARMATURE",
            ConstraintKind::Action => "ACTION",
            ConstraintKind::Transform => "TRANSFORM",
            ConstraintKind::ChildOf => "CHILD_OF",
        }
    }

    /// Returns the name the host gives a new constraint of this kind.
    pub fn default_name(&self) -> &'static str {
        match self {
            ConstraintKind::CopyLocation => "Copy Location",
            ConstraintKind::CopyRotation => "Copy Rotation",
            ConstraintKind::CopyScale => "Copy Scale",
            ConstraintKind::CopyTransforms => "Copy Transforms",
            ConstraintKind::LimitLocation => "Limit Location",
            ConstraintKind::LimitRotation => "Limit Rotation",
            ConstraintKind::LimitScale => "Limit Scale",
            ConstraintKind::LimitDistance => "Limit Distance",
            ConstraintKind::DampedTrack => "Damped Track",
            ConstraintKind::LockedTrack => "Locked Track",
            ConstraintKind::TrackTo => "Track To",
            ConstraintKind::StretchTo => "Stretch To",
            ConstraintKind::Ik => "IK",
            ConstraintKind::Armature => "Armature",
            ConstraintKind::Action => "Action",
            ConstraintKind::Transform => "Transformation",
            ConstraintKind::ChildOf => "Child Of",
        }
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Axis enums
// =============================================================================

/// Bone axis that a tracking constraint points at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackAxis {
    TrackX,
    #[default]
    TrackY,
    TrackZ,
    TrackNegativeX,
    TrackNegativeY,
    TrackNegativeZ,
}

impl TrackAxis {
    /// Returns the axis as seen from a bone mirrored across X.
    pub fn mirrored_x(&self) -> Self {
        match self {
            TrackAxis::TrackX => TrackAxis::TrackNegativeX,
            TrackAxis::TrackNegativeX => TrackAxis::TrackX,
            other => *other,
        }
    }
}

/// Transform channel mapped by a transformation constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformChannel {
    #[default]
    Location,
    Rotation,
    Scale,
}

impl TransformChannel {
    /// All channels in table order.
    pub const ALL: [TransformChannel; 3] = [
        TransformChannel::Location,
        TransformChannel::Rotation,
        TransformChannel::Scale,
    ];

    /// Returns the table index (location = 0).
    pub fn index(&self) -> usize {
        match self {
            TransformChannel::Location => 0,
            TransformChannel::Rotation => 1,
            TransformChannel::Scale => 2,
        }
    }
}

/// Single transform channel read by an action constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionChannel {
    LocationX,
    LocationY,
    LocationZ,
    #[default]
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

// =============================================================================
// Per-kind settings
// =============================================================================

/// Settings shared by the copy-location and copy-rotation constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyAxes {
    pub use_axis: [bool; 3],
    pub invert: [bool; 3],
    pub use_offset: bool,
    pub head_tail: f64,
    pub mix_mode: String,
    pub euler_order: String,
}

impl Default for CopyAxes {
    fn default() -> Self {
        Self {
            use_axis: [true; 3],
            invert: [false; 3],
            use_offset: false,
            head_tail: 0.0,
            mix_mode: "REPLACE".to_string(),
            euler_order: "AUTO".to_string(),
        }
    }
}

impl CopyAxes {
    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        if let Some(i) = axis_suffix(field, "use_") {
            return write_field(&mut self.use_axis[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "invert_") {
            return write_field(&mut self.invert[i], field, value);
        }
        match field {
            "use_offset" => write_field(&mut self.use_offset, field, value),
            "head_tail" => write_field(&mut self.head_tail, field, value),
            "mix_mode" => write_field(&mut self.mix_mode, field, value),
            "euler_order" => write_field(&mut self.euler_order, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

/// Copy-scale settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyScale {
    pub use_axis: [bool; 3],
    pub use_offset: bool,
    pub use_add: bool,
    pub use_make_uniform: bool,
    pub power: f64,
}

impl Default for CopyScale {
    fn default() -> Self {
        Self {
            use_axis: [true; 3],
            use_offset: false,
            use_add: false,
            use_make_uniform: false,
            power: 1.0,
        }
    }
}

impl CopyScale {
    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        if let Some(i) = axis_suffix(field, "use_") {
            return write_field(&mut self.use_axis[i], field, value);
        }
        match field {
            "use_offset" => write_field(&mut self.use_offset, field, value),
            "use_add" => write_field(&mut self.use_add, field, value),
            "use_make_uniform" => write_field(&mut self.use_make_uniform, field, value),
            "power" => write_field(&mut self.power, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

/// Copy-transforms settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyTransforms {
    pub mix_mode: String,
    pub head_tail: f64,
}

impl Default for CopyTransforms {
    fn default() -> Self {
        Self {
            mix_mode: "REPLACE".to_string(),
            head_tail: 0.0,
        }
    }
}

/// Min/max limits per axis, used by limit-location and limit-scale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub use_min: [bool; 3],
    pub use_max: [bool; 3],
    pub min: Vec3,
    pub max: Vec3,
    pub use_transform_limit: bool,
}

impl Limits {
    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        if let Some(i) = axis_suffix(field, "use_min_") {
            return write_field(&mut self.use_min[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "use_max_") {
            return write_field(&mut self.use_max[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "min_") {
            return write_field(&mut self.min[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "max_") {
            return write_field(&mut self.max[i], field, value);
        }
        match field {
            "use_transform_limit" => write_field(&mut self.use_transform_limit, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

/// Rotation limits per axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationLimits {
    pub use_limit: [bool; 3],
    pub min: Vec3,
    pub max: Vec3,
    pub use_transform_limit: bool,
}

impl RotationLimits {
    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        if let Some(i) = axis_suffix(field, "use_limit_") {
            return write_field(&mut self.use_limit[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "min_") {
            return write_field(&mut self.min[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "max_") {
            return write_field(&mut self.max[i], field, value);
        }
        match field {
            "use_transform_limit" => write_field(&mut self.use_transform_limit, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

/// Limit-distance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitDistance {
    pub distance: f64,
    pub limit_mode: String,
    pub head_tail: f64,
}

impl Default for LimitDistance {
    fn default() -> Self {
        Self {
            distance: 0.0,
            limit_mode: "LIMITDIST_INSIDE".to_string(),
            head_tail: 0.0,
        }
    }
}

/// Settings of the three tracking constraints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tracking {
    pub track_axis: TrackAxis,
    /// Locked axis (locked track) or up axis (track to).
    pub secondary_axis: Axis,
    pub use_target_z: bool,
    pub head_tail: f64,
}

impl Tracking {
    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        match field {
            "track_axis" => write_field(&mut self.track_axis, field, value),
            "lock_axis" | "up_axis" => {
                let raw: String = parse_field(field, value)?;
                let letter = raw.chars().last().and_then(Axis::from_letter);
                self.secondary_axis = letter
                    .ok_or_else(|| HostError::invalid_field(field, format!("unknown axis '{}'", raw)))?;
                Ok(FieldStatus::Applied)
            }
            "use_target_z" => write_field(&mut self.use_target_z, field, value),
            "head_tail" => write_field(&mut self.head_tail, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

/// Stretch-to settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchTo {
    pub rest_length: f64,
    pub bulge: f64,
    pub volume: String,
    pub keep_axis: String,
    pub head_tail: f64,
}

impl Default for StretchTo {
    fn default() -> Self {
        Self {
            rest_length: 0.0,
            bulge: 1.0,
            volume: "VOLUME_XZX".to_string(),
            keep_axis: "PLANE_X".to_string(),
            head_tail: 0.0,
        }
    }
}

/// Inverse-kinematics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InverseKinematics {
    pub pole_target: Option<String>,
    pub pole_subtarget: String,
    /// Pole angle in radians.
    pub pole_angle: f64,
    pub chain_count: u32,
    pub iterations: u32,
    pub use_tail: bool,
    pub use_stretch: bool,
    pub use_rotation: bool,
    pub weight: f64,
    pub orient_weight: f64,
}

impl Default for InverseKinematics {
    fn default() -> Self {
        Self {
            pole_target: None,
            pole_subtarget: String::new(),
            pole_angle: 0.0,
            chain_count: 0,
            iterations: 500,
            use_tail: true,
            use_stretch: true,
            use_rotation: false,
            weight: 1.0,
            orient_weight: 1.0,
        }
    }
}

/// One bone target of an armature constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmatureTarget {
    pub target: Option<String>,
    pub subtarget: String,
    pub weight: f64,
}

impl Default for ArmatureTarget {
    fn default() -> Self {
        Self {
            target: None,
            subtarget: String::new(),
            weight: 1.0,
        }
    }
}

/// Fields of a target entry that are copied; everything else is skipped.
const ARMATURE_TARGET_FIELDS: [&str; 3] = ["target", "subtarget", "weight"];

/// Armature (multi-target) constraint settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmatureSettings {
    pub targets: Vec<ArmatureTarget>,
    pub use_deform_preserve_volume: bool,
    pub use_bone_envelopes: bool,
    pub use_current_location: bool,
}

impl ArmatureSettings {
    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        match field {
            "targets" => {
                self.targets = parse_armature_targets(value)?;
                Ok(FieldStatus::Applied)
            }
            "use_deform_preserve_volume" => {
                write_field(&mut self.use_deform_preserve_volume, field, value)
            }
            "use_bone_envelopes" => write_field(&mut self.use_bone_envelopes, field, value),
            "use_current_location" => write_field(&mut self.use_current_location, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

/// Builds armature targets from a list of maps, copying only the safe fields.
fn parse_armature_targets(value: &Value) -> HostResult<Vec<ArmatureTarget>> {
    let entries = value
        .as_array()
        .ok_or_else(|| HostError::invalid_field("targets", "expected a list of target maps"))?;
    let mut targets = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let map = entry.as_object().ok_or_else(|| {
            HostError::invalid_field(format!("targets[{}]", index), "expected a map")
        })?;
        let mut target = ArmatureTarget::default();
        for key in ARMATURE_TARGET_FIELDS {
            let Some(v) = map.get(key) else { continue };
            let path = format!("targets[{}].{}", index, key);
            match key {
                "target" => target.target = parse_field(&path, v)?,
                "subtarget" => target.subtarget = parse_field(&path, v)?,
                _ => target.weight = parse_field(&path, v)?,
            }
        }
        targets.push(target);
    }
    Ok(targets)
}

/// Action constraint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSettings {
    pub action: Option<String>,
    pub transform_channel: ActionChannel,
    pub frame_start: i32,
    pub frame_end: i32,
    pub min: f64,
    pub max: f64,
    pub mix_mode: String,
    pub use_bone_object_action: bool,
    pub use_eval_time: bool,
    pub eval_time: f64,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            action: None,
            transform_channel: ActionChannel::RotationX,
            frame_start: 1,
            frame_end: 2,
            min: 0.0,
            max: 0.0,
            mix_mode: "AFTER_FULL".to_string(),
            use_bone_object_action: false,
            use_eval_time: false,
            eval_time: 0.0,
        }
    }
}

/// Per-axis min/max ranges of one transform channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisRanges {
    pub min: Vec3,
    pub max: Vec3,
}

/// Ranges of every channel on one side (from/to) of a transformation constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRanges {
    pub location: AxisRanges,
    pub rotation: AxisRanges,
    pub scale: AxisRanges,
}

impl Default for ChannelRanges {
    fn default() -> Self {
        Self {
            location: AxisRanges::default(),
            rotation: AxisRanges::default(),
            scale: AxisRanges {
                min: [1.0; 3],
                max: [1.0; 3],
            },
        }
    }
}

impl ChannelRanges {
    /// Returns the ranges of a channel.
    pub fn get(&self, channel: TransformChannel) -> &AxisRanges {
        match channel {
            TransformChannel::Location => &self.location,
            TransformChannel::Rotation => &self.rotation,
            TransformChannel::Scale => &self.scale,
        }
    }

    /// Returns the ranges of a channel for writing.
    pub fn get_mut(&mut self, channel: TransformChannel) -> &mut AxisRanges {
        match channel {
            TransformChannel::Location => &mut self.location,
            TransformChannel::Rotation => &mut self.rotation,
            TransformChannel::Scale => &mut self.scale,
        }
    }
}

/// Transformation (map-from / map-to) constraint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformMapping {
    pub map_from: TransformChannel,
    pub map_to: TransformChannel,
    pub map_to_x_from: Axis,
    pub map_to_y_from: Axis,
    pub map_to_z_from: Axis,
    pub from: ChannelRanges,
    pub to: ChannelRanges,
    pub use_motion_extrapolate: bool,
    pub from_rotation_mode: String,
    pub to_euler_order: String,
    pub mix_mode: String,
}

impl Default for TransformMapping {
    fn default() -> Self {
        Self {
            map_from: TransformChannel::Location,
            map_to: TransformChannel::Location,
            map_to_x_from: Axis::X,
            map_to_y_from: Axis::Y,
            map_to_z_from: Axis::Z,
            from: ChannelRanges::default(),
            to: ChannelRanges::default(),
            use_motion_extrapolate: false,
            from_rotation_mode: "AUTO".to_string(),
            to_euler_order: "AUTO".to_string(),
            mix_mode: "ADD".to_string(),
        }
    }
}

impl TransformMapping {
    /// Returns the source axis that drives a destination axis.
    pub fn source_axis(&self, to_axis: Axis) -> Axis {
        match to_axis {
            Axis::X => self.map_to_x_from,
            Axis::Y => self.map_to_y_from,
            Axis::Z => self.map_to_z_from,
        }
    }

    /// Maps an input value on the source axis of `to_axis` to the output value.
    ///
    /// This is the linear range mapping with extrapolation; a degenerate source
    /// range maps everything to `to_min`.
    pub fn map_axis(&self, to_axis: Axis, input: f64) -> f64 {
        let i = self.source_axis(to_axis).index();
        let j = to_axis.index();
        let from = self.from.get(self.map_from);
        let to = self.to.get(self.map_to);
        let span = from.max[i] - from.min[i];
        if span.abs() < f64::EPSILON {
            return to.min[j];
        }
        let t = (input - from.min[i]) / span;
        to.min[j] + t * (to.max[j] - to.min[j])
    }

    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        if let Some((side, is_min, axis, channel)) = parse_range_field(field) {
            let ranges = match side {
                RangeSide::From => self.from.get_mut(channel),
                RangeSide::To => self.to.get_mut(channel),
            };
            let slot = if is_min {
                &mut ranges.min[axis.index()]
            } else {
                &mut ranges.max[axis.index()]
            };
            return write_field(slot, field, value);
        }
        match field {
            "map_from" => write_field(&mut self.map_from, field, value),
            "map_to" => write_field(&mut self.map_to, field, value),
            "map_to_x_from" => write_field(&mut self.map_to_x_from, field, value),
            "map_to_y_from" => write_field(&mut self.map_to_y_from, field, value),
            "map_to_z_from" => write_field(&mut self.map_to_z_from, field, value),
            "use_motion_extrapolate" => write_field(&mut self.use_motion_extrapolate, field, value),
            "from_rotation_mode" => write_field(&mut self.from_rotation_mode, field, value),
            "to_euler_order" => write_field(&mut self.to_euler_order, field, value),
            "mix_mode" | "mix_mode_loc" | "mix_mode_rot" | "mix_mode_scale" => {
                write_field(&mut self.mix_mode, field, value)
            }
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeSide {
    From,
    To,
}

/// Parses names like `from_min_x`, `to_max_y_rot`, `from_min_z_scale`.
fn parse_range_field(field: &str) -> Option<(RangeSide, bool, Axis, TransformChannel)> {
    let (side, rest) = if let Some(rest) = field.strip_prefix("from_") {
        (RangeSide::From, rest)
    } else {
        (RangeSide::To, field.strip_prefix("to_")?)
    };
    let (is_min, rest) = if let Some(rest) = rest.strip_prefix("min_") {
        (true, rest)
    } else {
        (false, rest.strip_prefix("max_")?)
    };
    let mut chars = rest.chars();
    let axis = chars.next().and_then(Axis::from_letter)?;
    let channel = match chars.as_str() {
        "" => TransformChannel::Location,
        "_rot" => TransformChannel::Rotation,
        "_scale" => TransformChannel::Scale,
        _ => return None,
    };
    Some((side, is_min, axis, channel))
}

/// Child-of settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildOf {
    pub use_location: [bool; 3],
    pub use_rotation: [bool; 3],
    pub use_scale: [bool; 3],
    pub set_inverse_pending: bool,
    pub inverse_matrix: [[f64; 4]; 4],
}

impl Default for ChildOf {
    fn default() -> Self {
        let mut identity = [[0.0; 4]; 4];
        for (i, row) in identity.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self {
            use_location: [true; 3],
            use_rotation: [true; 3],
            use_scale: [true; 3],
            set_inverse_pending: false,
            inverse_matrix: identity,
        }
    }
}

impl ChildOf {
    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        if let Some(i) = axis_suffix(field, "use_location_") {
            return write_field(&mut self.use_location[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "use_rotation_") {
            return write_field(&mut self.use_rotation[i], field, value);
        }
        if let Some(i) = axis_suffix(field, "use_scale_") {
            return write_field(&mut self.use_scale[i], field, value);
        }
        match field {
            "set_inverse_pending" => write_field(&mut self.set_inverse_pending, field, value),
            "inverse_matrix" => write_field(&mut self.inverse_matrix, field, value),
            _ => Ok(FieldStatus::Ignored),
        }
    }
}

/// Kind-specific constraint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintData {
    CopyLocation(CopyAxes),
    CopyRotation(CopyAxes),
    CopyScale(CopyScale),
    CopyTransforms(CopyTransforms),
    LimitLocation(Limits),
    LimitRotation(RotationLimits),
    LimitScale(Limits),
    LimitDistance(LimitDistance),
    DampedTrack(Tracking),
    LockedTrack(Tracking),
    TrackTo(Tracking),
    StretchTo(StretchTo),
    Ik(InverseKinematics),
    Armature(ArmatureSettings),
    Action(ActionSettings),
    Transform(TransformMapping),
    ChildOf(ChildOf),
}

impl ConstraintData {
    /// Returns default settings for a constraint kind.
    pub fn default_for(kind: ConstraintKind) -> Self {
        match kind {
            ConstraintKind::CopyLocation => ConstraintData::CopyLocation(CopyAxes::default()),
            ConstraintKind::CopyRotation => ConstraintData::CopyRotation(CopyAxes::default()),
            ConstraintKind::CopyScale => ConstraintData::CopyScale(CopyScale::default()),
            ConstraintKind::CopyTransforms => {
                ConstraintData::CopyTransforms(CopyTransforms::default())
            }
            ConstraintKind::LimitLocation => ConstraintData::LimitLocation(Limits::default()),
            ConstraintKind::LimitRotation => {
                ConstraintData::LimitRotation(RotationLimits::default())
            }
            ConstraintKind::LimitScale => ConstraintData::LimitScale(Limits::default()),
            ConstraintKind::LimitDistance => {
                ConstraintData::LimitDistance(LimitDistance::default())
            }
            ConstraintKind::DampedTrack => ConstraintData::DampedTrack(Tracking::default()),
            ConstraintKind::LockedTrack => ConstraintData::LockedTrack(Tracking {
                track_axis: TrackAxis::TrackY,
                secondary_axis: Axis::Z,
                ..Tracking::default()
            }),
            ConstraintKind::TrackTo => ConstraintData::TrackTo(Tracking {
                secondary_axis: Axis::Z,
                ..Tracking::default()
            }),
            ConstraintKind::StretchTo => ConstraintData::StretchTo(StretchTo::default()),
            ConstraintKind::Ik => ConstraintData::Ik(InverseKinematics::default()),
            ConstraintKind::Armature => ConstraintData::Armature(ArmatureSettings::default()),
            ConstraintKind::Action => ConstraintData::Action(ActionSettings::default()),
            ConstraintKind::Transform => ConstraintData::Transform(TransformMapping::default()),
            ConstraintKind::ChildOf => ConstraintData::ChildOf(ChildOf::default()),
        }
    }

    /// Returns the kind of these settings.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            ConstraintData::CopyLocation(_) => ConstraintKind::CopyLocation,
            ConstraintData::CopyRotation(_) => ConstraintKind::CopyRotation,
            ConstraintData::CopyScale(_) => ConstraintKind::CopyScale,
            ConstraintData::CopyTransforms(_) => ConstraintKind::CopyTransforms,
            ConstraintData::LimitLocation(_) => ConstraintKind::LimitLocation,
            ConstraintData::LimitRotation(_) => ConstraintKind::LimitRotation,
            ConstraintData::LimitScale(_) => ConstraintKind::LimitScale,
            ConstraintData::LimitDistance(_) => ConstraintKind::LimitDistance,
            ConstraintData::DampedTrack(_) => ConstraintKind::DampedTrack,
            ConstraintData::LockedTrack(_) => ConstraintKind::LockedTrack,
            ConstraintData::TrackTo(_) => ConstraintKind::TrackTo,
            ConstraintData::StretchTo(_) => ConstraintKind::StretchTo,
            ConstraintData::Ik(_) => ConstraintKind::Ik,
            ConstraintData::Armature(_) => ConstraintKind::Armature,
            ConstraintData::Action(_) => ConstraintKind::Action,
            ConstraintData::Transform(_) => ConstraintKind::Transform,
            ConstraintData::ChildOf(_) => ConstraintKind::ChildOf,
        }
    }

    fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        match self {
            ConstraintData::CopyLocation(d) | ConstraintData::CopyRotation(d) => {
                d.set_field(field, value)
            }
            ConstraintData::CopyScale(d) => d.set_field(field, value),
            ConstraintData::CopyTransforms(d) => match field {
                "mix_mode" => write_field(&mut d.mix_mode, field, value),
                "head_tail" => write_field(&mut d.head_tail, field, value),
                _ => Ok(FieldStatus::Ignored),
            },
            ConstraintData::LimitLocation(d) | ConstraintData::LimitScale(d) => {
                d.set_field(field, value)
            }
            ConstraintData::LimitRotation(d) => d.set_field(field, value),
            ConstraintData::LimitDistance(d) => match field {
                "distance" => write_field(&mut d.distance, field, value),
                "limit_mode" => write_field(&mut d.limit_mode, field, value),
                "head_tail" => write_field(&mut d.head_tail, field, value),
                _ => Ok(FieldStatus::Ignored),
            },
            ConstraintData::DampedTrack(d)
            | ConstraintData::LockedTrack(d)
            | ConstraintData::TrackTo(d) => d.set_field(field, value),
            ConstraintData::StretchTo(d) => match field {
                "rest_length" => write_field(&mut d.rest_length, field, value),
                "bulge" => write_field(&mut d.bulge, field, value),
                "volume" => write_field(&mut d.volume, field, value),
                "keep_axis" => write_field(&mut d.keep_axis, field, value),
                "head_tail" => write_field(&mut d.head_tail, field, value),
                _ => Ok(FieldStatus::Ignored),
            },
            ConstraintData::Ik(d) => match field {
                "pole_target" => write_field(&mut d.pole_target, field, value),
                "pole_subtarget" => write_field(&mut d.pole_subtarget, field, value),
                "pole_angle" => write_field(&mut d.pole_angle, field, value),
                "chain_count" => write_field(&mut d.chain_count, field, value),
                "iterations" => write_field(&mut d.iterations, field, value),
                "use_tail" => write_field(&mut d.use_tail, field, value),
                "use_stretch" => write_field(&mut d.use_stretch, field, value),
                "use_rotation" => write_field(&mut d.use_rotation, field, value),
                "weight" => write_field(&mut d.weight, field, value),
                "orient_weight" => write_field(&mut d.orient_weight, field, value),
                _ => Ok(FieldStatus::Ignored),
            },
            ConstraintData::Armature(d) => d.set_field(field, value),
            ConstraintData::Action(d) => match field {
                "action" => write_field(&mut d.action, field, value),
                "transform_channel" => write_field(&mut d.transform_channel, field, value),
                "frame_start" => write_field(&mut d.frame_start, field, value),
                "frame_end" => write_field(&mut d.frame_end, field, value),
                "min" => write_field(&mut d.min, field, value),
                "max" => write_field(&mut d.max, field, value),
                "mix_mode" => write_field(&mut d.mix_mode, field, value),
                "use_bone_object_action" => {
                    write_field(&mut d.use_bone_object_action, field, value)
                }
                "use_eval_time" => write_field(&mut d.use_eval_time, field, value),
                "eval_time" => write_field(&mut d.eval_time, field, value),
                _ => Ok(FieldStatus::Ignored),
            },
            ConstraintData::Transform(d) => d.set_field(field, value),
            ConstraintData::ChildOf(d) => d.set_field(field, value),
        }
    }
}

/// Returns the axis index if `field` is `prefix` followed by `x`, `y` or `z`.
fn axis_suffix(field: &str, prefix: &str) -> Option<usize> {
    let rest = field.strip_prefix(prefix)?;
    let mut chars = rest.chars();
    let axis = chars.next().and_then(Axis::from_letter)?;
    if chars.next().is_some() || rest.starts_with(char::is_uppercase) {
        return None;
    }
    Some(axis.index())
}

// =============================================================================
// Constraint
// =============================================================================

/// A live constraint on a pose bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint name, unique per bone.
    pub name: String,
    /// Blend factor between 0 and 1.
    #[serde(default = "default_influence")]
    pub influence: f64,
    /// Disabled flag.
    #[serde(default)]
    pub mute: bool,
    /// Space the owner transform is evaluated in.
    #[serde(default)]
    pub owner_space: Space,
    /// Space the target transform is evaluated in.
    #[serde(default)]
    pub target_space: Space,
    /// Target object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Target bone name on an armature target, empty for none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtarget: String,
    /// Kind-specific settings.
    #[serde(flatten)]
    pub data: ConstraintData,
}

fn default_influence() -> f64 {
    1.0
}

impl Constraint {
    /// Creates a constraint with the host's default name and settings.
    pub fn new(kind: ConstraintKind) -> Self {
        Self::named(kind, kind.default_name())
    }

    /// Creates a constraint with default settings and the given name.
    pub fn named(kind: ConstraintKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            influence: 1.0,
            mute: false,
            owner_space: Space::World,
            target_space: Space::World,
            target: None,
            subtarget: String::new(),
            data: ConstraintData::default_for(kind),
        }
    }

    /// Returns the constraint kind.
    pub fn kind(&self) -> ConstraintKind {
        self.data.kind()
    }

    /// Returns true if the constraint targets the object named `rig`.
    pub fn targets(&self, rig: &str) -> bool {
        self.target.as_deref() == Some(rig)
    }

    /// Writes a field by its host name.
    ///
    /// Unknown names return [`FieldStatus::Ignored`]; values of the wrong type
    /// return [`HostError::InvalidFieldValue`]. The kind cannot be changed.
    pub fn set_field(&mut self, field: &str, value: &Value) -> HostResult<FieldStatus> {
        match field {
            "name" => write_field(&mut self.name, field, value),
            "influence" => {
                let influence: f64 = parse_field(field, value)?;
                if !(0.0..=1.0).contains(&influence) {
                    return Err(HostError::invalid_field(
                        field,
                        format!("{} is outside 0..1", influence),
                    ));
                }
                self.influence = influence;
                Ok(FieldStatus::Applied)
            }
            "mute" => write_field(&mut self.mute, field, value),
            "owner_space" => write_field(&mut self.owner_space, field, value),
            "target_space" => write_field(&mut self.target_space, field, value),
            "target" => write_field(&mut self.target, field, value),
            "subtarget" => write_field(&mut self.subtarget, field, value),
            "type" => Err(HostError::read_only(field, "constraint kind is fixed at creation")),
            _ => self.data.set_field(field, value),
        }
    }
}
