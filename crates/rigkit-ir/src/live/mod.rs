//! Live rig data: what a host stores once the IR has been realized.
//!
//! These types mirror the host editor's object model closely enough that the
//! realizer and the mirror engine can write them field by field. Named field
//! access goes through explicit `set_field` tables rather than reflection.

mod action;
mod bone;
mod constraint;
mod driver;
mod props;

pub use action::*;
pub use bone::*;
pub use constraint::*;
pub use driver::*;
pub use props::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HostError, HostResult};

/// A 3D vector, stored by value.
pub type Vec3 = [f64; 3];

/// Whether a named field write was applied or ignored as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// The field exists and was written.
    Applied,
    /// The field name is unknown for this entity and was skipped.
    Ignored,
}

/// Deserializes `value` into `slot`, mapping failures to [`HostError::InvalidFieldValue`].
pub(crate) fn write_field<T: DeserializeOwned>(
    slot: &mut T,
    field: &str,
    value: &Value,
) -> HostResult<FieldStatus> {
    *slot = parse_field(field, value)?;
    Ok(FieldStatus::Applied)
}

/// Deserializes a field value into `T`.
pub(crate) fn parse_field<T: DeserializeOwned>(field: &str, value: &Value) -> HostResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| HostError::invalid_field(field, e.to_string()))
}

// =============================================================================
// Shared enums
// =============================================================================

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the component index (X = 0).
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Returns the lowercase axis letter used in field names.
    pub fn letter(&self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }

    /// Parses a lowercase or uppercase axis letter.
    pub fn from_letter(c: char) -> Option<Axis> {
        match c {
            'x' | 'X' => Some(Axis::X),
            'y' | 'Y' => Some(Axis::Y),
            'z' | 'Z' => Some(Axis::Z),
            _ => None,
        }
    }
}

/// Rotation mode of a pose bone or driver target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RotationMode {
    #[default]
    Quaternion,
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
    AxisAngle,
}

/// How a bone inherits scale from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InheritScale {
    #[default]
    Full,
    FixShear,
    Average,
    None,
    NoneLegacy,
    Aligned,
}

/// Bendy-bone handle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandleType {
    #[default]
    Auto,
    Absolute,
    Relative,
    Tangent,
}

/// Transform space of a constraint owner or target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Space {
    #[default]
    World,
    Pose,
    LocalWithParent,
    Local,
    Custom,
    LocalOwnerOrient,
}
