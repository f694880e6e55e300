//! Actions: keyframed animation curves stored on the host.

use serde::{Deserialize, Serialize};

/// A Bezier keyframe: control point plus both handles, as `[frame, value]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe {
    pub co: [f64; 2],
    pub handle_left: [f64; 2],
    pub handle_right: [f64; 2],
}

impl Keyframe {
    /// Creates a keyframe with flat handles one frame to either side.
    pub fn new(frame: f64, value: f64) -> Self {
        Self {
            co: [frame, value],
            handle_left: [frame - 1.0, value],
            handle_right: [frame + 1.0, value],
        }
    }

    /// Returns the keyframe with its value and both handle values negated.
    pub fn negated(&self) -> Self {
        Self {
            co: [self.co[0], -self.co[1]],
            handle_left: [self.handle_left[0], -self.handle_left[1]],
            handle_right: [self.handle_right[0], -self.handle_right[1]],
        }
    }
}

/// An animation curve for one array element of a data path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub data_path: String,
    #[serde(default)]
    pub array_index: i32,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl FCurve {
    /// Creates an empty curve.
    pub fn new(data_path: impl Into<String>, array_index: i32) -> Self {
        Self {
            data_path: data_path.into(),
            array_index,
            keyframes: Vec::new(),
        }
    }
}

/// A named collection of curves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

impl Action {
    /// Creates an empty action.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fcurves: Vec::new(),
        }
    }

    /// Returns the curve at `(data_path, array_index)`.
    pub fn fcurve(&self, data_path: &str, array_index: i32) -> Option<&FCurve> {
        self.fcurves
            .iter()
            .find(|c| c.data_path == data_path && c.array_index == array_index)
    }

    /// Replaces the curve at the same location, or appends it.
    pub fn put_fcurve(&mut self, curve: FCurve) {
        match self
            .fcurves
            .iter_mut()
            .find(|c| c.data_path == curve.data_path && c.array_index == curve.array_index)
        {
            Some(existing) => *existing = curve,
            None => self.fcurves.push(curve),
        }
    }
}
