//! Live drivers: expressions attached to data paths of the rig object.

use serde::{Deserialize, Serialize};

use super::RotationMode;
use crate::error::{HostError, HostResult};

/// How a driver combines its variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverType {
    #[default]
    Scripted,
    Average,
    Sum,
    Min,
    Max,
}

/// Kind of a driver variable, which fixes its target count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    #[default]
    SingleProp,
    Transforms,
    RotationDiff,
    LocDiff,
}

impl VariableType {
    /// Number of targets a variable of this type carries.
    pub fn target_count(&self) -> usize {
        match self {
            VariableType::SingleProp | VariableType::Transforms => 1,
            VariableType::RotationDiff | VariableType::LocDiff => 2,
        }
    }
}

/// ID block type a single-property target reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdType {
    #[default]
    Object,
    Armature,
    Scene,
    Action,
    Material,
    Key,
}

/// Transform channel read by a transforms target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformType {
    #[default]
    LocX,
    LocY,
    LocZ,
    RotX,
    RotY,
    RotZ,
    RotW,
    ScaleX,
    ScaleY,
    ScaleZ,
    ScaleAvg,
}

/// Space a transforms target is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetSpace {
    #[default]
    WorldSpace,
    TransformSpace,
    LocalSpace,
}

/// One target slot of a driver variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverTarget {
    id_type: IdType,
    /// Name of the ID the target reads from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Bone name for transform targets.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bone_target: String,
    /// RNA path read on the ID.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data_path: String,
    pub transform_type: TransformType,
    pub transform_space: TargetSpace,
    pub rotation_mode: RotationMode,
}

impl DriverTarget {
    /// Returns the ID type.
    pub fn id_type(&self) -> IdType {
        self.id_type
    }
}

/// A named variable of a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverVariable {
    pub name: String,
    #[serde(rename = "type", default)]
    var_type: VariableType,
    #[serde(default)]
    targets: Vec<DriverTarget>,
}

impl DriverVariable {
    /// Creates a single-property variable with one empty target.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: VariableType::SingleProp,
            targets: vec![DriverTarget::default()],
        }
    }

    /// Returns the variable type.
    pub fn var_type(&self) -> VariableType {
        self.var_type
    }

    /// Changes the type, resizing the target list to match.
    pub fn set_type(&mut self, var_type: VariableType) {
        self.var_type = var_type;
        self.targets
            .resize_with(var_type.target_count(), DriverTarget::default);
    }

    /// Returns the targets; their count always matches the type.
    pub fn targets(&self) -> &[DriverTarget] {
        &self.targets
    }

    /// Returns the targets for writing.
    pub fn targets_mut(&mut self) -> &mut [DriverTarget] {
        &mut self.targets
    }

    /// Sets the ID type of a target; only single-property variables allow it.
    pub fn set_target_id_type(&mut self, index: usize, id_type: IdType) -> HostResult<()> {
        if self.var_type != VariableType::SingleProp {
            return Err(HostError::read_only(
                "id_type",
                format!("variable '{}' is not a single-property variable", self.name),
            ));
        }
        let target = self.targets.get_mut(index).ok_or_else(|| {
            HostError::invalid_field("targets", format!("no target at index {}", index))
        })?;
        target.id_type = id_type;
        Ok(())
    }
}

/// A driver attached to `(data_path, array_index)` on the rig object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub data_path: String,
    /// Array element, or -1 for a scalar property.
    #[serde(default = "default_array_index")]
    pub array_index: i32,
    #[serde(rename = "type", default)]
    pub driver_type: DriverType,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub use_self: bool,
    #[serde(default)]
    pub variables: Vec<DriverVariable>,
}

fn default_array_index() -> i32 {
    -1
}

impl Driver {
    /// Creates an empty scripted driver.
    pub fn new(data_path: impl Into<String>, array_index: i32) -> Self {
        Self {
            data_path: data_path.into(),
            array_index,
            driver_type: DriverType::Scripted,
            expression: String::new(),
            use_self: false,
            variables: Vec::new(),
        }
    }

    /// Returns true if this driver sits at exactly `(path, index)`.
    pub fn is_at(&self, path: &str, index: i32) -> bool {
        self.data_path == path && self.array_index == index
    }

    /// Appends a new single-property variable and returns it.
    pub fn add_variable(&mut self, name: impl Into<String>) -> &mut DriverVariable {
        self.variables.push(DriverVariable::new(name));
        let last = self.variables.len() - 1;
        &mut self.variables[last]
    }

    /// Returns a variable by name.
    pub fn variable(&self, name: &str) -> Option<&DriverVariable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RigError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_type_resizes_targets() {
        let mut var = DriverVariable::new("d");
        assert_eq!(var.targets().len(), 1);
        var.set_type(VariableType::LocDiff);
        assert_eq!(var.targets().len(), 2);
        var.set_type(VariableType::Transforms);
        assert_eq!(var.targets().len(), 1);
    }

    #[test]
    fn test_id_type_only_for_single_prop() {
        let mut var = DriverVariable::new("v");
        var.set_target_id_type(0, IdType::Armature).unwrap();
        assert_eq!(var.targets()[0].id_type(), IdType::Armature);

        var.set_type(VariableType::Transforms);
        let err = var.set_target_id_type(0, IdType::Object).unwrap_err();
        assert_eq!(err.code(), "HOST_007");
    }

    #[test]
    fn test_driver_location() {
        let mut driver = Driver::new("pose.bones[\"A\"].location", 1);
        driver.add_variable("x").targets_mut()[0].id = Some("RIG".to_string());
        assert!(driver.is_at("pose.bones[\"A\"].location", 1));
        assert!(!driver.is_at("pose.bones[\"A\"].location", 0));
        assert_eq!(
            driver.variable("x").unwrap().targets()[0].id.as_deref(),
            Some("RIG")
        );
    }
}
