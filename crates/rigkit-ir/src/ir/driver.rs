//! Driver descriptions and their realization onto a host.

use serde::{Deserialize, Serialize};

use crate::error::HostResult;
use crate::host::RigHost;
use crate::live::{
    Driver, DriverTarget, DriverType, DriverVariable, IdType, RotationMode, TargetSpace,
    TransformType, VariableType,
};

/// One target of a driver variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverTargetSpec {
    /// ID type; only applied to single-property variables.
    pub id_type: IdType,
    /// Name of the ID the target reads from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Bone to read a transform from.
    #[serde(alias = "bone_name", skip_serializing_if = "String::is_empty")]
    pub bone_target: String,
    /// RNA path read on the ID.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data_path: String,
    pub transform_type: TransformType,
    pub transform_space: TargetSpace,
    pub rotation_mode: RotationMode,
}

impl DriverTargetSpec {
    /// Target reading an RNA path on an object.
    pub fn single_prop(id: impl Into<String>, data_path: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            data_path: data_path.into(),
            ..Self::default()
        }
    }

    /// Target reading one transform channel of a bone.
    pub fn transform(
        id: impl Into<String>,
        bone: impl Into<String>,
        transform_type: TransformType,
        transform_space: TargetSpace,
    ) -> Self {
        Self {
            id: Some(id.into()),
            bone_target: bone.into(),
            transform_type,
            transform_space,
            ..Self::default()
        }
    }

    fn from_live(target: &DriverTarget) -> Self {
        Self {
            id_type: target.id_type(),
            id: target.id.clone(),
            bone_target: target.bone_target.clone(),
            data_path: target.data_path.clone(),
            transform_type: target.transform_type,
            transform_space: target.transform_space,
            rotation_mode: target.rotation_mode,
        }
    }

    /// Copies every field except the ID type, which the host only accepts on
    /// single-property variables.
    fn write_to(&self, target: &mut DriverTarget) {
        target.id = self.id.clone();
        target.bone_target = self.bone_target.clone();
        target.data_path = self.data_path.clone();
        target.transform_type = self.transform_type;
        target.transform_space = self.transform_space;
        target.rotation_mode = self.rotation_mode;
    }
}

/// A named driver variable with one or two targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverVariableSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub var_type: VariableType,
    #[serde(default)]
    pub targets: Vec<DriverTargetSpec>,
}

impl DriverVariableSpec {
    /// Variable reading a single property.
    pub fn single_prop(name: impl Into<String>, target: DriverTargetSpec) -> Self {
        Self {
            name: name.into(),
            var_type: VariableType::SingleProp,
            targets: vec![target],
        }
    }

    /// Variable reading a bone transform channel.
    pub fn transforms(name: impl Into<String>, target: DriverTargetSpec) -> Self {
        Self {
            name: name.into(),
            var_type: VariableType::Transforms,
            targets: vec![target],
        }
    }

    /// Variable measuring the difference between two transforms.
    pub fn difference(
        name: impl Into<String>,
        var_type: VariableType,
        first: DriverTargetSpec,
        second: DriverTargetSpec,
    ) -> Self {
        Self {
            name: name.into(),
            var_type,
            targets: vec![first, second],
        }
    }

    fn from_live(var: &DriverVariable) -> Self {
        Self {
            name: var.name.clone(),
            var_type: var.var_type(),
            targets: var.targets().iter().map(DriverTargetSpec::from_live).collect(),
        }
    }
}

/// A driver expression with its variables.
///
/// The expression may only reference names from `variables`; that is left to
/// the host's expression evaluator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverSpec {
    pub expression: String,
    pub variables: Vec<DriverVariableSpec>,
    pub use_self: bool,
    #[serde(rename = "type", alias = "aggregation")]
    pub aggregation: DriverType,
}

impl DriverSpec {
    /// Creates a scripted driver with the given expression.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Self::default()
        }
    }

    /// Appends a variable.
    pub fn with_variable(mut self, variable: DriverVariableSpec) -> Self {
        self.variables.push(variable);
        self
    }

    /// Sets how variables are combined.
    pub fn with_aggregation(mut self, aggregation: DriverType) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Lets the expression reference its owner as `self`.
    pub fn with_use_self(mut self, use_self: bool) -> Self {
        self.use_self = use_self;
        self
    }

    /// Captures a live driver.
    pub fn from_live(driver: &Driver) -> Self {
        Self {
            expression: driver.expression.clone(),
            variables: driver
                .variables
                .iter()
                .map(DriverVariableSpec::from_live)
                .collect(),
            use_self: driver.use_self,
            aggregation: driver.driver_type,
        }
    }

    /// Attaches the driver at exactly `(data_path, index)`.
    ///
    /// Any existing driver at that location is removed first, so calling this
    /// again replaces rather than stacks. Variables receive as many targets as
    /// their type has; extra target specs are ignored and missing ones stay at
    /// host defaults.
    pub fn make_real<'h, H: RigHost + ?Sized>(
        &self,
        host: &'h mut H,
        data_path: &str,
        index: i32,
    ) -> HostResult<&'h mut Driver> {
        host.remove_driver(data_path, index);
        let driver = host.add_driver(data_path, index)?;
        driver.expression = self.expression.clone();
        driver.driver_type = self.aggregation;
        driver.use_self = self.use_self;
        driver.variables.clear();

        for spec in &self.variables {
            let var = driver.add_variable(spec.name.clone());
            var.set_type(spec.var_type);
            for (target, target_spec) in var.targets_mut().iter_mut().zip(&spec.targets) {
                target_spec.write_to(target);
            }
            if var.var_type() == VariableType::SingleProp {
                let count = var.targets().len().min(spec.targets.len());
                for (i, target_spec) in spec.targets.iter().enumerate().take(count) {
                    var.set_target_id_type(i, target_spec.id_type)?;
                }
            }
        }
        Ok(driver)
    }
}
