//! Custom property descriptions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::driver::{DriverTargetSpec, DriverVariableSpec};
use crate::live::{IdProperty, PropertyOwner, PropertyUi, VariableType};
use crate::naming::pose_bone_path;

/// A custom property with its default value and UI metadata.
///
/// Materializing overwrites both the value and the metadata, so doing it twice
/// leaves the owner in the same state as doing it once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    /// Property name. Filled from the map key when read from a keyed map.
    #[serde(default)]
    pub name: String,
    /// Default (and initial) value.
    #[serde(default)]
    pub default: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Slider minimum; falls back to `min`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_min: Option<f64>,
    /// Slider maximum; falls back to `max`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_max: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether library overrides may change the value.
    #[serde(default)]
    pub overridable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl PropertySpec {
    /// Creates a property with a default value and no range.
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            min: None,
            max: None,
            soft_min: None,
            soft_max: None,
            description: String::new(),
            overridable: false,
            subtype: None,
        }
    }

    /// Sets the hard range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets the soft (slider) range.
    pub fn with_soft_range(mut self, soft_min: f64, soft_max: f64) -> Self {
        self.soft_min = Some(soft_min);
        self.soft_max = Some(soft_max);
        self
    }

    /// Sets the tooltip text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the property as library-overridable.
    pub fn with_overridable(mut self, overridable: bool) -> Self {
        self.overridable = overridable;
        self
    }

    /// Sets the display subtype.
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Builds a spec from a live property, taking its current value as default.
    pub fn from_live(name: impl Into<String>, live: &IdProperty) -> Self {
        Self {
            name: name.into(),
            default: live.value.clone(),
            min: live.ui.min,
            max: live.ui.max,
            soft_min: live.ui.soft_min,
            soft_max: live.ui.soft_max,
            description: live.ui.description.clone(),
            overridable: live.overridable,
            subtype: live.ui.subtype.clone(),
        }
    }

    /// Writes the property onto `owner`, replacing any previous value and metadata.
    pub fn make_real<O: PropertyOwner + ?Sized>(&self, owner: &mut O) {
        let property = IdProperty {
            value: self.default.clone(),
            ui: PropertyUi {
                default: self.default.clone(),
                min: self.min,
                max: self.max,
                soft_min: self.soft_min.or(self.min),
                soft_max: self.soft_max.or(self.max),
                description: self.description.clone(),
                subtype: self.subtype.clone(),
            },
            overridable: self.overridable,
        };
        owner.id_props_mut().insert(self.name.clone(), property);
    }

    /// Builds a single-property driver variable that reads this property.
    ///
    /// `id` names the object holding the property; with `bone` set the property
    /// is read from that pose bone instead of the object itself.
    pub fn to_driver_variable(&self, id: &str, bone: Option<&str>) -> DriverVariableSpec {
        let data_path = match bone {
            Some(bone) => format!("{}[\"{}\"]", pose_bone_path(bone), self.name),
            None => format!("[\"{}\"]", self.name),
        };
        DriverVariableSpec {
            name: variable_name(&self.name),
            var_type: VariableType::SingleProp,
            targets: vec![DriverTargetSpec::single_prop(id, data_path)],
        }
    }
}

/// Turns a property name into a valid expression identifier.
fn variable_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
