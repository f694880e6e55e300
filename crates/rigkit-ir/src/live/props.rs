//! Custom (ID) properties stored on live entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// UI metadata of a custom property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyUi {
    /// Value the property resets to.
    pub default: Value,
    /// Hard minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Hard maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Soft (slider) minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_min: Option<f64>,
    /// Soft (slider) maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_max: Option<f64>,
    /// Tooltip text.
    pub description: String,
    /// Display subtype (e.g. "FACTOR", "ANGLE").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

/// A custom property value with its UI metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdProperty {
    /// Current value.
    pub value: Value,
    /// UI metadata.
    #[serde(default)]
    pub ui: PropertyUi,
    /// Whether library overrides may change the value.
    #[serde(default)]
    pub overridable: bool,
}

/// Custom properties keyed by name.
pub type IdProperties = BTreeMap<String, IdProperty>;

/// A live entity that can hold custom properties.
pub trait PropertyOwner {
    /// Returns the entity's custom properties.
    fn id_props(&self) -> &IdProperties;

    /// Returns the entity's custom properties for writing.
    fn id_props_mut(&mut self) -> &mut IdProperties;
}
