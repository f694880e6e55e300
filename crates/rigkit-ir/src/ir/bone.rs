//! Bone descriptions, bone references and live-bone snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::driver::DriverSpec;
use super::property::PropertySpec;
use crate::error::{GraphError, HostError, HostResult};
use crate::host::{HostMode, RigHost};
use crate::live::{
    BBoneShape, BoneBehavior, BoneId, Constraint, ConstraintKind, FieldStatus, IdProperties,
    Vec3,
};
use crate::naming::pose_bone_path;

// =============================================================================
// References
// =============================================================================

/// A deferred reference to another bone, resolved only during realization.
///
/// `Name` addresses a live bone by name (which may come from the same graph or
/// already exist on the host); `Local` addresses a bone of the same graph by
/// index. In JSON a string is a name and an integer a local index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoneRef {
    Name(String),
    Local(usize),
}

impl From<&str> for BoneRef {
    fn from(name: &str) -> Self {
        BoneRef::Name(name.to_string())
    }
}

impl From<String> for BoneRef {
    fn from(name: String) -> Self {
        BoneRef::Name(name)
    }
}

impl std::fmt::Display for BoneRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoneRef::Name(name) => write!(f, "'{}'", name),
            BoneRef::Local(index) => write!(f, "graph bone #{}", index),
        }
    }
}

// =============================================================================
// Constraints
// =============================================================================

/// A constraint to construct: its kind plus a field map.
///
/// Keys are host field names. Keys the kind does not have are ignored when the
/// constraint is realized. A `name` key makes realization replace the live
/// constraint of that name in place instead of appending a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    #[serde(flatten)]
    pub props: Map<String, Value>,
    /// Live constraint this spec was captured from; realization starts here.
    #[serde(skip)]
    pub base: Option<Constraint>,
}

impl ConstraintSpec {
    /// Creates a spec with no fields set.
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            props: Map::new(),
            base: None,
        }
    }

    /// Sets a field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Captures a live constraint.
    pub fn from_live(constraint: &Constraint) -> Self {
        Self::new(constraint.kind())
            .with("name", constraint.name.clone())
            .with_base(constraint.clone())
    }

    fn with_base(mut self, base: Constraint) -> Self {
        self.base = Some(base);
        self
    }

    /// Returns the explicit name, if any.
    pub fn name(&self) -> Option<&str> {
        self.props.get("name").and_then(Value::as_str)
    }

    /// Builds the live constraint.
    ///
    /// Field errors do not stop the build; they are returned alongside the
    /// constraint so the caller can report them.
    pub fn build(&self) -> (Constraint, Vec<HostError>) {
        let mut constraint = match &self.base {
            Some(base) if base.kind() == self.kind => base.clone(),
            _ => Constraint::new(self.kind),
        };
        let mut errors = Vec::new();
        for (key, value) in &self.props {
            match constraint.set_field(key, value) {
                Ok(FieldStatus::Applied) => {}
                Ok(FieldStatus::Ignored) => {
                    log::debug!("{} constraint has no field '{}'", self.kind, key);
                }
                Err(e) => errors.push(e),
            }
        }
        (constraint, errors)
    }
}

// =============================================================================
// Bone spec
// =============================================================================

/// Description of one bone: structure, behavior, constraints, properties and drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneSpec {
    pub name: String,

    // Structural fields, written in edit mode.
    pub head: Vec3,
    pub tail: Vec3,
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub use_connect: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<BoneRef>,
    #[serde(default)]
    pub bbone: BBoneShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbone_custom_handle_start: Option<BoneRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbone_custom_handle_end: Option<BoneRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_props_edit: BTreeMap<String, PropertySpec>,

    // Behavioral fields, written in pose mode.
    #[serde(default)]
    pub behavior: BoneBehavior,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_shape_transform: Option<BoneRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_props_pose: BTreeMap<String, PropertySpec>,
    /// Drivers keyed by bone-relative path, with an optional `[N]` array index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub drivers: BTreeMap<String, DriverSpec>,
}

impl BoneSpec {
    /// Creates a bone with host defaults: one unit long along +Y.
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
            custom_props_edit: BTreeMap::new(),
            behavior: BoneBehavior::default(),
            custom_shape_transform: None,
            constraints: Vec::new(),
            custom_props_pose: BTreeMap::new(),
            drivers: BTreeMap::new(),
        }
    }

    /// Returns true if head and tail coincide; such bones are never realized.
    pub fn is_zero_length(&self) -> bool {
        self.head == self.tail
    }

    /// Appends a constraint to the stack.
    pub fn add_constraint(&mut self, constraint: ConstraintSpec) -> &mut Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds an edit-time custom property.
    pub fn add_edit_prop(&mut self, prop: PropertySpec) -> &mut Self {
        self.custom_props_edit.insert(prop.name.clone(), prop);
        self
    }

    /// Adds a pose-time custom property.
    pub fn add_pose_prop(&mut self, prop: PropertySpec) -> &mut Self {
        self.custom_props_pose.insert(prop.name.clone(), prop);
        self
    }

    /// Adds a driver at a bone-relative path such as `location[0]` or `["fk"]`.
    pub fn add_driver(&mut self, path: impl Into<String>, driver: DriverSpec) -> &mut Self {
        self.drivers.insert(path.into(), driver);
        self
    }

    /// Writes a field by name.
    ///
    /// Accepts every structural and behavioral field, the `bbone_*` host names,
    /// and the `constraints`, `custom_props_edit`, `custom_props_pose` and
    /// `drivers` collections (which replace the current collection).
    pub fn set_field(&mut self, field: &str, value: &Value) -> Result<(), GraphError> {
        match field {
            "name" => Err(GraphError::InvalidField {
                field: field.to_string(),
                message: "bone names are assigned by the graph".to_string(),
            }),
            "head" => parse_into(&mut self.head, field, value),
            "tail" => parse_into(&mut self.tail, field, value),
            "roll" => parse_into(&mut self.roll, field, value),
            "use_connect" => parse_into(&mut self.use_connect, field, value),
            "parent" => parse_into(&mut self.parent, field, value),
            "bbone_custom_handle_start" => {
                parse_into(&mut self.bbone_custom_handle_start, field, value)
            }
            "bbone_custom_handle_end" => {
                parse_into(&mut self.bbone_custom_handle_end, field, value)
            }
            "custom_shape_transform" => {
                parse_into(&mut self.custom_shape_transform, field, value)
            }
            "constraints" => parse_into(&mut self.constraints, field, value),
            "custom_props_edit" => {
                self.custom_props_edit = parse_props(field, value)?;
                Ok(())
            }
            "custom_props_pose" => {
                self.custom_props_pose = parse_props(field, value)?;
                Ok(())
            }
            "drivers" => parse_into(&mut self.drivers, field, value),
            _ if field.starts_with("bbone_") => {
                known(self.bbone.set_field(field, value), field)
            }
            _ => known(self.behavior.set_field(field, value), field),
        }
    }
}

fn parse_into<T: serde::de::DeserializeOwned>(
    slot: &mut T,
    field: &str,
    value: &Value,
) -> Result<(), GraphError> {
    *slot = serde_json::from_value(value.clone()).map_err(|e| GraphError::InvalidField {
        field: field.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

fn known(status: HostResult<FieldStatus>, field: &str) -> Result<(), GraphError> {
    match status {
        Ok(FieldStatus::Applied) => Ok(()),
        Ok(FieldStatus::Ignored) => Err(GraphError::UnknownField(field.to_string())),
        Err(e) => Err(GraphError::InvalidField {
            field: field.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Reads properties from a list of specs or a map keyed by name.
fn parse_props(field: &str, value: &Value) -> Result<BTreeMap<String, PropertySpec>, GraphError> {
    let mut props = BTreeMap::new();
    if value.is_array() {
        let mut list: Vec<PropertySpec> = Vec::new();
        parse_into(&mut list, field, value)?;
        for prop in list {
            props.insert(prop.name.clone(), prop);
        }
    } else {
        parse_into(&mut props, field, value)?;
        for (name, prop) in props.iter_mut() {
            if prop.name.is_empty() {
                prop.name = name.clone();
            }
        }
    }
    if props.keys().any(|name| name.is_empty()) {
        return Err(GraphError::InvalidField {
            field: field.to_string(),
            message: "property names cannot be empty".to_string(),
        });
    }
    Ok(props)
}

// =============================================================================
// Snapshots
// =============================================================================

/// Structural data read from a live edit bone.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralSnapshot {
    pub head: Vec3,
    pub tail: Vec3,
    pub roll: f64,
    pub use_connect: bool,
    pub parent: Option<String>,
    pub bbone: BBoneShape,
    pub bbone_custom_handle_start: Option<String>,
    pub bbone_custom_handle_end: Option<String>,
    pub props: IdProperties,
}

/// Behavioral data read from a live pose bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BehavioralSnapshot {
    pub behavior: BoneBehavior,
    pub custom_shape_transform: Option<String>,
    pub props: IdProperties,
    pub constraints: Vec<Constraint>,
}

/// A copy of a live bone, used to seed a [`BoneSpec`].
///
/// Which half is captured depends on the host mode at capture time: edit mode
/// yields structural data, any other mode behavioral data. Drivers are always
/// captured. Bone links are stored as names.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneSnapshot {
    pub name: String,
    pub structural: Option<StructuralSnapshot>,
    pub behavioral: Option<BehavioralSnapshot>,
    /// Drivers on the bone, keyed by bone-relative path.
    pub drivers: BTreeMap<String, DriverSpec>,
}

impl BoneSnapshot {
    /// Captures the live bone `name`, or returns `None` if it does not exist.
    pub fn capture<H: RigHost + ?Sized>(host: &H, name: &str) -> HostResult<Option<Self>> {
        let link_name = |id: Option<BoneId>| -> Option<String> {
            id.and_then(|id| host.bone_name(id)).map(str::to_string)
        };

        let (structural, behavioral) = if host.mode() == HostMode::Edit {
            let Some(id) = host.find_edit_bone(name)? else {
                return Ok(None);
            };
            let bone = host.edit_bone(id)?;
            let snapshot = StructuralSnapshot {
                head: bone.head,
                tail: bone.tail,
                roll: bone.roll,
                use_connect: bone.use_connect,
                parent: link_name(bone.parent),
                bbone: bone.bbone.clone(),
                bbone_custom_handle_start: link_name(bone.bbone_custom_handle_start),
                bbone_custom_handle_end: link_name(bone.bbone_custom_handle_end),
                props: bone.props.clone(),
            };
            (Some(snapshot), None)
        } else {
            let Some(bone) = host.pose_bone(name)? else {
                return Ok(None);
            };
            let snapshot = BehavioralSnapshot {
                behavior: bone.behavior.clone(),
                custom_shape_transform: link_name(bone.custom_shape_transform),
                props: bone.props.clone(),
                constraints: bone.constraints.clone(),
            };
            (None, Some(snapshot))
        };

        let prefix = pose_bone_path(name);
        let mut drivers = BTreeMap::new();
        for driver in host.drivers() {
            let Some(rest) = driver.data_path.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let relative = rest.strip_prefix('.').unwrap_or(rest);
            let key = if driver.array_index >= 0 {
                format!("{}[{}]", relative, driver.array_index)
            } else {
                relative.to_string()
            };
            drivers.insert(key, DriverSpec::from_live(driver));
        }

        Ok(Some(Self {
            name: name.to_string(),
            structural,
            behavioral,
            drivers,
        }))
    }
}

/// Where a new [`BoneSpec`] copies its initial fields from.
#[derive(Debug, Clone, PartialEq)]
pub enum BoneSource {
    /// Another spec, typically from the same graph.
    Spec(BoneSpec),
    /// A captured live bone.
    Snapshot(BoneSnapshot),
}

impl BoneSpec {
    /// Copies every field of `source` except the name.
    pub(crate) fn copy_from(&mut self, source: &BoneSource) {
        match source {
            BoneSource::Spec(spec) => {
                let name = std::mem::take(&mut self.name);
                *self = spec.clone();
                self.name = name;
            }
            BoneSource::Snapshot(snapshot) => self.copy_snapshot(snapshot),
        }
    }

    fn copy_snapshot(&mut self, snapshot: &BoneSnapshot) {
        let props = |props: &IdProperties| -> BTreeMap<String, PropertySpec> {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), PropertySpec::from_live(name.clone(), prop)))
                .collect()
        };
        if let Some(s) = &snapshot.structural {
            self.head = s.head;
            self.tail = s.tail;
            self.roll = s.roll;
            self.use_connect = s.use_connect;
            self.parent = s.parent.clone().map(BoneRef::Name);
            self.bbone = s.bbone.clone();
            self.bbone_custom_handle_start = s.bbone_custom_handle_start.clone().map(BoneRef::Name);
            self.bbone_custom_handle_end = s.bbone_custom_handle_end.clone().map(BoneRef::Name);
            self.custom_props_edit = props(&s.props);
        }
        if let Some(b) = &snapshot.behavioral {
            self.behavior = b.behavior.clone();
            self.custom_shape_transform = b.custom_shape_transform.clone().map(BoneRef::Name);
            self.custom_props_pose = props(&b.props);
            self.constraints = b.constraints.iter().map(ConstraintSpec::from_live).collect();
        }
        if !snapshot.drivers.is_empty() {
            self.drivers = snapshot.drivers.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryRig;
    use crate::live::{ConstraintData, HandleType, InheritScale};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_bone_ref_json() {
        let name: BoneRef = serde_json::from_value(json!("Spine")).unwrap();
        let local: BoneRef = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(name, BoneRef::Name("Spine".to_string()));
        assert_eq!(local, BoneRef::Local(2));
    }

    #[test]
    fn test_set_field_table() {
        let mut spec = BoneSpec::new("Arm.L");
        spec.set_field("head", &json!([1, 0, 0])).unwrap();
        spec.set_field("parent", &json!("Shoulder.L")).unwrap();
        spec.set_field("bbone_segments", &json!(4)).unwrap();
        spec.set_field("bbone_handle_type_end", &json!("ABSOLUTE")).unwrap();
        spec.set_field("bbone_custom_handle_start", &json!(0)).unwrap();
        spec.set_field("inherit_scale", &json!("NONE")).unwrap();
        spec.set_field("use_deform", &json!(false)).unwrap();

        assert_eq!(spec.head, [1.0, 0.0, 0.0]);
        assert_eq!(spec.parent, Some(BoneRef::from("Shoulder.L")));
        assert_eq!(spec.bbone.segments, 4);
        assert_eq!(spec.bbone.handle_type_end, HandleType::Absolute);
        assert_eq!(spec.bbone_custom_handle_start, Some(BoneRef::Local(0)));
        assert_eq!(spec.behavior.inherit_scale, InheritScale::None);
        assert!(!spec.behavior.use_deform);
    }

    #[test]
    fn test_set_field_errors() {
        let mut spec = BoneSpec::new("Arm.L");
        assert_eq!(
            spec.set_field("wingspan", &json!(1)).unwrap_err(),
            GraphError::UnknownField("wingspan".to_string())
        );
        assert_eq!(
            spec.set_field("bbone_wobble", &json!(1)).unwrap_err(),
            GraphError::UnknownField("bbone_wobble".to_string())
        );
        assert!(matches!(
            spec.set_field("head", &json!("up")),
            Err(GraphError::InvalidField { .. })
        ));
        assert!(spec.set_field("name", &json!("Other")).is_err());
    }

    #[test]
    fn test_set_field_collections() {
        let mut spec = BoneSpec::new("Hand.L");
        spec.set_field(
            "constraints",
            &json!([{"type": "COPY_ROTATION", "subtarget": "Hand_IK.L", "use_y": false}]),
        )
        .unwrap();
        spec.set_field(
            "custom_props_pose",
            &json!({"fk_ik": {"default": 0.0, "min": 0.0, "max": 1.0}}),
        )
        .unwrap();
        spec.set_field(
            "custom_props_edit",
            &json!([{"name": "length_scale", "default": 1.0}]),
        )
        .unwrap();
        spec.set_field("drivers", &json!({"location[0]": {"expression": "0"}}))
            .unwrap();

        assert_eq!(spec.constraints[0].kind, ConstraintKind::CopyRotation);
        assert_eq!(spec.constraints[0].props["subtarget"], json!("Hand_IK.L"));
        assert_eq!(spec.custom_props_pose["fk_ik"].name, "fk_ik");
        assert_eq!(spec.custom_props_edit["length_scale"].default, json!(1.0));
        assert!(spec.drivers.contains_key("location[0]"));
    }

    #[test]
    fn test_constraint_build_ignores_unknown_keys() {
        let spec = ConstraintSpec::new(ConstraintKind::LimitLocation)
            .with("name", "Floor")
            .with("min_z", 0.0)
            .with("use_min_z", true)
            .with("pole_angle", 1.0)
            .with("max_x", "wide");
        let (constraint, errors) = spec.build();
        assert_eq!(constraint.name, "Floor");
        assert_eq!(errors.len(), 1);
        let ConstraintData::LimitLocation(limits) = &constraint.data else {
            panic!("Expected LimitLocation");
        };
        assert!(limits.use_min[2]);
        assert_eq!(spec.name(), Some("Floor"));
    }

    #[test]
    fn test_constraint_from_live_keeps_fields() {
        let mut live = Constraint::named(ConstraintKind::Ik, "IK");
        live.set_field("chain_count", &json!(2)).unwrap();
        live.influence = 0.5;
        let spec = ConstraintSpec::from_live(&live).with("iterations", 100);
        let (rebuilt, errors) = spec.build();
        assert!(errors.is_empty());
        assert_eq!(rebuilt.influence, 0.5);
        let ConstraintData::Ik(ik) = &rebuilt.data else {
            panic!("Expected Ik");
        };
        assert_eq!(ik.chain_count, 2);
        assert_eq!(ik.iterations, 100);
    }

    #[test]
    fn test_snapshot_capture_by_mode() {
        let mut rig = MemoryRig::new("RIG")
            .with_bone("Upper.L", [0.0; 3], [0.0, 1.0, 0.0])
            .with_bone("Lower.L", [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]);
        rig.record_mut("Lower.L").unwrap().edit.parent = Some(BoneId(0));
        rig.record_mut("Lower.L")
            .unwrap()
            .pose
            .add_constraint(Constraint::new(ConstraintKind::CopyScale));
        rig.add_driver("pose.bones[\"Lower.L\"].location", 2).unwrap();

        rig.set_mode(HostMode::Edit).unwrap();
        let edit = BoneSnapshot::capture(&rig, "Lower.L").unwrap().unwrap();
        let structural = edit.structural.as_ref().unwrap();
        assert_eq!(structural.parent.as_deref(), Some("Upper.L"));
        assert!(edit.behavioral.is_none());
        assert!(edit.drivers.contains_key("location[2]"));
        assert!(BoneSnapshot::capture(&rig, "Missing").unwrap().is_none());

        rig.set_mode(HostMode::Pose).unwrap();
        let pose = BoneSnapshot::capture(&rig, "Lower.L").unwrap().unwrap();
        assert!(pose.structural.is_none());
        assert_eq!(pose.behavioral.as_ref().unwrap().constraints.len(), 1);

        let mut spec = BoneSpec::new("Lower.R");
        spec.copy_from(&BoneSource::Snapshot(edit));
        spec.copy_from(&BoneSource::Snapshot(pose));
        assert_eq!(spec.name, "Lower.R");
        assert_eq!(spec.parent, Some(BoneRef::from("Upper.L")));
        assert_eq!(spec.head, [0.0, 1.0, 0.0]);
        assert_eq!(spec.constraints[0].name(), Some("Copy Scale"));
    }
}
