//! The bone graph: an ordered, name-unique collection of bone specs.

use serde_json::{Map, Value};

use super::bone::{BoneRef, BoneSource, BoneSpec};
use crate::error::GraphError;

/// A field-name to value map, as accepted by [`BoneSpec::set_field`].
pub type FieldMap = Map<String, Value>;

/// All bone specs of one rig, realized together.
///
/// New specs start from a template built from the graph defaults, then copy
/// their source (if any), then apply explicit fields, so explicit fields win
/// over the source and the source wins over the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneGraph {
    pub(crate) bones: Vec<BoneSpec>,
    defaults: FieldMap,
    template: BoneSpec,
}

impl Default for BoneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl BoneGraph {
    /// Creates an empty graph without defaults.
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            defaults: FieldMap::new(),
            template: BoneSpec::new(""),
        }
    }

    /// Creates an empty graph whose new bones start from `defaults`.
    ///
    /// Every default is validated here, so later `bone` calls cannot fail on them.
    pub fn with_defaults(defaults: FieldMap) -> Result<Self, GraphError> {
        let mut template = BoneSpec::new("");
        for (field, value) in &defaults {
            template.set_field(field, value)?;
        }
        Ok(Self {
            bones: Vec::new(),
            defaults,
            template,
        })
    }

    /// Returns the defaults map.
    pub fn defaults(&self) -> &FieldMap {
        &self.defaults
    }

    /// Adds (or replaces) a bone built from the defaults alone.
    pub fn bone(&mut self, name: &str) -> &mut BoneSpec {
        self.add_bone(name, None, true)
    }

    /// Adds a bone, optionally seeded from `source`.
    ///
    /// With `overwrite == false` an existing bone of that name is returned
    /// untouched. Otherwise a new spec replaces it at the same position, so
    /// [`BoneRef::Local`] indices stay valid.
    pub fn add_bone(
        &mut self,
        name: &str,
        source: Option<&BoneSource>,
        overwrite: bool,
    ) -> &mut BoneSpec {
        if let (false, Some(index)) = (overwrite, self.index_of(name)) {
            return &mut self.bones[index];
        }
        let spec = self.build(name, source);
        self.insert(spec)
    }

    /// Adds a bone and applies an explicit field map on top of defaults and source.
    ///
    /// The graph is left unchanged if any field fails to apply.
    pub fn bone_with_fields(
        &mut self,
        name: &str,
        source: Option<&BoneSource>,
        overwrite: bool,
        fields: &FieldMap,
    ) -> Result<&mut BoneSpec, GraphError> {
        if let (false, Some(index)) = (overwrite, self.index_of(name)) {
            return Ok(&mut self.bones[index]);
        }
        let mut spec = self.build(name, source);
        for (field, value) in fields {
            spec.set_field(field, value)?;
        }
        Ok(self.insert(spec))
    }

    /// Looks up a bone by exact name.
    pub fn find(&self, name: &str) -> Option<&BoneSpec> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Looks up a bone by exact name for writing.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut BoneSpec> {
        self.bones.iter_mut().find(|b| b.name == name)
    }

    /// Returns a graph-local reference to the named bone.
    pub fn local_ref(&self, name: &str) -> Option<BoneRef> {
        self.index_of(name).map(BoneRef::Local)
    }

    /// Returns the bones in insertion order.
    pub fn bones(&self) -> &[BoneSpec] {
        &self.bones
    }

    /// Returns the number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns true if the graph holds no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    fn build(&self, name: &str, source: Option<&BoneSource>) -> BoneSpec {
        let mut spec = self.template.clone();
        spec.name = name.to_string();
        if let Some(source) = source {
            spec.copy_from(source);
        }
        spec
    }

    fn insert(&mut self, spec: BoneSpec) -> &mut BoneSpec {
        match self.index_of(&spec.name) {
            Some(index) => {
                self.bones[index] = spec;
                &mut self.bones[index]
            }
            None => {
                self.bones.push(spec);
                let last = self.bones.len() - 1;
                &mut self.bones[last]
            }
        }
    }
}
