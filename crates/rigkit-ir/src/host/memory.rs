//! In-memory rig host, used by the CLI and by tests.

use serde::{Deserialize, Serialize};

use super::{require_mode, require_pose_data, EditBoneId, HostMode, RigHost};
use crate::error::{HostError, HostResult};
use crate::live::{
    Action, BoneId, Driver, EditBone, IdProperties, PoseBone, PropertyOwner,
};
use crate::naming::bone_in_path;

/// Both halves of one live bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneRecord {
    pub edit: EditBone,
    pub pose: PoseBone,
}

impl BoneRecord {
    /// Creates a record with default edit and pose data.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            edit: EditBone::new(name.clone()),
            pose: PoseBone::new(name),
        }
    }

    /// Returns the bone name.
    pub fn name(&self) -> &str {
        &self.edit.name
    }
}

/// A [`RigHost`] backed by plain vectors, serializable as a JSON document.
///
/// Bone ids are indices into the bone list; bones are never removed, so ids
/// stay valid for the life of the rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryRig {
    /// Armature object name.
    pub name: String,
    #[serde(default)]
    mode: HostMode,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    mode_switches: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bones: Vec<BoneRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    drivers: Vec<Driver>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "IdProperties::is_empty")]
    props: IdProperties,
}

impl MemoryRig {
    /// Creates an empty rig in object mode.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: HostMode::Object,
            generation: 0,
            mode_switches: 0,
            bones: Vec::new(),
            drivers: Vec::new(),
            actions: Vec::new(),
            props: IdProperties::new(),
        }
    }

    /// Adds a bone with the given geometry, bypassing mode checks.
    pub fn with_bone(mut self, name: &str, head: [f64; 3], tail: [f64; 3]) -> Self {
        let mut record = BoneRecord::new(name);
        record.edit.head = head;
        record.edit.tail = tail;
        self.bones.push(record);
        self
    }

    /// Adds an action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.add_action(action);
        self
    }

    /// Adds or replaces an action.
    pub fn add_action(&mut self, action: Action) {
        match self.actions.iter_mut().find(|a| a.name == action.name) {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
    }

    /// Returns every bone record, for inspection outside the mode rules.
    pub fn bones(&self) -> &[BoneRecord] {
        &self.bones
    }

    /// Returns a bone record by name, for inspection outside the mode rules.
    pub fn record(&self, name: &str) -> Option<&BoneRecord> {
        self.bones.iter().find(|b| b.name() == name)
    }

    /// Returns a bone record by name for setup outside the mode rules.
    pub fn record_mut(&mut self, name: &str) -> Option<&mut BoneRecord> {
        self.bones.iter_mut().find(|b| b.name() == name)
    }

    /// Returns every action.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the number of mode switches performed so far.
    pub fn mode_switches(&self) -> usize {
        self.mode_switches
    }

    /// Returns the current edit session generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn edit_index(&self, id: EditBoneId) -> HostResult<usize> {
        require_mode(self.mode, HostMode::Edit)?;
        if id.generation != self.generation {
            return Err(HostError::StaleHandle {
                handle: id.generation,
                current: self.generation,
            });
        }
        if id.bone.0 >= self.bones.len() {
            return Err(HostError::BoneNotFound(format!("#{}", id.bone.0)));
        }
        Ok(id.bone.0)
    }

    fn handle(&self, index: usize) -> EditBoneId {
        EditBoneId {
            bone: BoneId(index),
            generation: self.generation,
        }
    }
}

impl RigHost for MemoryRig {
    fn object_name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> HostMode {
        self.mode
    }

    fn set_mode(&mut self, mode: HostMode) -> HostResult<()> {
        if mode == self.mode {
            return Ok(());
        }
        if self.mode == HostMode::Edit {
            // Edit data is committed: pose bones follow edit-time renames.
            for record in &mut self.bones {
                if record.pose.name != record.edit.name {
                    record.pose.name = record.edit.name.clone();
                }
            }
            self.generation += 1;
        }
        log::debug!("{}: {} -> {}", self.name, self.mode, mode);
        self.mode = mode;
        self.mode_switches += 1;
        Ok(())
    }

    fn bone_id(&self, name: &str) -> Option<BoneId> {
        self.bones.iter().position(|b| b.name() == name).map(BoneId)
    }

    fn bone_name(&self, id: BoneId) -> Option<&str> {
        self.bones.get(id.0).map(|b| b.name())
    }

    fn bone_names(&self) -> Vec<String> {
        self.bones.iter().map(|b| b.name().to_string()).collect()
    }

    fn find_edit_bone(&self, name: &str) -> HostResult<Option<EditBoneId>> {
        require_mode(self.mode, HostMode::Edit)?;
        Ok(self.bone_id(name).map(|id| self.handle(id.0)))
    }

    fn new_edit_bone(&mut self, name: &str) -> HostResult<EditBoneId> {
        require_mode(self.mode, HostMode::Edit)?;
        if name.is_empty() {
            return Err(HostError::EmptyName);
        }
        if self.bone_id(name).is_some() {
            return Err(HostError::DuplicateBone(name.to_string()));
        }
        self.bones.push(BoneRecord::new(name));
        Ok(self.handle(self.bones.len() - 1))
    }

    fn edit_bone(&self, id: EditBoneId) -> HostResult<&EditBone> {
        let index = self.edit_index(id)?;
        Ok(&self.bones[index].edit)
    }

    fn edit_bone_mut(&mut self, id: EditBoneId) -> HostResult<&mut EditBone> {
        let index = self.edit_index(id)?;
        Ok(&mut self.bones[index].edit)
    }

    fn pose_bone(&self, name: &str) -> HostResult<Option<&PoseBone>> {
        require_pose_data(self.mode)?;
        Ok(self.bones.iter().find(|b| b.pose.name == name).map(|b| &b.pose))
    }

    fn pose_bone_mut(&mut self, name: &str) -> HostResult<Option<&mut PoseBone>> {
        require_pose_data(self.mode)?;
        Ok(self
            .bones
            .iter_mut()
            .find(|b| b.pose.name == name)
            .map(|b| &mut b.pose))
    }

    fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    fn driver_mut(&mut self, data_path: &str, array_index: i32) -> Option<&mut Driver> {
        self.drivers
            .iter_mut()
            .find(|d| d.is_at(data_path, array_index))
    }

    fn add_driver(&mut self, data_path: &str, array_index: i32) -> HostResult<&mut Driver> {
        if data_path.is_empty() {
            return Err(HostError::invalid_field("data_path", "path is empty"));
        }
        if let Some(bone) = bone_in_path(data_path) {
            if self.bone_id(bone).is_none() {
                return Err(HostError::BoneNotFound(bone.to_string()));
            }
        }
        let index = match self
            .drivers
            .iter()
            .position(|d| d.is_at(data_path, array_index))
        {
            Some(index) => index,
            None => {
                self.drivers.push(Driver::new(data_path, array_index));
                self.drivers.len() - 1
            }
        };
        Ok(&mut self.drivers[index])
    }

    fn remove_driver(&mut self, data_path: &str, array_index: i32) -> bool {
        let before = self.drivers.len();
        self.drivers.retain(|d| !d.is_at(data_path, array_index));
        self.drivers.len() != before
    }

    fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.name == name)
    }
}

impl PropertyOwner for MemoryRig {
    fn id_props(&self) -> &IdProperties {
        &self.props
    }

    fn id_props_mut(&mut self) -> &mut IdProperties {
        &mut self.props
    }
}
