//! The live rig host abstraction.
//!
//! A host owns one armature object and exposes it in one of three modes.
//! Structural bone data is reachable only in edit mode, through handles that
//! expire when edit mode is left; behavioral bone data is reachable only
//! outside edit mode. Implementations enforce both rules and report violations
//! as [`HostError`] values instead of crashing.

mod memory;

pub use memory::{BoneRecord, MemoryRig};

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::error::{HostError, HostResult};
use crate::live::{Action, BoneId, Driver, EditBone, PoseBone};

/// Interaction mode of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMode {
    #[default]
    Object,
    Edit,
    Pose,
}

impl HostMode {
    /// Returns the host's name for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostMode::Object => "OBJECT",
            HostMode::Edit => "EDIT",
            HostMode::Pose => "POSE",
        }
    }
}

impl std::fmt::Display for HostMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to an edit bone, valid for one edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditBoneId {
    /// The stable bone this handle addresses.
    pub bone: BoneId,
    /// Edit session the handle was issued in.
    pub generation: u64,
}

/// A live armature that rig IR can be realized into.
pub trait RigHost {
    /// Name of the armature object.
    fn object_name(&self) -> &str;

    /// Current mode.
    fn mode(&self) -> HostMode;

    /// Switches mode. Leaving edit mode invalidates every [`EditBoneId`].
    fn set_mode(&mut self, mode: HostMode) -> HostResult<()>;

    /// Looks up a bone by name. Works in every mode.
    fn bone_id(&self, name: &str) -> Option<BoneId>;

    /// Returns the name of a bone. Works in every mode.
    fn bone_name(&self, id: BoneId) -> Option<&str>;

    /// Returns all bone names in creation order.
    fn bone_names(&self) -> Vec<String>;

    /// Finds an edit bone by name. Edit mode only.
    fn find_edit_bone(&self, name: &str) -> HostResult<Option<EditBoneId>>;

    /// Creates an edit bone with default geometry. Edit mode only.
    fn new_edit_bone(&mut self, name: &str) -> HostResult<EditBoneId>;

    /// Reads an edit bone. Edit mode only.
    fn edit_bone(&self, id: EditBoneId) -> HostResult<&EditBone>;

    /// Writes an edit bone. Edit mode only.
    fn edit_bone_mut(&mut self, id: EditBoneId) -> HostResult<&mut EditBone>;

    /// Reads a pose bone by name. Not available in edit mode.
    fn pose_bone(&self, name: &str) -> HostResult<Option<&PoseBone>>;

    /// Writes a pose bone by name. Not available in edit mode.
    fn pose_bone_mut(&mut self, name: &str) -> HostResult<Option<&mut PoseBone>>;

    /// All drivers on the object.
    fn drivers(&self) -> &[Driver];

    /// Returns the driver at exactly `(data_path, array_index)`.
    fn driver_mut(&mut self, data_path: &str, array_index: i32) -> Option<&mut Driver>;

    /// Adds a driver at `(data_path, array_index)`, or returns the existing one.
    fn add_driver(&mut self, data_path: &str, array_index: i32) -> HostResult<&mut Driver>;

    /// Removes the driver at exactly `(data_path, array_index)`.
    ///
    /// Returns false if there was none.
    fn remove_driver(&mut self, data_path: &str, array_index: i32) -> bool;

    /// Looks up an action by name.
    fn action(&self, name: &str) -> Option<&Action>;

    /// Looks up an action by name for writing.
    fn action_mut(&mut self, name: &str) -> Option<&mut Action>;
}

/// Fails with [`HostError::WrongMode`] unless `actual == expected`.
pub fn require_mode(actual: HostMode, expected: HostMode) -> HostResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(HostError::WrongMode { expected, actual })
    }
}

/// Fails with [`HostError::WrongMode`] when the host is in edit mode.
pub fn require_pose_data(actual: HostMode) -> HostResult<()> {
    if actual == HostMode::Edit {
        Err(HostError::WrongMode {
            expected: HostMode::Pose,
            actual,
        })
    } else {
        Ok(())
    }
}

// =============================================================================
// Mode guard
// =============================================================================

/// Switches a host into a mode and restores the original mode on drop.
///
/// Restoration runs on every exit path, including early returns through `?`.
/// A failed restore is logged, since `Drop` cannot report it.
pub struct ModeGuard<'h, H: RigHost + ?Sized> {
    host: &'h mut H,
    restore: HostMode,
}

impl<'h, H: RigHost + ?Sized> ModeGuard<'h, H> {
    /// Enters `mode`, remembering the current mode for restoration.
    pub fn enter(host: &'h mut H, mode: HostMode) -> HostResult<Self> {
        let restore = host.mode();
        if restore != mode {
            host.set_mode(mode)?;
        }
        Ok(Self { host, restore })
    }

    /// Switches to another mode within the guarded session.
    pub fn switch(&mut self, mode: HostMode) -> HostResult<()> {
        if self.host.mode() != mode {
            self.host.set_mode(mode)?;
        }
        Ok(())
    }

    /// Returns the mode that will be restored on drop.
    pub fn restore_mode(&self) -> HostMode {
        self.restore
    }
}

impl<H: RigHost + ?Sized> Deref for ModeGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: RigHost + ?Sized> DerefMut for ModeGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: RigHost + ?Sized> Drop for ModeGuard<'_, H> {
    fn drop(&mut self) {
        if self.host.mode() == self.restore {
            return;
        }
        if let Err(e) = self.host.set_mode(self.restore) {
            log::error!(
                "failed to restore {} mode on '{}': {}",
                self.restore,
                self.host.object_name(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RigError;

    #[test]
    fn test_mode_display() {
        assert_eq!(HostMode::Edit.to_string(), "EDIT");
        assert_eq!(
            serde_json::to_string(&HostMode::Pose).unwrap(),
            "\"POSE\""
        );
    }

    #[test]
    fn test_guard_restores_mode() {
        let mut rig = MemoryRig::new("RIG");
        {
            let mut guard = ModeGuard::enter(&mut rig, HostMode::Edit).unwrap();
            assert_eq!(guard.mode(), HostMode::Edit);
            guard.switch(HostMode::Pose).unwrap();
            assert_eq!(guard.mode(), HostMode::Pose);
            assert_eq!(guard.restore_mode(), HostMode::Object);
        }
        assert_eq!(rig.mode(), HostMode::Object);
    }

    #[test]
    fn test_guard_restores_on_error_path() {
        fn fails(rig: &mut MemoryRig) -> HostResult<()> {
            let mut guard = ModeGuard::enter(rig, HostMode::Edit)?;
            guard.pose_bone("Arm")?;
            Ok(())
        }

        let mut rig = MemoryRig::new("RIG");
        rig.set_mode(HostMode::Pose).unwrap();
        let err = fails(&mut rig).unwrap_err();
        assert_eq!(err.code(), "HOST_001");
        assert_eq!(rig.mode(), HostMode::Pose);
    }

    #[test]
    fn test_guard_without_switch() {
        let mut rig = MemoryRig::new("RIG");
        let switches = rig.mode_switches();
        {
            let _guard = ModeGuard::enter(&mut rig, HostMode::Object).unwrap();
        }
        assert_eq!(rig.mode_switches(), switches);
    }

    #[test]
    fn test_require_mode() {
        assert!(require_mode(HostMode::Edit, HostMode::Edit).is_ok());
        assert!(require_mode(HostMode::Pose, HostMode::Edit).is_err());
        assert!(require_pose_data(HostMode::Object).is_ok());
        assert!(require_pose_data(HostMode::Edit).is_err());
    }
}
