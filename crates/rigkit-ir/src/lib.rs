//! rigkit Rig IR Library
//!
//! This crate provides the authoring-time model of a skeletal rig: bone,
//! constraint, driver and custom-property descriptions that are built
//! independently of the host editor's mode, and the two-phase protocol that
//! realizes them into a live rig.
//!
//! # Overview
//!
//! - **IR**: [`BoneGraph`] owns [`BoneSpec`] values whose bone links are
//!   [`BoneRef`] names or graph-local indices, never live handles.
//! - **Host**: [`RigHost`] abstracts the live armature. Edit-mode handles carry
//!   a generation and expire when edit mode is left. [`MemoryRig`] is an
//!   in-memory host.
//! - **Realization**: [`BoneGraph::realize`] creates every bone in one edit
//!   session, writes structure, then writes behavior in one pose session,
//!   restoring the host's mode on every exit path.
//!
//! # Example
//!
//! ```
//! use rigkit_ir::{BoneGraph, BoneRef, MemoryRig, RigHost};
//!
//! let mut graph = BoneGraph::new();
//! graph.bone("Spine").tail = [0.0, 1.0, 0.0];
//! let neck = graph.bone("Neck");
//! neck.head = [0.0, 1.0, 0.0];
//! neck.tail = [0.0, 1.5, 0.0];
//! neck.parent = Some(BoneRef::from("Spine"));
//!
//! let mut rig = MemoryRig::new("RIG");
//! let report = graph.realize(&mut rig, true).unwrap();
//! assert!(report.diagnostics.is_empty());
//! assert_eq!(rig.bone_names(), ["Spine", "Neck"]);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Host and graph errors, diagnostics
//! - [`host`]: The host trait, mode guard and in-memory host
//! - [`ir`]: Bone, constraint, driver and property specs; the bone graph
//! - [`live`]: Live rig data as stored by a host
//! - [`naming`]: Side-marker flipping and data path helpers

pub mod error;
pub mod host;
pub mod ir;
pub mod live;
pub mod naming;

// Re-export commonly used types at the crate root
pub use error::{
    Diagnostic, DiagnosticCode, Diagnostics, GraphError, HostError, HostResult, RigError,
    Severity,
};
pub use host::{EditBoneId, HostMode, MemoryRig, ModeGuard, RigHost};
pub use ir::{
    BoneGraph, BoneRef, BoneSnapshot, BoneSource, BoneSpec, ConstraintSpec, DriverSpec,
    DriverTargetSpec, DriverVariableSpec, FieldMap, PropertySpec, RealizeReport,
};
pub use live::{BoneId, Constraint, ConstraintData, ConstraintKind, Driver, PropertyOwner};
pub use naming::flip_name;
