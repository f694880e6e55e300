//! rigkit Mirror Engine
//!
//! This crate generates the opposite side of a one-sided rig by rewriting the
//! live data of selected bones: geometry, parenting, constraints, drivers and
//! the action curves used by action constraints.
//!
//! # Overview
//!
//! - Bone names are paired with [`flip_name`](rigkit_ir::flip_name). A bone
//!   whose name has no side marker mirrors its side-named constraints within
//!   itself, optionally splitting influence between the original and the copy.
//! - Each constraint is copied field for field, then corrected by kind (see
//!   [`constraints`]). Transformation constraints use the literal range-fix
//!   table in [`transform_table`].
//! - Problems with single items are reported on the [`MirrorReport`]; the batch
//!   continues.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use rigkit_ir::MemoryRig;
//! use rigkit_mirror::mirror_bones;
//!
//! let mut rig = MemoryRig::new("RIG").with_bone("Arm.L", [0.5, 0.0, 1.0], [1.5, 0.0, 1.0]);
//! let selection: BTreeSet<String> = ["Arm.L".to_string()].into();
//! let report = mirror_bones(&mut rig, &selection, false).unwrap();
//! assert_eq!(report.created, ["Arm.R"]);
//! assert_eq!(rig.record("Arm.R").unwrap().edit.head, [-0.5, 0.0, 1.0]);
//! ```
//!
//! # Modules
//!
//! - [`action`]: Action curve mirroring
//! - [`constraints`]: Per-kind constraint mirroring
//! - [`drivers`]: Driver mirroring
//! - [`engine`]: The mirror entry points and report types
//! - [`error`]: Error types
//! - [`transform_table`]: Range fixes for transformation constraints

pub mod action;
pub mod constraints;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod transform_table;

// Re-export commonly used types at the crate root
pub use constraints::{mirror_constraint, mirror_pole_angle, MirrorContext};
pub use drivers::{mirror_drivers, DriverScope};
pub use engine::{
    mirror_bones, mirror_bones_with, MirrorOptions, MirrorRejection, MirrorReport,
    SplitConstraint,
};
pub use error::{MirrorError, MirrorResult};
pub use transform_table::{mirror_mapping, RangeFix};
