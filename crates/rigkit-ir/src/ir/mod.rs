//! The rig intermediate representation.
//!
//! Specs are plain values built independently of any host mode. Bone links are
//! names or graph-local indices and only become live ids inside
//! [`BoneGraph::realize`].

mod bone;
mod driver;
mod graph;
mod property;
mod realize;

#[cfg(test)]
mod tests;

pub use bone::{
    BehavioralSnapshot, BoneRef, BoneSnapshot, BoneSource, BoneSpec, ConstraintSpec,
    StructuralSnapshot,
};
pub use driver::{DriverSpec, DriverTargetSpec, DriverVariableSpec};
pub use graph::{BoneGraph, FieldMap};
pub use property::PropertySpec;
pub use realize::RealizeReport;
