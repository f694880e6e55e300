//! Two-phase realization of a bone graph onto a rig host.
//!
//! All structural work happens in a single edit session and all behavioral
//! work in a single pose session. Bones are created before any attribute is
//! written, so references may point at bones later in the graph. Per-bone
//! problems become diagnostics; only host mode failures abort.

use serde::{Deserialize, Serialize};

use super::bone::{BoneRef, BoneSpec};
use super::graph::BoneGraph;
use crate::error::{Diagnostic, DiagnosticCode, Diagnostics, HostError, Severity};
use crate::host::{HostMode, ModeGuard, RigHost};
use crate::live::BoneId;
use crate::naming::{join_bone_path, split_array_index};

/// Outcome of one [`BoneGraph::realize`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealizeReport {
    /// Bones created on the host.
    pub created: Vec<String>,
    /// Bones that already existed and were rewritten.
    pub updated: Vec<String>,
    /// Bones that were not realized.
    pub skipped: Vec<String>,
    /// Everything worth reporting, in the order it happened.
    pub diagnostics: Vec<Diagnostic>,
}

impl RealizeReport {
    /// Returns true if nothing was skipped and no diagnostics were recorded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics that rejected an item.
    pub fn rejected_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Rejected)
            .count()
    }
}

/// Resolves references against the host and the graph being realized.
struct Resolver<'g> {
    bones: &'g [BoneSpec],
    live: &'g [bool],
}

impl Resolver<'_> {
    fn resolve<H: RigHost + ?Sized>(&self, host: &H, reference: &BoneRef) -> Result<BoneId, String> {
        let name = match reference {
            BoneRef::Name(name) => name.as_str(),
            BoneRef::Local(index) => {
                let spec = self
                    .bones
                    .get(*index)
                    .ok_or_else(|| format!("{} is out of range", reference))?;
                if !self.live[*index] {
                    return Err(format!("{} ('{}') was not realized", reference, spec.name));
                }
                spec.name.as_str()
            }
        };
        host.bone_id(name)
            .ok_or_else(|| format!("bone '{}' does not exist", name))
    }

    /// Resolves an optional link; unresolved links are reported and yield `None`.
    fn link<H: RigHost + ?Sized>(
        &self,
        host: &H,
        owner: &str,
        field: &str,
        reference: Option<&BoneRef>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Option<BoneId>> {
        let reference = reference?;
        match self.resolve(host, reference) {
            Ok(id) if host.bone_name(id) == Some(owner) && field == "parent" => {
                diagnostics.bone(
                    DiagnosticCode::UnresolvedReference,
                    owner,
                    "a bone cannot be its own parent",
                );
                None
            }
            Ok(id) => Some(Some(id)),
            Err(message) => {
                diagnostics.bone(
                    DiagnosticCode::UnresolvedReference,
                    owner,
                    format!("{}: {}", field, message),
                );
                None
            }
        }
    }
}

impl BoneGraph {
    /// Writes every bone of the graph into `host`.
    ///
    /// Zero-length bones are skipped and unresolved references are left at
    /// their live value, both with diagnostics. The host's original mode is
    /// restored on every exit path. With `clear`, the graph is emptied after a
    /// successful realization.
    pub fn realize<H: RigHost + ?Sized>(
        &mut self,
        host: &mut H,
        clear: bool,
    ) -> Result<RealizeReport, HostError> {
        let mut report = RealizeReport::default();
        let mut diagnostics = Diagnostics::new();
        let mut live = Vec::with_capacity(self.bones.len());

        {
            let mut guard = ModeGuard::enter(host, HostMode::Edit)?;

            // Pass 1: every bone exists before any attribute is written.
            for spec in &self.bones {
                let realized = ensure_bone(&mut *guard, spec, &mut report, &mut diagnostics)?;
                live.push(realized);
            }

            // Pass 2: structural attributes.
            let resolver = Resolver {
                bones: &self.bones,
                live: &live,
            };
            for (spec, _) in self.bones.iter().zip(&live).filter(|(_, live)| **live) {
                write_structure(&mut *guard, spec, &resolver, &mut diagnostics)?;
            }

            // Pass 3: one switch; edit handles are invalid from here on.
            guard.switch(HostMode::Pose)?;

            // Pass 4: behavioral attributes.
            for (spec, _) in self.bones.iter().zip(&live).filter(|(_, live)| **live) {
                write_behavior(&mut *guard, spec, &resolver, &mut diagnostics)?;
            }
        }

        report.diagnostics = diagnostics.into_vec();
        log::info!(
            "realized {} bones ({} created, {} skipped, {} diagnostics)",
            report.created.len() + report.updated.len(),
            report.created.len(),
            report.skipped.len(),
            report.diagnostics.len()
        );
        if clear {
            self.bones.clear();
        }
        Ok(report)
    }
}

/// Creates the live bone if needed. Returns false if the bone is not realized.
fn ensure_bone<H: RigHost + ?Sized>(
    host: &mut H,
    spec: &BoneSpec,
    report: &mut RealizeReport,
    diagnostics: &mut Diagnostics,
) -> Result<bool, HostError> {
    if spec.is_zero_length() {
        diagnostics.bone(
            DiagnosticCode::ZeroLengthBone,
            &spec.name,
            "head and tail coincide; bone not realized",
        );
        report.skipped.push(spec.name.clone());
        return Ok(false);
    }
    if host.find_edit_bone(&spec.name)?.is_some() {
        report.updated.push(spec.name.clone());
        return Ok(true);
    }
    match host.new_edit_bone(&spec.name) {
        Ok(_) => {
            log::debug!("created bone '{}'", spec.name);
            report.created.push(spec.name.clone());
            Ok(true)
        }
        Err(e @ HostError::WrongMode { .. }) => Err(e),
        Err(e) => {
            diagnostics.bone(DiagnosticCode::InvalidFieldValue, &spec.name, e.to_string());
            report.skipped.push(spec.name.clone());
            Ok(false)
        }
    }
}

fn write_structure<H: RigHost + ?Sized>(
    host: &mut H,
    spec: &BoneSpec,
    resolver: &Resolver<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<(), HostError> {
    let name = spec.name.as_str();
    let parent = resolver.link(host, name, "parent", spec.parent.as_ref(), diagnostics);
    let handle_start = resolver.link(
        host,
        name,
        "bbone_custom_handle_start",
        spec.bbone_custom_handle_start.as_ref(),
        diagnostics,
    );
    let handle_end = resolver.link(
        host,
        name,
        "bbone_custom_handle_end",
        spec.bbone_custom_handle_end.as_ref(),
        diagnostics,
    );

    let Some(id) = host.find_edit_bone(name)? else {
        diagnostics.bone(DiagnosticCode::MissingLiveBone, name, "edit bone vanished");
        return Ok(());
    };
    let bone = host.edit_bone_mut(id)?;
    bone.head = spec.head;
    bone.tail = spec.tail;
    bone.roll = spec.roll;
    bone.use_connect = spec.use_connect;
    bone.bbone = spec.bbone.clone();
    // An absent reference clears the link; an unresolved one leaves it alone.
    if spec.parent.is_none() {
        bone.parent = None;
    } else if let Some(Some(id)) = parent {
        bone.parent = Some(id);
    }
    if spec.bbone_custom_handle_start.is_none() {
        bone.bbone_custom_handle_start = None;
    } else if let Some(Some(id)) = handle_start {
        bone.bbone_custom_handle_start = Some(id);
    }
    if spec.bbone_custom_handle_end.is_none() {
        bone.bbone_custom_handle_end = None;
    } else if let Some(Some(id)) = handle_end {
        bone.bbone_custom_handle_end = Some(id);
    }
    for prop in spec.custom_props_edit.values() {
        prop.make_real(bone);
    }
    Ok(())
}

fn write_behavior<H: RigHost + ?Sized>(
    host: &mut H,
    spec: &BoneSpec,
    resolver: &Resolver<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<(), HostError> {
    let name = spec.name.as_str();
    let shape_transform = resolver.link(
        host,
        name,
        "custom_shape_transform",
        spec.custom_shape_transform.as_ref(),
        diagnostics,
    );

    let Some(bone) = host.pose_bone_mut(name)? else {
        diagnostics.bone(
            DiagnosticCode::MissingLiveBone,
            name,
            "pose bone missing after edit session",
        );
        return Ok(());
    };
    bone.behavior = spec.behavior.clone();
    if spec.custom_shape_transform.is_none() {
        bone.custom_shape_transform = None;
    } else if let Some(Some(id)) = shape_transform {
        bone.custom_shape_transform = Some(id);
    }
    for prop in spec.custom_props_pose.values() {
        prop.make_real(bone);
    }

    for constraint_spec in &spec.constraints {
        let (constraint, errors) = constraint_spec.build();
        for e in errors {
            diagnostics.bone(
                DiagnosticCode::InvalidFieldValue,
                name,
                format!("constraint '{}': {}", constraint.name, e),
            );
        }
        if constraint_spec.name().is_some() {
            bone.put_constraint(constraint);
        } else {
            bone.add_constraint(constraint);
        }
    }

    for (key, driver) in &spec.drivers {
        let (relative, index) = split_array_index(key);
        let path = join_bone_path(name, relative);
        if let Err(e) = driver.make_real(host, &path, index) {
            diagnostics.bone(
                DiagnosticCode::DriverFailed,
                name,
                format!("driver at '{}': {}", key, e),
            );
        }
    }
    log::debug!("realized bone '{}'", name);
    Ok(())
}
