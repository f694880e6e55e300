//! Loading graph documents and rig files.
//!
//! A graph document describes bones as field maps, the same names
//! [`BoneSpec::set_field`](rigkit_ir::BoneSpec::set_field) accepts:
//!
//! ```json
//! {
//!   "name": "RIG",
//!   "defaults": { "use_deform": false },
//!   "bones": [
//!     { "name": "Spine", "tail": [0, 0, 1] },
//!     { "name": "Neck", "head": [0, 0, 1], "tail": [0, 0, 1.5], "parent": "Spine" }
//!   ]
//! }
//! ```
//!
//! Rig files are [`MemoryRig`] documents.

use anyhow::{Context, Result};
use rigkit_ir::{BoneGraph, FieldMap, MemoryRig};
use serde::{Deserialize, Serialize};
use std::fs;

/// Rig name used when a graph is realized into a new rig.
pub const DEFAULT_RIG_NAME: &str = "Armature";

/// One bone entry of a graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneEntry {
    pub name: String,
    /// Replace an earlier entry of the same name instead of keeping it.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
    /// Every other key is a bone field.
    #[serde(flatten)]
    pub fields: FieldMap,
}

fn default_overwrite() -> bool {
    true
}

/// A bone graph as stored on disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDocument {
    /// Name of the rig to create when no rig file is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Field values applied to every bone before its own fields.
    #[serde(default)]
    pub defaults: FieldMap,
    #[serde(default)]
    pub bones: Vec<BoneEntry>,
}

impl GraphDocument {
    /// Returns the rig name for a new rig.
    pub fn rig_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_RIG_NAME)
    }

    /// Builds the bone graph, failing on the first invalid field.
    pub fn into_graph(self) -> Result<BoneGraph> {
        let mut graph =
            BoneGraph::with_defaults(self.defaults).context("Invalid graph defaults")?;
        for entry in &self.bones {
            graph
                .bone_with_fields(&entry.name, None, entry.overwrite, &entry.fields)
                .with_context(|| format!("Invalid fields for bone '{}'", entry.name))?;
        }
        Ok(graph)
    }
}

/// Reads a graph document.
pub fn load_graph(path: &str) -> Result<GraphDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read graph file: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse graph: {}", path))
}

/// Reads a rig file.
pub fn load_rig(path: &str) -> Result<MemoryRig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read rig file: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse rig: {}", path))
}

/// Writes a rig file as pretty-printed JSON.
pub fn write_rig(rig: &MemoryRig, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(rig).context("Failed to serialize rig")?;
    fs::write(path, json).with_context(|| format!("Failed to write rig file: {}", path))
}
