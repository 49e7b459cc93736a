//! Serialized form of a [`MemorySession`].
//!
//! ```toml
//! [[function]]
//! name = "main"
//! address = 4198400
//! local_size = 16
//! saved_registers = 4
//! return_size = 4
//!
//! [[function.member]]
//! name = "var_4"
//! offset = -8
//! size = 4
//! type = "int"
//! ```
//!
//! Member offsets are user-facing. Synthetic slots are derived from the
//! layout and never appear in a snapshot.

use super::record::{FunctionLayout, MemberSpec};
use super::{MemorySession, SessionResult};
use crate::engine::Address;
use crate::hidden::HiddenMembers;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Toml,
    Json,
}

impl SnapshotFormat {
    /// Pick the format from a file extension; TOML unless it is `.json`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Toml,
        }
    }
}

/// Every function frame of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSnapshot {
    #[serde(default, rename = "function", skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionSnapshot>,
}

/// One function and its user members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionSnapshot {
    pub name: String,
    pub address: Address,
    #[serde(default)]
    pub local_size: u64,
    #[serde(default)]
    pub saved_registers: u64,
    #[serde(default)]
    pub return_size: u64,
    #[serde(default, rename = "member", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberSnapshot>,
}

/// One user member, at a user-facing offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSnapshot {
    pub name: String,
    pub offset: i64,
    pub size: u64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SessionSnapshot {
    pub fn parse(text: &str, format: SnapshotFormat) -> SessionResult<Self> {
        Ok(match format {
            SnapshotFormat::Toml => toml::from_str(text)?,
            SnapshotFormat::Json => serde_json::from_str(text)?,
        })
    }

    pub fn render(&self, format: SnapshotFormat) -> SessionResult<String> {
        Ok(match format {
            SnapshotFormat::Toml => toml::to_string_pretty(self)?,
            SnapshotFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Read a snapshot file, format chosen by extension.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, SnapshotFormat::from_path(path))
    }

    /// Write a snapshot file, format chosen by extension.
    pub fn save(&self, path: &Path) -> SessionResult<()> {
        let text = self.render(SnapshotFormat::from_path(path))?;
        fs::write(path, text)?;
        Ok(())
    }
}

impl FunctionSnapshot {
    fn layout(&self) -> FunctionLayout {
        FunctionLayout::new(self.name.clone(), self.address)
            .locals(self.local_size)
            .saved_registers(self.saved_registers)
            .return_size(self.return_size)
    }
}

impl From<&MemberSnapshot> for MemberSpec {
    fn from(member: &MemberSnapshot) -> Self {
        MemberSpec {
            name: member.name.clone(),
            offset: member.offset,
            size: member.size,
            type_name: member.type_name.clone(),
            comment: member.comment.clone(),
        }
    }
}

impl MemorySession {
    /// Build a session holding every frame of `snapshot`.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> SessionResult<Self> {
        Self::from_snapshot_with_hidden(snapshot, HiddenMembers::default())
    }

    /// Like [`from_snapshot`](Self::from_snapshot), naming the synthetic
    /// slots after `hidden`.
    pub fn from_snapshot_with_hidden(
        snapshot: &SessionSnapshot,
        hidden: HiddenMembers,
    ) -> SessionResult<Self> {
        let session = MemorySession::with_hidden(hidden);
        for function in &snapshot.functions {
            let address = session.add_function(function.layout())?;
            for member in &function.members {
                session.add_member(address, member.into())?;
            }
        }
        Ok(session)
    }

    /// Capture the current state, synthetic slots excluded.
    pub fn to_snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        let functions = state
            .functions
            .values()
            .map(|entry| {
                let base = entry.base;
                FunctionSnapshot {
                    name: entry.layout.name.clone(),
                    address: entry.layout.address,
                    local_size: entry.layout.local_size,
                    saved_registers: entry.layout.saved_registers,
                    return_size: entry.layout.return_size,
                    members: entry
                        .members
                        .iter()
                        .filter(|m| !m.generated)
                        .map(|m| MemberSnapshot {
                            name: m.name.clone(),
                            offset: m.offset - base,
                            size: m.size,
                            type_name: m.type_name.clone(),
                            comment: m.comment.clone(),
                        })
                        .collect(),
                }
            })
            .collect();
        SessionSnapshot { functions }
    }

    /// Load a session from a snapshot file.
    pub fn load(path: &Path) -> SessionResult<Self> {
        Self::from_snapshot(&SessionSnapshot::load(path)?)
    }

    /// Load a session from a snapshot file, naming the synthetic slots after
    /// `hidden`.
    pub fn load_with_hidden(path: &Path, hidden: HiddenMembers) -> SessionResult<Self> {
        Self::from_snapshot_with_hidden(&SessionSnapshot::load(path)?, hidden)
    }

    /// Write the session to a snapshot file.
    pub fn save(&self, path: &Path) -> SessionResult<()> {
        self.to_snapshot().save(path)
    }
}
