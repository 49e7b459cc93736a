//! In-memory engine session.
//!
//! [`MemorySession`] keeps function frames in process memory and serves them
//! through both the struct and the type-information member APIs, so the same
//! frame can be opened as a [`StructFrame`](crate::StructFrame) or a
//! [`UdtFrame`](crate::UdtFrame). It is single-threaded: state lives in a
//! `RefCell` and every handle reads and writes the same frames.
//!
//! ```
//! use framekit::memory::{FunctionLayout, MemberSpec, MemorySession};
//! use framekit::{StackFrame, StructFrame};
//!
//! let session = MemorySession::new();
//! let main = session
//!     .add_function(FunctionLayout::new("main", 0x401000).locals(8).saved_registers(4).return_size(4))
//!     .unwrap();
//! session.add_member(main, MemberSpec::new("var_8", -12, 4)).unwrap();
//!
//! let frame = StructFrame::new(&session, session.frame_struct(main).unwrap()).unwrap();
//! assert_eq!(frame.len(), 1);
//! assert_eq!(frame.get(-12).unwrap().name(), "var_8");
//! ```

pub mod record;
pub mod snapshot;

pub use record::{FunctionLayout, MemberRecord, MemberSpec};
pub use snapshot::{FunctionSnapshot, MemberSnapshot, SessionSnapshot, SnapshotFormat};

use crate::engine::{
    Address, EngineError, EngineResult, FunctionQuery, StructFrameApi, TypeInfoFrameApi,
    UDM_NOT_FOUND,
};
use crate::frame::FrameVisitor;
use crate::hidden::HiddenMembers;
use crate::{FrameResult, StructFrame, UdtFrame};
use framekit_config::FrameApi;
use std::cell::RefCell;
use std::collections::BTreeMap;
use thiserror::Error;

const STRUCT_ID_BASE: u64 = 0xff00_0000;
const TYPE_ID_BASE: u64 = 0x8000_0000;

/// Errors raised by the in-memory engine.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no function at {0:#x}")]
    UnknownFunction(Address),

    #[error("no function named '{0}'")]
    UnknownFunctionName(String),

    #[error("function already defined at {0:#x}")]
    DuplicateFunction(Address),

    #[error("no frame with id {0:#x}")]
    UnknownFrame(u64),

    #[error("member '{name}' already exists in frame of {function:#x}")]
    DuplicateMember { function: Address, name: String },

    #[error("member '{name}' at offset {offset} overlaps '{existing}'")]
    Overlap {
        name: String,
        offset: i64,
        existing: String,
    },

    #[error("member '{name}' at offset {offset} lies outside the frame")]
    OutsideFrame { name: String, offset: i64 },

    #[error("frame layout of '{0}' does not fit in signed offsets")]
    InvalidLayout(String),

    #[error("no member at native offset {0}")]
    NoMemberAt(i64),

    #[error("member range {first}..={last} out of bounds for {len} members")]
    IndexOutOfRange {
        first: usize,
        last: usize,
        len: usize,
    },

    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML snapshot: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to write TOML snapshot: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for in-memory engine operations
pub type SessionResult<T> = Result<T, SessionError>;

// ── Handles ──────────────────────────────────────────────────────────────────

/// Struct-API handle to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructHandle {
    id: u64,
}

impl StructHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Type-information handle to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    tid: u64,
}

impl TypeHandle {
    pub fn tid(&self) -> u64 {
        self.tid
    }
}

/// Resolved function as [`FunctionQuery`] hands it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionInfo {
    pub address: Address,
    pub return_address_offset: i64,
    pub return_size: u64,
}

// ── State ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct FunctionEntry {
    layout: FunctionLayout,
    /// Native offset of the return-address slot.
    base: i64,
    struct_id: u64,
    type_id: u64,
    /// Sorted by native offset.
    members: Vec<MemberRecord>,
}

impl FunctionEntry {
    fn new(layout: FunctionLayout, ordinal: u64, hidden: &HiddenMembers) -> SessionResult<Self> {
        let invalid = || SessionError::InvalidLayout(layout.name.clone());
        let base = layout.return_address_offset().ok_or_else(invalid)?;
        let saved_at = i64::try_from(layout.local_size).map_err(|_| invalid())?;

        let mut members = vec![MemberRecord::generated(
            hidden.saved_registers(),
            saved_at,
            layout.saved_registers,
        )];
        if layout.return_size > 0 {
            members.push(MemberRecord::generated(
                hidden.return_address(),
                base,
                layout.return_size,
            ));
        }

        Ok(Self {
            layout,
            base,
            struct_id: STRUCT_ID_BASE + ordinal,
            type_id: TYPE_ID_BASE + ordinal,
            members,
        })
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo {
            address: self.layout.address,
            return_address_offset: self.base,
            return_size: self.layout.return_size,
        }
    }

    fn position_covering(&self, offset: i64) -> Option<usize> {
        self.members.iter().position(|m| m.covers(offset))
    }

    fn position_named(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    fn insert(&mut self, spec: MemberSpec) -> SessionResult<()> {
        // the member's end must fit in a native offset
        let span = i64::try_from(spec.size.max(1)).ok();
        let native = match spec.offset.checked_add(self.base) {
            Some(native) if native >= 0 && span.and_then(|s| native.checked_add(s)).is_some() => {
                native
            }
            _ => {
                return Err(SessionError::OutsideFrame {
                    name: spec.name,
                    offset: spec.offset,
                })
            }
        };
        if self.position_named(&spec.name).is_some() {
            return Err(SessionError::DuplicateMember {
                function: self.layout.address,
                name: spec.name,
            });
        }

        let user_offset = spec.offset;
        let record = MemberRecord::user(spec, native);
        if let Some(existing) = self.members.iter().find(|m| m.overlaps(&record)) {
            return Err(SessionError::Overlap {
                name: record.name,
                offset: user_offset,
                existing: existing.name.clone(),
            });
        }

        let at = self.members.partition_point(|m| m.offset <= native);
        self.members.insert(at, record);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SessionState {
    functions: BTreeMap<Address, FunctionEntry>,
    next_ordinal: u64,
}

impl SessionState {
    fn function(&self, address: Address) -> SessionResult<&FunctionEntry> {
        self.functions
            .get(&address)
            .ok_or(SessionError::UnknownFunction(address))
    }

    fn by_struct_id(&self, id: u64) -> SessionResult<&FunctionEntry> {
        self.functions
            .values()
            .find(|f| f.struct_id == id)
            .ok_or(SessionError::UnknownFrame(id))
    }

    fn by_struct_id_mut(&mut self, id: u64) -> SessionResult<&mut FunctionEntry> {
        self.functions
            .values_mut()
            .find(|f| f.struct_id == id)
            .ok_or(SessionError::UnknownFrame(id))
    }

    fn by_type_id(&self, tid: u64) -> SessionResult<&FunctionEntry> {
        self.functions
            .values()
            .find(|f| f.type_id == tid)
            .ok_or(SessionError::UnknownFrame(tid))
    }

    fn by_type_id_mut(&mut self, tid: u64) -> SessionResult<&mut FunctionEntry> {
        self.functions
            .values_mut()
            .find(|f| f.type_id == tid)
            .ok_or(SessionError::UnknownFrame(tid))
    }
}

// ── MemorySession ────────────────────────────────────────────────────────────

/// Engine session holding frames in memory.
///
/// Every frame gets a saved-registers slot, plus a return-address slot when
/// its layout reserves one. The slots are named after the session's
/// [`HiddenMembers`], so adapters opened with the same policy hide them.
#[derive(Debug, Default)]
pub struct MemorySession {
    state: RefCell<SessionState>,
    hidden: HiddenMembers,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose synthetic slots carry the names in `hidden`.
    pub fn with_hidden(hidden: HiddenMembers) -> Self {
        Self {
            state: RefCell::default(),
            hidden,
        }
    }

    /// Names given to the synthetic slots of every frame.
    pub fn hidden(&self) -> &HiddenMembers {
        &self.hidden
    }

    /// Register a function and create its frame with the synthetic slots.
    pub fn add_function(&self, layout: FunctionLayout) -> SessionResult<Address> {
        let mut state = self.state.borrow_mut();
        let address = layout.address;
        if state.functions.contains_key(&address) {
            return Err(SessionError::DuplicateFunction(address));
        }

        let entry = FunctionEntry::new(layout, state.next_ordinal, &self.hidden)?;
        state.next_ordinal += 1;
        tracing::debug!(
            function = %entry.layout.name,
            address,
            base_offset = entry.base,
            "added function frame"
        );
        state.functions.insert(address, entry);
        Ok(address)
    }

    /// Add a user member to the frame of the function at `address`.
    pub fn add_member(&self, address: Address, spec: MemberSpec) -> SessionResult<()> {
        let mut state = self.state.borrow_mut();
        state
            .functions
            .get_mut(&address)
            .ok_or(SessionError::UnknownFunction(address))?
            .insert(spec)
    }

    /// Struct-API handle for the frame of the function at `address`.
    pub fn frame_struct(&self, address: Address) -> SessionResult<StructHandle> {
        let state = self.state.borrow();
        let entry = state.function(address)?;
        Ok(StructHandle {
            id: entry.struct_id,
        })
    }

    /// Type-information handle for the frame of the function at `address`.
    pub fn frame_type(&self, address: Address) -> SessionResult<TypeHandle> {
        let state = self.state.borrow();
        let entry = state.function(address)?;
        Ok(TypeHandle { tid: entry.type_id })
    }

    /// Entry address of the function called `name`.
    pub fn function_named(&self, name: &str) -> SessionResult<Address> {
        self.state
            .borrow()
            .functions
            .values()
            .find(|f| f.layout.name == name)
            .map(|f| f.layout.address)
            .ok_or_else(|| SessionError::UnknownFunctionName(name.to_string()))
    }

    /// Open the frame of the function at `address` through `api` and run
    /// `visitor` on it. The adapter hides the session's own synthetic slots.
    pub fn visit_frame<V: FrameVisitor>(
        &self,
        address: Address,
        api: FrameApi,
        visitor: V,
    ) -> FrameResult<V::Output> {
        match api {
            FrameApi::Struct => {
                let handle = self.frame_struct(address).map_err(EngineError::from)?;
                let frame = StructFrame::with_hidden(self, handle, self.hidden.clone())?;
                Ok(visitor.visit(&frame))
            }
            FrameApi::TypeInfo => {
                let handle = self.frame_type(address).map_err(EngineError::from)?;
                let frame = UdtFrame::with_hidden(self, handle, self.hidden.clone())?;
                Ok(visitor.visit(&frame))
            }
        }
    }

    /// `(address, name)` of every function, by address.
    pub fn functions(&self) -> Vec<(Address, String)> {
        self.state
            .borrow()
            .functions
            .values()
            .map(|f| (f.layout.address, f.layout.name.clone()))
            .collect()
    }
}

// ── Engine API implementations ───────────────────────────────────────────────

impl FunctionQuery for MemorySession {
    type Function = FunctionInfo;

    fn function_at(&self, address: Address) -> EngineResult<FunctionInfo> {
        Ok(self.state.borrow().function(address)?.info())
    }

    fn return_address_offset(&self, function: &FunctionInfo) -> i64 {
        function.return_address_offset
    }

    fn return_address_size(&self, function: &FunctionInfo) -> u64 {
        function.return_size
    }
}

impl StructFrameApi for MemorySession {
    type Struct = StructHandle;
    type Member = MemberRecord;

    fn struct_id(&self, frame: &StructHandle) -> u64 {
        frame.id
    }

    fn function_by_frame(&self, frame_id: u64) -> EngineResult<Address> {
        Ok(self.state.borrow().by_struct_id(frame_id)?.layout.address)
    }

    fn member_at(&self, frame: &StructHandle, offset: i64) -> Option<MemberRecord> {
        let state = self.state.borrow();
        let entry = state.by_struct_id(frame.id).ok()?;
        entry.members.iter().find(|m| m.covers(offset)).cloned()
    }

    fn member_by_name(&self, frame: &StructHandle, name: &str) -> Option<MemberRecord> {
        let state = self.state.borrow();
        let entry = state.by_struct_id(frame.id).ok()?;
        entry.members.iter().find(|m| m.name == name).cloned()
    }

    fn member_by_index(&self, frame: &StructHandle, index: usize) -> Option<MemberRecord> {
        let state = self.state.borrow();
        let entry = state.by_struct_id(frame.id).ok()?;
        entry.members.get(index).cloned()
    }

    fn member_count(&self, frame: &StructHandle) -> usize {
        self.state
            .borrow()
            .by_struct_id(frame.id)
            .map(|entry| entry.members.len())
            .unwrap_or(0)
    }

    fn delete_member(&self, frame: &StructHandle, offset: i64) -> EngineResult<()> {
        let mut state = self.state.borrow_mut();
        let entry = state.by_struct_id_mut(frame.id)?;
        let position = entry
            .position_covering(offset)
            .ok_or(SessionError::NoMemberAt(offset))?;
        entry.members.remove(position);
        Ok(())
    }
}

impl TypeInfoFrameApi for MemorySession {
    type Udt = TypeHandle;
    type Udm = MemberRecord;

    fn type_id(&self, frame: &TypeHandle) -> u64 {
        frame.tid
    }

    fn frame_function(&self, frame: &TypeHandle) -> EngineResult<Address> {
        Ok(self.state.borrow().by_type_id(frame.tid)?.layout.address)
    }

    fn udm_by_offset(&self, frame: &TypeHandle, offset: i64) -> (i64, MemberRecord) {
        let state = self.state.borrow();
        let Ok(entry) = state.by_type_id(frame.tid) else {
            return (UDM_NOT_FOUND, MemberRecord::default());
        };
        match entry.position_covering(offset) {
            Some(index) => (index as i64, entry.members[index].clone()),
            None => (UDM_NOT_FOUND, MemberRecord::default()),
        }
    }

    fn udm_by_name(&self, frame: &TypeHandle, name: &str) -> (i64, MemberRecord) {
        let state = self.state.borrow();
        let Ok(entry) = state.by_type_id(frame.tid) else {
            return (UDM_NOT_FOUND, MemberRecord::default());
        };
        match entry.position_named(name) {
            Some(index) => (index as i64, entry.members[index].clone()),
            None => (UDM_NOT_FOUND, MemberRecord::default()),
        }
    }

    fn udm_by_index(&self, frame: &TypeHandle, index: usize) -> Option<MemberRecord> {
        let state = self.state.borrow();
        let entry = state.by_type_id(frame.tid).ok()?;
        entry.members.get(index).cloned()
    }

    fn udm_count(&self, frame: &TypeHandle) -> usize {
        self.state
            .borrow()
            .by_type_id(frame.tid)
            .map(|entry| entry.members.len())
            .unwrap_or(0)
    }

    fn delete_udms(&self, frame: &TypeHandle, first: usize, last: usize) -> EngineResult<()> {
        let mut state = self.state.borrow_mut();
        let entry = state.by_type_id_mut(frame.tid)?;
        let len = entry.members.len();
        if first > last || last >= len {
            return Err(SessionError::IndexOutOfRange { first, last, len }.into());
        }
        entry.members.drain(first..=last);
        Ok(())
    }
}
