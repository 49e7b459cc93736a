//! Function layouts and member records of the in-memory engine.

use crate::engine::{Address, MemberInfo};

// ── FunctionLayout ───────────────────────────────────────────────────────────

/// Shape of a function's frame.
///
/// Native layout, from offset 0 upwards: `local_size` bytes of locals, the
/// saved-registers slot, the return-address slot (when `return_size > 0`),
/// then incoming arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionLayout {
    pub name: String,
    pub address: Address,
    pub local_size: u64,
    pub saved_registers: u64,
    pub return_size: u64,
}

impl FunctionLayout {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            local_size: 0,
            saved_registers: 0,
            return_size: 0,
        }
    }

    pub fn locals(mut self, size: u64) -> Self {
        self.local_size = size;
        self
    }

    pub fn saved_registers(mut self, size: u64) -> Self {
        self.saved_registers = size;
        self
    }

    pub fn return_size(mut self, size: u64) -> Self {
        self.return_size = size;
        self
    }

    /// Native offset of the return-address slot.
    ///
    /// `None` when the locals, saved registers and return slot together do
    /// not fit in a signed native offset.
    pub fn return_address_offset(&self) -> Option<i64> {
        let base = self.local_size.checked_add(self.saved_registers)?;
        let end = base.checked_add(self.return_size)?;
        i64::try_from(end).ok()?;
        i64::try_from(base).ok()
    }
}

// ── MemberSpec ───────────────────────────────────────────────────────────────

/// A user member to add to a frame, positioned by user-facing offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSpec {
    pub name: String,
    pub offset: i64,
    pub size: u64,
    pub type_name: Option<String>,
    pub comment: Option<String>,
}

impl MemberSpec {
    pub fn new(name: impl Into<String>, offset: i64, size: u64) -> Self {
        Self {
            name: name.into(),
            offset,
            size,
            type_name: None,
            comment: None,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

// ── MemberRecord ─────────────────────────────────────────────────────────────

/// A native frame member as the in-memory engine stores and hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberRecord {
    pub(crate) name: String,
    pub(crate) offset: i64,
    pub(crate) size: u64,
    pub(crate) type_name: Option<String>,
    pub(crate) comment: Option<String>,
    /// Created from the layout rather than added by a caller.
    pub(crate) generated: bool,
}

impl MemberRecord {
    pub(crate) fn user(spec: MemberSpec, native_offset: i64) -> Self {
        Self {
            name: spec.name,
            offset: native_offset,
            size: spec.size,
            type_name: spec.type_name,
            comment: spec.comment,
            generated: false,
        }
    }

    pub(crate) fn generated(name: &str, native_offset: i64, size: u64) -> Self {
        Self {
            name: name.to_string(),
            offset: native_offset,
            size,
            type_name: None,
            comment: None,
            generated: true,
        }
    }

    /// Whether this member occupies native byte `offset`.
    ///
    /// Zero-sized members only occupy their own offset.
    pub(crate) fn covers(&self, offset: i64) -> bool {
        offset == self.offset || (offset > self.offset && offset < self.end())
    }

    fn end(&self) -> i64 {
        i64::try_from(self.size).map_or(i64::MAX, |size| self.offset.saturating_add(size))
    }

    /// Whether this member's bytes intersect `other`'s.
    pub(crate) fn overlaps(&self, other: &MemberRecord) -> bool {
        let span = |m: &MemberRecord| (m.offset, m.end().max(m.offset.saturating_add(1)));
        let (a_start, a_end) = span(self);
        let (b_start, b_end) = span(other);
        a_start < b_end && b_start < a_end
    }
}

impl MemberInfo for MemberRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset(&self) -> i64 {
        self.offset
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
