//! The frame adapter contract.
//!
//! [`StackFrame`] is implemented once per native member API. Implementors
//! supply the variant-specific primitives (how a member is found, enumerated,
//! removed, and how the frame is identified); the provided methods turn them
//! into the common collection contract: offset translation, synthetic member
//! filtering, the error taxonomy, and length accounting.

use crate::engine::{FunctionQuery, MemberInfo};
use crate::hidden::HiddenMembers;
use crate::key::{AsFrameKey, FrameKey};
use crate::variable::StackVariable;
use crate::{FrameError, FrameResult};
use std::fmt;

// ── FrameOrigin ──────────────────────────────────────────────────────────────

/// Where a frame's user-facing offsets start, resolved once per adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOrigin {
    /// Native offset of the return-address slot.
    base_offset: i64,
    /// Bytes reserved for the return address.
    return_size: u64,
}

impl FrameOrigin {
    pub fn new(base_offset: i64, return_size: u64) -> Self {
        Self {
            base_offset,
            return_size,
        }
    }

    /// Read the origin of `function`'s frame from the engine.
    pub fn resolve<S>(session: &S, function: &S::Function) -> Self
    where
        S: FunctionQuery + ?Sized,
    {
        Self::new(
            session.return_address_offset(function),
            session.return_address_size(function),
        )
    }

    /// Constant added to a user-facing offset to get the native one.
    pub fn base_offset(&self) -> i64 {
        self.base_offset
    }

    pub fn return_size(&self) -> u64 {
        self.return_size
    }

    /// Whether the frame reserves an explicit return-address member.
    pub fn has_return_slot(&self) -> bool {
        self.return_size != 0
    }

    /// Native offset for a user-facing one; `None` on overflow.
    pub fn to_native(&self, offset: i64) -> Option<i64> {
        offset.checked_add(self.base_offset)
    }

    /// User-facing offset for a native one.
    pub fn to_user(&self, native_offset: i64) -> i64 {
        native_offset.saturating_sub(self.base_offset)
    }
}

// ── StackFrame ───────────────────────────────────────────────────────────────

/// Ordered collection of the user-visible variables of one function's frame.
///
/// Implementations are non-owning views over engine state: nothing is cached
/// besides the [`FrameOrigin`], so changes made through one adapter are seen
/// by every other adapter over the same native frame.
pub trait StackFrame: Sized {
    /// Native member handle.
    type Member: MemberInfo;
    /// Native position of a member, enough to remove it again.
    type Locator: Copy + fmt::Debug + PartialEq;

    /// Offset translation resolved at construction.
    fn origin(&self) -> &FrameOrigin;

    /// Synthetic member names for this frame.
    fn hidden(&self) -> &HiddenMembers;

    /// Engine identity of the native frame.
    fn frame_id(&self) -> u64;

    /// Member covering native byte `native_offset`.
    fn find_at(&self, native_offset: i64) -> Option<(Self::Locator, Self::Member)>;

    /// Member named exactly `name`.
    fn find_named(&self, name: &str) -> Option<(Self::Locator, Self::Member)>;

    /// Member at `position` in native order, synthetic members included.
    fn member_at_position(&self, position: usize) -> Option<(Self::Locator, Self::Member)>;

    /// Native member count, synthetic members included.
    fn native_len(&self) -> usize;

    /// Remove the member at `locator`.
    fn remove_at(&self, locator: Self::Locator) -> FrameResult<()>;

    fn base_offset(&self) -> i64 {
        self.origin().base_offset()
    }

    fn has_return_slot(&self) -> bool {
        self.origin().has_return_slot()
    }

    /// Look up a variable by user-facing offset or by name.
    fn get<K: AsFrameKey>(&self, key: K) -> FrameResult<StackVariable<'_, Self>> {
        let key = key.to_frame_key()?;
        self.lookup(&key)
    }

    /// Look up a variable by an already converted key.
    ///
    /// Synthetic members are never returned; looking one up is a miss.
    fn lookup(&self, key: &FrameKey) -> FrameResult<StackVariable<'_, Self>> {
        let found = match key {
            FrameKey::Offset(offset) => {
                let native = self.origin().to_native(*offset);
                tracing::trace!(%key, ?native, "looking up frame member by offset");
                native.and_then(|native| self.find_at(native))
            }
            FrameKey::Name(name) => {
                tracing::trace!(%key, "looking up frame member by name");
                self.find_named(name)
            }
        };

        match found {
            Some((locator, member))
                if !self
                    .hidden()
                    .is_synthetic(member.name(), self.has_return_slot()) =>
            {
                Ok(StackVariable::new(self, locator, member))
            }
            _ => Err(FrameError::NotFound(key.clone())),
        }
    }

    /// Delete the variable a key resolves to.
    ///
    /// The removal is immediate and is not rolled back on later failures.
    fn delete<K: AsFrameKey>(&self, key: K) -> FrameResult<()> {
        let variable = self.get(key)?;
        variable.delete()
    }

    /// Lazily enumerate user-visible variables in native order.
    fn iter(&self) -> Variables<'_, Self> {
        Variables::new(self)
    }

    /// Number of user-visible variables.
    fn len(&self) -> usize {
        let synthetic = self.hidden().synthetic_count(self.has_return_slot());
        self.native_len().saturating_sub(synthetic)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` views the same native frame.
    ///
    /// Engine ids are only unique within one session; adapters that know
    /// their session should also require it to match.
    fn same_frame(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.frame_id() == other.frame_id()
    }
}

// ── FrameVisitor ─────────────────────────────────────────────────────────────

/// An operation written once against [`StackFrame`] and run on whichever
/// adapter the engine's member API calls for.
pub trait FrameVisitor {
    type Output;

    fn visit<F: StackFrame>(self, frame: &F) -> Self::Output;
}

// ── Variables ────────────────────────────────────────────────────────────────

/// Iterator over the user-visible variables of a frame.
///
/// Each step reads the live native member list; nothing is snapshotted.
/// Mutating the frame while iterating gives engine-defined results.
pub struct Variables<'f, F: StackFrame> {
    frame: &'f F,
    position: usize,
}

impl<'f, F: StackFrame> Variables<'f, F> {
    fn new(frame: &'f F) -> Self {
        Self { frame, position: 0 }
    }
}

impl<'f, F: StackFrame> Iterator for Variables<'f, F> {
    type Item = StackVariable<'f, F>;

    fn next(&mut self) -> Option<Self::Item> {
        let has_return_slot = self.frame.has_return_slot();
        loop {
            let (locator, member) = self.frame.member_at_position(self.position)?;
            self.position += 1;
            if self.frame.hidden().is_synthetic(member.name(), has_return_slot) {
                continue;
            }
            return Some(StackVariable::new(self.frame, locator, member));
        }
    }
}

impl<F: StackFrame> fmt::Debug for Variables<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variables")
            .field("frame_id", &self.frame.frame_id())
            .field("position", &self.position)
            .finish()
    }
}
