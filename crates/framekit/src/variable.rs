//! Per-lookup view of one frame member.

use crate::engine::MemberInfo;
use crate::frame::StackFrame;
use crate::FrameResult;
use std::fmt;

/// A stack variable located in a frame.
///
/// Views are created per lookup or iteration step and never cached. They
/// borrow their frame and stay valid until the member is deleted or the
/// frame is otherwise changed.
pub struct StackVariable<'f, F: StackFrame> {
    frame: &'f F,
    locator: F::Locator,
    member: F::Member,
}

impl<'f, F: StackFrame> StackVariable<'f, F> {
    pub(crate) fn new(frame: &'f F, locator: F::Locator, member: F::Member) -> Self {
        Self {
            frame,
            locator,
            member,
        }
    }

    pub fn name(&self) -> &str {
        self.member.name()
    }

    /// Offset relative to the return-address slot.
    pub fn offset(&self) -> i64 {
        self.frame.origin().to_user(self.member.offset())
    }

    /// Offset from the start of the native frame aggregate.
    pub fn native_offset(&self) -> i64 {
        self.member.offset()
    }

    pub fn size(&self) -> u64 {
        self.member.size()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.member.type_name()
    }

    pub fn comment(&self) -> Option<&str> {
        self.member.comment()
    }

    /// Native position used to delete this member.
    pub fn locator(&self) -> F::Locator {
        self.locator
    }

    /// Underlying engine member handle.
    pub fn member(&self) -> &F::Member {
        &self.member
    }

    /// Frame this variable was found in.
    pub fn frame(&self) -> &'f F {
        self.frame
    }

    /// Remove this member from its frame without repeating the lookup.
    pub fn delete(self) -> FrameResult<()> {
        tracing::debug!(
            frame_id = self.frame.frame_id(),
            name = self.name(),
            locator = ?self.locator,
            "deleting stack variable"
        );
        self.frame.remove_at(self.locator)
    }
}

impl<F: StackFrame> fmt::Debug for StackVariable<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackVariable")
            .field("name", &self.name())
            .field("offset", &self.offset())
            .field("size", &self.size())
            .field("locator", &self.locator)
            .finish()
    }
}
