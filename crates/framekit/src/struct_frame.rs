//! Frames served through the struct-style member API.

use crate::engine::{MemberInfo, StructFrameApi};
use crate::frame::{FrameOrigin, StackFrame, Variables};
use crate::hidden::HiddenMembers;
use crate::variable::StackVariable;
use crate::FrameResult;
use std::fmt;

/// Stack frame backed by a native frame aggregate.
///
/// Members are located by native byte offset or name and removed by byte
/// offset. Two adapters are equal when they wrap the same struct id of the
/// same session.
pub struct StructFrame<'s, S: StructFrameApi> {
    session: &'s S,
    frame: S::Struct,
    origin: FrameOrigin,
    hidden: HiddenMembers,
}

impl<'s, S: StructFrameApi> StructFrame<'s, S> {
    /// Wrap `frame`, resolving its owning function once.
    pub fn new(session: &'s S, frame: S::Struct) -> FrameResult<Self> {
        Self::with_hidden(session, frame, HiddenMembers::default())
    }

    /// Wrap `frame` with a non-default synthetic member policy.
    pub fn with_hidden(
        session: &'s S,
        frame: S::Struct,
        hidden: HiddenMembers,
    ) -> FrameResult<Self> {
        let frame_id = session.struct_id(&frame);
        let address = session.function_by_frame(frame_id)?;
        let function = session.function_at(address)?;
        let origin = FrameOrigin::resolve(session, &function);

        tracing::debug!(
            frame_id,
            address,
            base_offset = origin.base_offset(),
            return_size = origin.return_size(),
            "opened struct frame"
        );

        Ok(Self {
            session,
            frame,
            origin,
            hidden,
        })
    }

    /// Native frame handle.
    pub fn native(&self) -> &S::Struct {
        &self.frame
    }

    pub fn session(&self) -> &'s S {
        self.session
    }
}

impl<'s, S: StructFrameApi> StackFrame for StructFrame<'s, S> {
    type Member = S::Member;
    type Locator = i64;

    fn origin(&self) -> &FrameOrigin {
        &self.origin
    }

    fn hidden(&self) -> &HiddenMembers {
        &self.hidden
    }

    fn frame_id(&self) -> u64 {
        self.session.struct_id(&self.frame)
    }

    fn find_at(&self, native_offset: i64) -> Option<(i64, S::Member)> {
        self.session
            .member_at(&self.frame, native_offset)
            .map(|member| (member.offset(), member))
    }

    fn find_named(&self, name: &str) -> Option<(i64, S::Member)> {
        self.session
            .member_by_name(&self.frame, name)
            .map(|member| (member.offset(), member))
    }

    fn member_at_position(&self, position: usize) -> Option<(i64, S::Member)> {
        self.session
            .member_by_index(&self.frame, position)
            .map(|member| (member.offset(), member))
    }

    fn native_len(&self) -> usize {
        self.session.member_count(&self.frame)
    }

    fn remove_at(&self, offset: i64) -> FrameResult<()> {
        self.session.delete_member(&self.frame, offset)?;
        Ok(())
    }

    fn same_frame(&self, other: &Self) -> bool {
        std::ptr::eq(self.session, other.session) && self.frame_id() == other.frame_id()
    }
}

impl<S: StructFrameApi> PartialEq for StructFrame<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.same_frame(other)
    }
}

impl<'f, 's, S: StructFrameApi> IntoIterator for &'f StructFrame<'s, S> {
    type Item = StackVariable<'f, StructFrame<'s, S>>;
    type IntoIter = Variables<'f, StructFrame<'s, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: StructFrameApi> fmt::Debug for StructFrame<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructFrame")
            .field("struct_id", &self.frame_id())
            .field("origin", &self.origin)
            .finish()
    }
}
