//! Frames served through the type-information member API.

use crate::engine::{TypeInfoFrameApi, UDM_NOT_FOUND};
use crate::frame::{FrameOrigin, StackFrame, Variables};
use crate::hidden::HiddenMembers;
use crate::variable::StackVariable;
use crate::FrameResult;
use std::fmt;

/// Stack frame backed by a frame type record.
///
/// Lookups go through status-code queries, members are removed by index,
/// and identity is the record's type id rather than any struct id. Type ids
/// are only compared between adapters over the same session.
pub struct UdtFrame<'s, S: TypeInfoFrameApi> {
    session: &'s S,
    frame: S::Udt,
    origin: FrameOrigin,
    hidden: HiddenMembers,
}

impl<'s, S: TypeInfoFrameApi> UdtFrame<'s, S> {
    /// Wrap `frame`, resolving its owning function once.
    pub fn new(session: &'s S, frame: S::Udt) -> FrameResult<Self> {
        Self::with_hidden(session, frame, HiddenMembers::default())
    }

    /// Wrap `frame` with a non-default synthetic member policy.
    pub fn with_hidden(session: &'s S, frame: S::Udt, hidden: HiddenMembers) -> FrameResult<Self> {
        let address = session.frame_function(&frame)?;
        let function = session.function_at(address)?;
        let origin = FrameOrigin::resolve(session, &function);

        tracing::debug!(
            type_id = session.type_id(&frame),
            address,
            base_offset = origin.base_offset(),
            return_size = origin.return_size(),
            "opened type-info frame"
        );

        Ok(Self {
            session,
            frame,
            origin,
            hidden,
        })
    }

    /// Native frame handle.
    pub fn native(&self) -> &S::Udt {
        &self.frame
    }

    pub fn session(&self) -> &'s S {
        self.session
    }
}

/// Turn a `(status, member)` lookup result into a located member.
fn located<M>((status, member): (i64, M)) -> Option<(usize, M)> {
    if status == UDM_NOT_FOUND {
        return None;
    }
    usize::try_from(status).ok().map(|index| (index, member))
}

impl<'s, S: TypeInfoFrameApi> StackFrame for UdtFrame<'s, S> {
    type Member = S::Udm;
    type Locator = usize;

    fn origin(&self) -> &FrameOrigin {
        &self.origin
    }

    fn hidden(&self) -> &HiddenMembers {
        &self.hidden
    }

    fn frame_id(&self) -> u64 {
        self.session.type_id(&self.frame)
    }

    fn find_at(&self, native_offset: i64) -> Option<(usize, S::Udm)> {
        located(self.session.udm_by_offset(&self.frame, native_offset))
    }

    fn find_named(&self, name: &str) -> Option<(usize, S::Udm)> {
        located(self.session.udm_by_name(&self.frame, name))
    }

    fn member_at_position(&self, position: usize) -> Option<(usize, S::Udm)> {
        self.session
            .udm_by_index(&self.frame, position)
            .map(|member| (position, member))
    }

    fn native_len(&self) -> usize {
        self.session.udm_count(&self.frame)
    }

    fn remove_at(&self, index: usize) -> FrameResult<()> {
        self.session.delete_udms(&self.frame, index, index)?;
        Ok(())
    }

    fn same_frame(&self, other: &Self) -> bool {
        std::ptr::eq(self.session, other.session) && self.frame_id() == other.frame_id()
    }
}

impl<S: TypeInfoFrameApi> PartialEq for UdtFrame<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.same_frame(other)
    }
}

impl<'f, 's, S: TypeInfoFrameApi> IntoIterator for &'f UdtFrame<'s, S> {
    type Item = StackVariable<'f, UdtFrame<'s, S>>;
    type IntoIter = Variables<'f, UdtFrame<'s, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: TypeInfoFrameApi> fmt::Debug for UdtFrame<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdtFrame")
            .field("type_id", &self.frame_id())
            .field("origin", &self.origin)
            .finish()
    }
}
