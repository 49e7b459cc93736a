//! framekit: engine-agnostic stack frames
//!
//! Disassembly engines describe a function's stack frame in incompatible
//! native shapes. Older engines serve a struct-like aggregate of byte-offset
//! members; newer ones serve a type-information record whose members are
//! addressed by index. Both inject hidden slots for the saved registers and
//! the return address, and both count offsets from the start of the
//! aggregate rather than from the return address a reverse engineer reasons
//! about.
//!
//! [`StackFrame`] hides those differences behind one ordered collection:
//! look up by user-facing offset or name, iterate in frame order, delete,
//! count. [`StructFrame`] and [`UdtFrame`] implement it over the two native
//! member APIs described in [`engine`]; [`memory::MemorySession`] is an
//! in-memory engine serving both.
//!
//! # Example
//!
//! ```
//! use framekit::memory::{FunctionLayout, MemberSpec, MemorySession};
//! use framekit::{FrameError, StackFrame, UdtFrame};
//!
//! let session = MemorySession::new();
//! let f = session
//!     .add_function(FunctionLayout::new("f", 0x1000).locals(8).saved_registers(0).return_size(8))
//!     .unwrap();
//! session.add_member(f, MemberSpec::new("buf", -8, 8).with_type("char[8]")).unwrap();
//!
//! let frame = UdtFrame::new(&session, session.frame_type(f).unwrap()).unwrap();
//! assert_eq!(frame.base_offset(), 8);
//! assert_eq!(frame.get("buf").unwrap().offset(), -8);
//!
//! frame.delete(-8).unwrap();
//! assert!(matches!(frame.get(-8), Err(FrameError::NotFound(_))));
//! ```

pub mod engine;
pub mod frame;
pub mod hidden;
pub mod key;
pub mod memory;
pub mod struct_frame;
pub mod udt_frame;
pub mod variable;

use thiserror::Error;

/// Frame adapter errors
#[derive(Debug, Error)]
pub enum FrameError {
    /// The lookup key is neither an integer offset nor a name.
    #[error("frame key must be an integer offset or a name, got {0}")]
    InvalidKeyType(String),

    /// Nothing visible lives at the requested offset or name.
    #[error("unable to find stack variable from: {0}")]
    NotFound(FrameKey),

    /// The engine session failed; passed through untouched.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type for frame operations
pub type FrameResult<T> = Result<T, FrameError>;

pub use engine::{
    Address, EngineError, EngineResult, FunctionQuery, MemberInfo, StructFrameApi,
    TypeInfoFrameApi,
};
pub use frame::{FrameOrigin, FrameVisitor, StackFrame, Variables};
pub use hidden::{HiddenMembers, RETURN_ADDRESS_MARKER, SAVED_REGISTERS_MARKER};
pub use key::{AsFrameKey, FrameKey};
pub use struct_frame::StructFrame;
pub use udt_frame::UdtFrame;
pub use variable::StackVariable;

pub use framekit_config::{EngineVersion, FrameApi};
