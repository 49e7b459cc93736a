//! Shared fixtures for frame adapter tests.

#![allow(dead_code)]

use framekit::memory::{FunctionLayout, MemberSpec, MemorySession};
use framekit::Address;

pub const MAIN: Address = 0x40_1000;
pub const LEAF: Address = 0x40_2000;

/// Open the frame at `$address` through `$api` and evaluate `$body` with it
/// bound to `$frame`. Both arms must produce the same type.
macro_rules! with_frame {
    ($session:ident, $address:expr, $api:expr, |$frame:ident| $body:expr) => {
        match $api {
            framekit::FrameApi::Struct => {
                let $frame = framekit::StructFrame::new(
                    &$session,
                    $session.frame_struct($address).unwrap(),
                )
                .unwrap();
                let output = $body;
                output
            }
            framekit::FrameApi::TypeInfo => {
                let $frame =
                    framekit::UdtFrame::new(&$session, $session.frame_type($address).unwrap())
                        .unwrap();
                let output = $body;
                output
            }
        }
    };
}

/// `main`: 8 bytes of locals, 4 saved, 4-byte return slot (base offset 12).
///
/// Native order: var_8, var_4, " s", " r", arg_0.
pub fn main_session() -> MemorySession {
    let session = MemorySession::new();
    session
        .add_function(
            FunctionLayout::new("main", MAIN)
                .locals(8)
                .saved_registers(4)
                .return_size(4),
        )
        .unwrap();
    session
        .add_member(MAIN, MemberSpec::new("var_8", -12, 4).with_type("int"))
        .unwrap();
    session
        .add_member(
            MAIN,
            MemberSpec::new("var_4", -8, 4)
                .with_type("int")
                .with_comment("counter"),
        )
        .unwrap();
    session
        .add_member(MAIN, MemberSpec::new("arg_0", 4, 4).with_type("char *"))
        .unwrap();
    session
}

/// `main` plus `leaf`, a frame with no return slot (base offset 8).
///
/// Leaf native order: a, b, " s".
pub fn two_function_session() -> MemorySession {
    let session = main_session();
    session
        .add_function(FunctionLayout::new("leaf", LEAF).locals(8))
        .unwrap();
    session.add_member(LEAF, MemberSpec::new("a", -8, 4)).unwrap();
    session.add_member(LEAF, MemberSpec::new("b", -4, 4)).unwrap();
    session
}
