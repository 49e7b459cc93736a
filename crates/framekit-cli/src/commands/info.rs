//! Info command - summarize a frame

use super::{print_json, FrameContext};
use crate::FrameArgs;
use anyhow::Result;
use framekit::{Address, FrameApi, FrameVisitor, StackFrame};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FrameInfo {
    function: String,
    address: Address,
    api: FrameApi,
    frame_id: u64,
    base_offset: i64,
    has_return_slot: bool,
    variables: usize,
    native_members: usize,
}

/// Reads identity and layout facts from the opened frame
struct DescribeFrame;

struct FrameFacts {
    frame_id: u64,
    base_offset: i64,
    has_return_slot: bool,
    variables: usize,
    native_members: usize,
}

impl FrameVisitor for DescribeFrame {
    type Output = FrameFacts;

    fn visit<F: StackFrame>(self, frame: &F) -> FrameFacts {
        FrameFacts {
            frame_id: frame.frame_id(),
            base_offset: frame.base_offset(),
            has_return_slot: frame.has_return_slot(),
            variables: frame.len(),
            native_members: frame.native_len(),
        }
    }
}

pub fn run(args: &FrameArgs) -> Result<()> {
    let ctx = FrameContext::open(args)?;
    let facts = ctx.visit(DescribeFrame)?;
    let info = FrameInfo {
        function: ctx.function.clone(),
        address: ctx.address,
        api: ctx.api,
        frame_id: facts.frame_id,
        base_offset: facts.base_offset,
        has_return_slot: facts.has_return_slot,
        variables: facts.variables,
        native_members: facts.native_members,
    };

    if ctx.json {
        return print_json(&info);
    }

    println!("function:        {} ({:#x})", info.function, info.address);
    println!("member api:      {}", info.api);
    println!("frame id:        {:#x}", info.frame_id);
    println!("base offset:     {}", info.base_offset);
    println!("return slot:     {}", if info.has_return_slot { "yes" } else { "no" });
    println!(
        "variables:       {} ({} native members)",
        info.variables, info.native_members
    );
    Ok(())
}
