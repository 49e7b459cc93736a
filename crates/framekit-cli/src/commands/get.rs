//! Get command - look up one variable by offset or name

use super::{parse_key, print_json, print_table, FrameContext, VariableRow};
use crate::FrameArgs;
use anyhow::{Context, Result};
use framekit::{FrameResult, FrameVisitor, StackFrame};
use serde_json::Value as JsonValue;

struct GetVariable {
    key: JsonValue,
}

impl FrameVisitor for GetVariable {
    type Output = FrameResult<VariableRow>;

    fn visit<F: StackFrame>(self, frame: &F) -> Self::Output {
        let variable = frame.get(&self.key)?;
        Ok(VariableRow::from(&variable))
    }
}

/// Print the variable `key` resolves to
pub fn run(args: &FrameArgs, key: &str) -> Result<()> {
    let ctx = FrameContext::open(args)?;
    let row = ctx
        .visit(GetVariable { key: parse_key(key) })?
        .with_context(|| format!("Lookup of '{}' in {} failed", key, ctx.function))?;

    if ctx.json {
        print_json(&row)
    } else {
        print_table(std::slice::from_ref(&row));
        Ok(())
    }
}
