//! Delete command - remove one variable and save the snapshot

use super::{parse_key, print_json, FrameContext, VariableRow};
use crate::FrameArgs;
use anyhow::{Context, Result};
use framekit::{FrameResult, FrameVisitor, StackFrame};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::Path;

struct DeleteVariable {
    key: JsonValue,
}

impl FrameVisitor for DeleteVariable {
    type Output = FrameResult<VariableRow>;

    fn visit<F: StackFrame>(self, frame: &F) -> Self::Output {
        let variable = frame.get(&self.key)?;
        let row = VariableRow::from(&variable);
        variable.delete()?;
        Ok(row)
    }
}

#[derive(Serialize)]
struct DeleteReport<'a> {
    function: &'a str,
    deleted: VariableRow,
    snapshot: String,
}

/// Delete the variable `key` resolves to and write the snapshot to `output`,
/// or back over the input when no output is given
pub fn run(args: &FrameArgs, key: &str, output: Option<&Path>) -> Result<()> {
    let ctx = FrameContext::open(args)?;
    let deleted = ctx
        .visit(DeleteVariable { key: parse_key(key) })?
        .with_context(|| format!("Delete of '{}' in {} failed", key, ctx.function))?;

    let target = output.unwrap_or(args.snapshot.as_path());
    ctx.session
        .save(target)
        .with_context(|| format!("Failed to write snapshot: {}", target.display()))?;

    if ctx.json {
        print_json(&DeleteReport {
            function: &ctx.function,
            deleted,
            snapshot: target.display().to_string(),
        })
    } else {
        println!(
            "Deleted {} (offset {}) from {}",
            deleted.name, deleted.offset, ctx.function
        );
        println!("Wrote {}", target.display());
        Ok(())
    }
}
