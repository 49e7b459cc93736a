//! List command - print the visible variables of a frame

use super::{print_json, print_table, FrameContext, VariableRow};
use crate::FrameArgs;
use anyhow::Result;
use framekit::{FrameVisitor, StackFrame};

struct ListVariables;

impl FrameVisitor for ListVariables {
    type Output = Vec<VariableRow>;

    fn visit<F: StackFrame>(self, frame: &F) -> Vec<VariableRow> {
        frame.iter().map(|variable| VariableRow::from(&variable)).collect()
    }
}

/// Print every visible variable in frame order
pub fn run(args: &FrameArgs) -> Result<()> {
    let ctx = FrameContext::open(args)?;
    let rows = ctx.visit(ListVariables)?;

    if ctx.json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("{}: no variables", ctx.function);
    } else {
        print_table(&rows);
    }
    Ok(())
}
