//! Frame commands and the pieces they share

pub mod delete;
pub mod get;
pub mod info;
pub mod list;

use crate::FrameArgs;
use anyhow::{Context, Result};
use framekit::memory::MemorySession;
use framekit::{
    Address, EngineVersion, FrameApi, FrameVisitor, HiddenMembers, StackFrame, StackVariable,
};
use framekit_config::{Config, ConfigLoader};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Snapshot, configuration and frame selection resolved from the command line.
pub struct FrameContext {
    pub session: MemorySession,
    pub address: Address,
    pub function: String,
    pub api: FrameApi,
    pub json: bool,
}

impl FrameContext {
    pub fn open(args: &FrameArgs) -> Result<Self> {
        let config = load_config(args)?;
        let hidden = HiddenMembers::from_config(&config);
        let session = MemorySession::load_with_hidden(&args.snapshot, hidden)
            .with_context(|| format!("Failed to load snapshot: {}", args.snapshot.display()))?;
        let (address, function) = resolve_function(&session, &args.function)?;

        // Command-line flags override configuration
        let api = args
            .api
            .or_else(|| args.engine_version.map(EngineVersion::frame_api))
            .unwrap_or_else(|| config.frame_api());

        tracing::debug!(
            function = %function,
            address,
            api = %api,
            project = config.is_project(),
            "resolved frame target"
        );

        Ok(Self {
            session,
            address,
            function,
            api,
            json: args.json || config.json_output(),
        })
    }

    /// Open the target frame and run `visitor` on it.
    pub fn visit<V: FrameVisitor>(&self, visitor: V) -> Result<V::Output> {
        self.session
            .visit_frame(self.address, self.api, visitor)
            .with_context(|| format!("Failed to open the frame of {}", self.function))
    }
}

fn load_config(args: &FrameArgs) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    match &args.config {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => {
            let cwd = std::env::current_dir()?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load framekit.toml")
        }
    }
}

/// Find a function by name, falling back to a hex or decimal entry address.
fn resolve_function(session: &MemorySession, function: &str) -> Result<(Address, String)> {
    if let Ok(address) = session.function_named(function) {
        return Ok((address, function.to_string()));
    }

    let address = parse_address(function)
        .with_context(|| format!("No function named '{}'", function))?;
    session
        .functions()
        .into_iter()
        .find(|(candidate, _)| *candidate == address)
        .with_context(|| format!("No function at {:#x}", address))
}

fn parse_address(text: &str) -> Option<Address> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => Address::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Read a command-line key as JSON when it parses, else as a name.
pub fn parse_key(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

// ── Output ───────────────────────────────────────────────────────────────────

/// One variable as printed by the commands.
#[derive(Debug, Clone, Serialize)]
pub struct VariableRow {
    pub name: String,
    pub offset: i64,
    pub size: u64,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl<F: StackFrame> From<&StackVariable<'_, F>> for VariableRow {
    fn from(variable: &StackVariable<'_, F>) -> Self {
        Self {
            name: variable.name().to_string(),
            offset: variable.offset(),
            size: variable.size(),
            type_name: variable.type_name().map(str::to_string),
            comment: variable.comment().map(str::to_string),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

pub fn print_table(rows: &[VariableRow]) {
    let name_width = rows
        .iter()
        .map(|row| row.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!("{:>8}  {:>6}  {:<name_width$}  TYPE", "OFFSET", "SIZE", "NAME");
    for row in rows {
        print_row(row, name_width);
    }
}

fn print_row(row: &VariableRow, name_width: usize) {
    let mut line = format!(
        "{:>8}  {:>6}  {:<name_width$}  {}",
        row.offset,
        row.size,
        row.name,
        row.type_name.as_deref().unwrap_or("-"),
    );
    if let Some(comment) = &row.comment {
        line.push_str("  ; ");
        line.push_str(comment);
    }
    println!("{}", line.trim_end());
}
