use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use framekit::{EngineVersion, FrameApi};
use std::path::PathBuf;

mod commands;
mod logging;

/// Inspect and edit function stack frames in a session snapshot.
///
/// Frames are shown the way a reverse engineer reads them: offsets count
/// from the return-address slot, and the engine's saved-registers and
/// return-address slots are hidden.
///
/// EXAMPLES:
///     framekit list frames.toml -f main           List main's variables
///     framekit get frames.toml -f main -- -8      Variable at offset -8
///     framekit get frames.toml -f 0x401000 var_4  Variable named var_4
///     framekit delete frames.toml -f main var_4   Delete var_4 in place
///     framekit info frames.toml -f main --json    Frame facts as JSON
///
/// ENVIRONMENT VARIABLES:
///     FRAMEKIT_ENGINE_VERSION  Engine version deciding the member API
///     FRAMEKIT_FRAME_API       Member API ('struct' or 'type-info')
///     FRAMEKIT_JSON            Set to '1' for JSON output by default
///     RUST_LOG                 Log filter for diagnostics on stderr
#[derive(Parser)]
#[command(name = "framekit")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Log frame activity to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the visible variables of a frame
    ///
    /// EXAMPLES:
    ///     framekit list frames.toml -f main
    ///     framekit list frames.json -f 0x401000 --api struct
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        frame: FrameArgs,
    },

    /// Look up one variable by offset or name
    ///
    /// The key is read as JSON when it parses, so `-8` is an offset,
    /// `'"-8"'` is a name and `1.5` is rejected. Anything else is a name.
    ///
    /// EXAMPLES:
    ///     framekit get frames.toml -f main -- -8
    ///     framekit get frames.toml -f main var_4
    Get {
        #[command(flatten)]
        frame: FrameArgs,
        /// Offset relative to the return address, or member name
        #[arg(allow_hyphen_values = true)]
        key: String,
    },

    /// Delete one variable and write the snapshot back
    ///
    /// EXAMPLES:
    ///     framekit delete frames.toml -f main var_4
    ///     framekit delete frames.toml -f main -o edited.toml -- -8
    #[command(visible_alias = "rm")]
    Delete {
        #[command(flatten)]
        frame: FrameArgs,
        /// Offset relative to the return address, or member name
        #[arg(allow_hyphen_values = true)]
        key: String,
        /// Write the edited snapshot here instead of over the input
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show base offset, return slot, identity and count of a frame
    Info {
        #[command(flatten)]
        frame: FrameArgs,
    },
}

/// Options shared by every frame command.
#[derive(Args, Debug, Clone)]
pub struct FrameArgs {
    /// Session snapshot (.toml or .json)
    pub snapshot: PathBuf,

    /// Function owning the frame, by name or entry address
    #[arg(long, short = 'f')]
    pub function: String,

    /// Member API used to open the frame (struct or type-info)
    #[arg(long)]
    pub api: Option<FrameApi>,

    /// Engine version deciding the member API when --api is not given
    #[arg(long)]
    pub engine_version: Option<EngineVersion>,

    /// Project configuration file (default: nearest framekit.toml)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize_logging(cli.verbose);

    match cli.command {
        Commands::List { frame } => commands::list::run(&frame),
        Commands::Get { frame, key } => commands::get::run(&frame, &key),
        Commands::Delete { frame, key, output } => {
            commands::delete::run(&frame, &key, output.as_deref())
        }
        Commands::Info { frame } => commands::info::run(&frame),
    }
}
