use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT_GUARD: OnceLock<()> = OnceLock::new();

/// Install the stderr subscriber once.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
/// output from the frame library with `--verbose`.
pub fn initialize_logging(verbose: bool) {
    if INIT_GUARD.set(()).is_err() {
        return;
    }

    let default_directive = if verbose { "framekit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let init_res = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(filter)
        .try_init();
    let _ = init_res; // ignore AlreadyInit
}
