//! Logger bootstrap for the CLI driver and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// When `verbose` is `true`, debug messages (state transitions, action edges,
/// spawn/despawn) are printed. Otherwise only info level and above are shown.
/// `RUST_LOG` takes precedence over both.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // A logger installed earlier (by a host or another test) wins.
    if let Err(e) = builder.try_init() {
        log::debug!("keeping existing logger: {e}");
    }
}
