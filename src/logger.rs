//! Logging setup for the CLI using the `tracing` ecosystem.
//!
//! Level selection, in order: `--verbose` (debug), `--quiet` (errors only),
//! `RUST_LOG`, then info. Output goes to stderr so stdout stays free for
//! rendered documents.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("apidoc=debug")
    } else if quiet {
        EnvFilter::new("apidoc=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("apidoc=info"))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}
