//! Diagnostic logging to stderr
//!
//! `RUST_LOG` takes precedence; otherwise only warnings are shown unless
//! `--debug` is given.

use tracing_subscriber::EnvFilter;

pub(crate) fn init_logging(debug: bool) {
    let default_directive = if debug {
        "sessionstack=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
