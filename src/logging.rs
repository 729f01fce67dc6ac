//! Tracing initialisation.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Installs a global `fmt` subscriber filtered by `MOLDB_LOG`
/// (e.g. `MOLDB_LOG=moldb=debug`), falling back to `moldb=info`.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("MOLDB_LOG").unwrap_or_else(|_| EnvFilter::new("moldb=info"));

        // A subscriber installed by the embedding application wins.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .try_init();
    });
}
