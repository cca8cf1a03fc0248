//! Logging initialization
//!
//! The library only emits `tracing` events. Binaries call `init` once to
//! install a formatting subscriber that writes to stderr.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "entity_audit=info";

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber
///
/// `verbose` lowers the default filter to debug; an explicit `RUST_LOG`
/// always wins. Later calls are no-ops.
pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let fallback = if verbose {
            "entity_audit=debug"
        } else {
            DEFAULT_FILTER
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(false);
        init(true);
        tracing::debug!("still fine after repeated init");
    }
}
