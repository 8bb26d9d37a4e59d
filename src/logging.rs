//! One-shot structured logging setup, for binaries only — the library
//! itself only ever emits `tracing` events and never installs a
//! subscriber. Stands in for
//! `original_source/include/haquests/utils/logger.hpp`'s singleton
//! `Logger`, which this crate deliberately does not port (see
//! `DESIGN.md`): `tracing-subscriber` already gives every consumer of
//! this library its own choice of sink, format, and filter.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a `tracing-subscriber` formatter reading its filter from
/// `HAQUESTS_LOG` (falling back to `info`). Safe to call more than
/// once; only the first call takes effect.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("HAQUESTS_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
