//! Log output for tests.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "bindery=debug,bindery_extract=trace,warn";

/// Routes `tracing` output to the test harness.
///
/// Safe to call from every test; only the first call installs the
/// subscriber. The filter comes from `RUST_LOG`, falling back to debug
/// output for the bindery crates.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        // Another subscriber may already be installed by the test binary.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
