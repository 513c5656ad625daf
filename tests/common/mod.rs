#![allow(dead_code)]

use bankers::{SystemConfig, Tracker};
use tracing_subscriber::EnvFilter;

/// Route tracker logs to the test writer; honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The classic five-process, three-resource safe state.
pub fn sample_tracker() -> Tracker {
    SystemConfig::sample().build().unwrap()
}
