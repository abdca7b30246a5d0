#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

/// Installs the test tracing subscriber once per binary.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
