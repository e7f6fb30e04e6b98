//! Test-only support code shared across `bsv-chain`'s test and doctest binaries.
//!
//! Mirrors the role of a typical protocol-library test-support crate: a
//! one-shot tracing subscriber for test binaries, a handful of fixed test
//! vectors, and re-exports that keep test modules terse.

use lazy_static::lazy_static;
use std::sync::Once;

pub mod vectors;

/// Commonly imported names for proptest- and assertion-heavy test modules.
pub mod prelude {
    pub use super::init;
    pub use proptest::prelude::*;

    /// The test-local `Result` alias used by property tests that want to use
    /// `?` to report `SerializationError`/similar values as proptest failures.
    pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
}

static INIT: Once = Once::new();

/// Initialize tracing for a test binary. Cheap and idempotent: safe to call
/// at the top of every test function.
pub fn init() {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                std::env::var("BSV_LOG").unwrap_or_else(|_| "bsv_chain=debug".to_owned()),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

lazy_static! {
    /// A `proptest::test_runner::Config` tuned down from the default case
    /// count, for property tests that are too slow to run at full volume on
    /// every `cargo test` invocation. Override with `PROPTEST_CASES`.
    pub static ref SMALL_RNG_CASES: u32 = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(32);
}
