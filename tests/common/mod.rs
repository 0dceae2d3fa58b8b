/*
 * Helpers shared by the integration tests.
 */
#![allow(dead_code)]

use guacamole::Backend;

/// Draws used by the statistical tests.
pub const SAMPLES: usize = 200_000;

/// Installs `env_logger` once per test binary; set `RUST_LOG=debug` to see dispatch decisions.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every backend the current machine can run: the portable one, plus the accelerated one if any.
pub fn backends() -> Vec<Backend> {
    let mut all = vec![Backend::Portable];
    all.extend(Backend::accelerated());

    all
}
