//! Resolves the process-wide dispatch policy with `GUACAMOLE_PORTABLE` set, so it
//! gets a test binary of its own.

mod common;

use guacamole::{Backend, Guacamole, PORTABLE_ENV, maybe_enable_accelerated};

#[test]
fn portable_env_var_pins_the_portable_engine() {
    // SAFETY: the only test in this binary, and it runs before anything reads the environment
    unsafe { std::env::set_var(PORTABLE_ENV, "1") };

    common::init_logging();

    assert!(!maybe_enable_accelerated());
    assert_eq!(Backend::detect(), Backend::Portable);

    let g = Guacamole::new();
    assert_eq!(g.backend(), Backend::Portable);
    assert_eq!(g.bytes(8), [0x9a, 0x97, 0xf6, 0x5b, 0x9b, 0x4c, 0x72, 0x1b]);

    // explicit backends are still honoured
    for backend in common::backends() {
        assert_eq!(Guacamole::with_backend(0, backend).backend(), backend);
    }
}
