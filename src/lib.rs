//! # Guacamole
//!
//! Deterministic random data for benchmarks.
//!
//! - [`Guacamole`]: a seekable byte stream. Seeding with `i` and skipping 64 bytes
//!   lands exactly where seeding with `i + 1` starts, so any part of a workload can be
//!   regenerated from an integer offset.
//! - [`ZipfParams`]: skewed ranks in `[1, n]` drawn from that stream.
//! - [`Scrambler`]: a keyed, collision-free shuffle of the `u64` space, for turning
//!   hot ranks into keys scattered across the key space.
//! - [`armnod`]: random strings over a character set, built on the above.
//!
//! ```
//! use guacamole::{Guacamole, Scrambler, ZipfParams};
//!
//! let g = Guacamole::new_seeded(42);
//! let zipf = ZipfParams::from_theta(1_000_000, 0.99).unwrap();
//! let scrambler = Scrambler::new(7);
//!
//! let rank = g.zipf(&zipf);
//! let key = scrambler.scramble(rank);
//!
//! assert!((1..=1_000_000).contains(&rank));
//! assert_eq!(scrambler.unscramble(key), rank);
//! ```
//!
//! None of this is cryptographically secure: the stream is a public expansion of
//! the seed.

pub mod armnod;
mod engine;
mod error;
#[cfg(feature = "rand_core")]
mod rng_core;
mod scrambler;
mod state;
mod zipf;

pub use engine::portable::mash;
pub use engine::{Backend, PORTABLE_ENV, disable_accelerated, maybe_enable_accelerated};
pub use error::{Error, Result};
pub use scrambler::Scrambler;
pub use zipf::ZipfParams;

use core::cell::UnsafeCell;
use core::fmt;

use state::State;

/// A seekable pseudorandom byte stream.
///
/// Draws take `&self` and mutate the stream through an `UnsafeCell`, which keeps the
/// type `Send` but not `Sync`: a generator can move to another thread, but two threads
/// can never draw from the same one. Use one generator per thread.
pub struct Guacamole {
    // NOTE: no method hands out references into the state or calls back into user
    // code, so every `&mut` taken from this cell is unique for its whole lifetime.
    state: UnsafeCell<State>,
}

impl Guacamole {
    /// A generator seeded at 0, using [`Backend::detect`].
    #[inline(always)]
    pub fn new() -> Self {
        Self::new_seeded(0)
    }

    #[inline(always)]
    pub fn new_seeded(seed: u64) -> Self {
        Self::with_backend(seed, Backend::detect())
    }

    /// A generator with an explicitly chosen backend. The output does not depend on it.
    #[inline(always)]
    pub fn with_backend(seed: u64, backend: Backend) -> Self {
        Self {
            state: UnsafeCell::new(State::new(seed, backend)),
        }
    }

    /// Moves the stream to block `seed`. Cheap enough to call per record.
    #[inline(always)]
    pub fn seed(&self, seed: u64) {
        self.with_state(|st| st.seed(seed))
    }

    /// Fills `out` with the next `out.len()` bytes of the stream.
    #[inline(always)]
    pub fn fill(&self, out: &mut [u8]) {
        self.with_state(|st| st.fill(out))
    }

    /// The next `len` bytes of the stream.
    pub fn bytes(&self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.fill(&mut out);

        out
    }

    /// The next four bytes, little-endian.
    #[inline(always)]
    pub fn next_u32(&self) -> u32 {
        self.with_state(|st| st.next_u32())
    }

    /// The next eight bytes, big-endian.
    #[inline(always)]
    pub fn next_u64(&self) -> u64 {
        self.with_state(|st| st.next_u64())
    }

    /// A double in `[0, 1)` with 53 random bits, built from two [`Guacamole::next_u32`] draws.
    #[inline(always)]
    pub fn next_f64(&self) -> f64 {
        self.with_state(|st| st.next_f64())
    }

    /// A rank in `[1, params.n()]`; same as [`ZipfParams::sample`].
    #[inline(always)]
    pub fn zipf(&self, params: &ZipfParams) -> u64 {
        params.sample(self)
    }

    #[inline(always)]
    pub fn backend(&self) -> Backend {
        self.with_state(|st| st.backend())
    }

    /// Switches the refill engine; the stream continues unchanged.
    ///
    /// [`disable_accelerated`] only changes what [`Backend::detect`] returns, so
    /// generators built before it keep their engine. Call
    /// `g.set_backend(Backend::Portable)` to move such a generator onto the portable path.
    #[inline(always)]
    pub fn set_backend(&self, backend: Backend) {
        self.with_state(|st| st.set_backend(backend))
    }

    #[inline(always)]
    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        // SAFETY: `Guacamole` is !Sync and `f` is always one of the crate's own
        // state methods, which never re-enter the generator.
        f(unsafe { &mut *self.state.get() })
    }
}

impl Default for Guacamole {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Guacamole {
    /// Forks the stream: both generators continue with identical output.
    fn clone(&self) -> Self {
        Self {
            state: UnsafeCell::new(self.with_state(|st| st.clone())),
        }
    }
}

impl fmt::Debug for Guacamole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guacamole")
            .field("backend", &self.backend())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_words(g: &Guacamole, n: usize) -> Vec<u32> {
        (0..n).map(|_| g.next_u32()).collect()
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let a = Guacamole::new_seeded(123456789);
        let b = Guacamole::new_seeded(123456789);

        assert_eq!(first_words(&a, 256), first_words(&b, 256), "identical seeds must yield same sequence");
    }

    #[test]
    fn test_different_seeds_produce_different_sequences() {
        let a = Guacamole::new_seeded(1);
        let b = Guacamole::new_seeded(2);

        assert_ne!(first_words(&a, 8), first_words(&b, 8), "different seeds should yield distinct output");
    }

    #[test]
    fn test_new_is_seeded_at_zero() {
        let g = Guacamole::new();

        assert_eq!(g.bytes(8), [0x9a, 0x97, 0xf6, 0x5b, 0x9b, 0x4c, 0x72, 0x1b]);
    }

    #[test]
    fn test_reseeding_rewinds_the_stream() {
        let g = Guacamole::new_seeded(5);
        let first = g.bytes(300);

        g.seed(5);

        assert_eq!(g.bytes(300), first);
    }

    #[test]
    fn test_clone_forks_identical_streams() {
        let g = Guacamole::new_seeded(99);
        let _ = g.bytes(13);

        let fork = g.clone();

        assert_eq!(first_words(&g, 100), first_words(&fork, 100));
    }

    #[test]
    fn test_switching_backend_mid_stream_is_invisible() {
        let reference = Guacamole::with_backend(31, Backend::Portable);
        let switched = Guacamole::with_backend(31, Backend::Portable);

        let a = reference.bytes(1000);

        let mut b = switched.bytes(500);
        switched.set_backend(Backend::detect());
        b.extend(switched.bytes(500));

        assert_eq!(a, b);
    }

    #[test]
    fn test_can_move_across_threads_but_not_shared() {
        use std::thread;

        let g = Guacamole::new_seeded(1234);
        let expected = g.clone().bytes(32);

        let handle = thread::spawn(move || g.bytes(32));
        let res = handle.join().expect("thread should run successfully");

        assert_eq!(res, expected);
    }

    #[test]
    fn test_zipf_convenience_matches_sample() {
        let params = ZipfParams::from_theta(100, 0.8).unwrap();
        let a = Guacamole::new_seeded(3);
        let b = Guacamole::new_seeded(3);

        for _ in 0..100 {
            assert_eq!(a.zipf(&params), params.sample(&b));
        }
    }

    #[test]
    fn test_debug_shows_backend() {
        let g = Guacamole::with_backend(0, Backend::Portable);

        assert_eq!(format!("{g:?}"), "Guacamole { backend: Portable, .. }");
    }
}
