//! # Engines
//!
//! Refill kernels for the generator buffer. Every engine computes the same keyless
//! Salsa20/20 expansion of a 64-bit counter, and every engine must be bit-identical
//! to [`portable`]. The SIMD engines only exist for throughput: they mix the four
//! blocks of one refill in parallel lanes.

use std::sync::atomic::{AtomicU8, Ordering};

use log::debug;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;
pub(crate) mod portable;
#[cfg(target_arch = "x86_64")]
pub(crate) mod sse2;

/// Number of 32-bit words in one mixed block.
pub(crate) const BLOCK_WORDS: usize = 16;

/// Size in bytes of one mixed block.
pub(crate) const BLOCK_LEN: usize = BLOCK_WORDS * 4;

/// Blocks produced by one refill.
pub(crate) const LANES: usize = 4;

/// Size in bytes of the generator buffer.
pub(crate) const BUFFER_LEN: usize = BLOCK_LEN * LANES;

/// Salsa20 runs 20 rounds, i.e. 10 column/row double rounds.
pub(crate) const DOUBLE_ROUNDS: usize = 10;

/// The published `"expand 32-byte k"` words placed on the diagonal of the input matrix.
pub(crate) const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Input matrix positions of the counter halves (the Salsa20 block-counter words).
pub(crate) const COUNTER_LO: usize = 8;
pub(crate) const COUNTER_HI: usize = 9;

/// Quarter-round operands `(a, b, c, d)` of the column round.
pub(crate) const COLUMN_ROUND: [[usize; 4]; 4] = [[0, 4, 8, 12], [5, 9, 13, 1], [10, 14, 2, 6], [15, 3, 7, 11]];

/// Quarter-round operands `(a, b, c, d)` of the row round.
pub(crate) const ROW_ROUND: [[usize; 4]; 4] = [[0, 1, 2, 3], [5, 6, 7, 4], [10, 11, 8, 9], [15, 12, 13, 14]];

const _: () = assert!(BUFFER_LEN == 256);

pub(crate) trait Engine {
    /// Writes the blocks for `counter, counter + 1, .., counter + LANES - 1` into `out`,
    /// back to back, each block serialized as little-endian words.
    unsafe fn refill(counter: u64, out: &mut [u8; BUFFER_LEN]);
}

/// Selects which engine refills a generator.
///
/// Every variant produces identical bytes; the choice only affects throughput.
/// Both accelerated variants rely on instruction sets that are part of their
/// architecture's baseline, so constructing one directly is always sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Scalar implementation, available everywhere.
    Portable,

    /// Four lanes in 128-bit SSE2 registers.
    #[cfg(target_arch = "x86_64")]
    Sse2,

    /// Four lanes in 128-bit NEON registers.
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl Backend {
    /// Picks the fastest backend allowed by the process-wide policy.
    ///
    /// Resolves the policy on first use (see [`maybe_enable_accelerated`]) and falls
    /// back to [`Backend::Portable`] after [`disable_accelerated`].
    pub fn detect() -> Self {
        if maybe_enable_accelerated() {
            if let Some(backend) = Self::accelerated() {
                return backend;
            }
        }

        Backend::Portable
    }

    #[inline(always)]
    pub fn portable() -> Self {
        Backend::Portable
    }

    /// Probes the current CPU for an accelerated backend, ignoring the process-wide policy.
    pub fn accelerated() -> Option<Self> {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("sse2") {
                return Some(Backend::Sse2);
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Some(Backend::Neon);
            }
        }

        None
    }

    #[inline(always)]
    pub fn is_accelerated(self) -> bool {
        self != Backend::Portable
    }

    #[inline(always)]
    pub(crate) fn refill(self, counter: u64, out: &mut [u8; BUFFER_LEN]) {
        match self {
            // SAFETY: the portable engine has no target requirements
            Backend::Portable => unsafe { portable::Portable::refill(counter, out) },

            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => unsafe { sse2::Sse2::refill(counter, out) },

            #[cfg(target_arch = "aarch64")]
            Backend::Neon => unsafe { neon::Neon::refill(counter, out) },
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::detect()
    }
}

/// Setting this environment variable (to any value) makes the first policy
/// resolution choose the portable engine.
pub const PORTABLE_ENV: &str = "GUACAMOLE_PORTABLE";

const POLICY_UNDETERMINED: u8 = 0;
const POLICY_ACCELERATED: u8 = 1;
const POLICY_PORTABLE: u8 = 2;

static POLICY: AtomicU8 = AtomicU8::new(POLICY_UNDETERMINED);

/// Forces [`Backend::detect`] to return the portable backend from now on, for the
/// whole process. Generators that already own an accelerated backend keep it.
pub fn disable_accelerated() {
    let previous = POLICY.swap(POLICY_PORTABLE, Ordering::AcqRel);

    if previous != POLICY_PORTABLE {
        debug!("accelerated engines disabled for this process");
    }
}

/// Probes the hardware and allows accelerated backends when supported, unless
/// [`disable_accelerated`] was called before. Idempotent.
///
/// Returns whether accelerated backends are allowed.
pub fn maybe_enable_accelerated() -> bool {
    match POLICY.load(Ordering::Acquire) {
        POLICY_ACCELERATED => true,
        POLICY_PORTABLE => false,
        _ => {
            let resolved = if std::env::var_os(PORTABLE_ENV).is_some() {
                debug!("{PORTABLE_ENV} is set, staying on the portable engine");
                POLICY_PORTABLE
            } else if let Some(backend) = Backend::accelerated() {
                debug!("accelerated engine available: {backend:?}");
                POLICY_ACCELERATED
            } else {
                debug!("no accelerated engine for this cpu");
                POLICY_PORTABLE
            };

            match POLICY.compare_exchange(POLICY_UNDETERMINED, resolved, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => resolved == POLICY_ACCELERATED,
                Err(current) => current == POLICY_ACCELERATED,
            }
        }
    }
}
