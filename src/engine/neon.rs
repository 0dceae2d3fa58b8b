//! # NEON Engine
//!
//! **Only for aarch64 architectures!**
//!
//! Same lane layout as the SSE2 engine: register `x[i]` carries word `i` of the
//! four blocks of a refill, one block per 32-bit lane.

use super::{BLOCK_LEN, BLOCK_WORDS, BUFFER_LEN, COLUMN_ROUND, COUNTER_HI, COUNTER_LO, DOUBLE_ROUNDS, Engine, LANES, ROW_ROUND, SIGMA};
use core::arch::aarch64::*;

const _: () = assert!(LANES == 4, "one 128-bit register carries exactly four lanes");

pub(crate) struct Neon;

/// Rotate every lane left by a constant amount.
macro_rules! rotl {
    ($x:expr, $b:literal) => {{
        let x = $x;
        vorrq_u32(vshlq_n_u32::<$b>(x), vshrq_n_u32::<{ 32 - $b }>(x))
    }};
}

impl Engine for Neon {
    #[inline(always)]
    #[allow(unsafe_op_in_unsafe_fn)]
    unsafe fn refill(counter: u64, out: &mut [u8; BUFFER_LEN]) {
        let input = input_lanes(counter);
        let mut x = input;

        for _ in 0..DOUBLE_ROUNDS {
            for qr in COLUMN_ROUND {
                quarter_round(&mut x, qr);
            }

            for qr in ROW_ROUND {
                quarter_round(&mut x, qr);
            }
        }

        // feed-forward
        for i in 0..BLOCK_WORDS {
            x[i] = vaddq_u32(x[i], input[i]);
        }

        let mut words = [[0u32; LANES]; BLOCK_WORDS];

        for (dst, reg) in words.iter_mut().zip(x) {
            vst1q_u32(dst.as_mut_ptr(), reg);
        }

        for (lane, block) in out.chunks_exact_mut(BLOCK_LEN).enumerate() {
            for (dst, word) in block.chunks_exact_mut(4).zip(words.iter()) {
                dst.copy_from_slice(&word[lane].to_le_bytes());
            }
        }
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn input_lanes(counter: u64) -> [uint32x4_t; BLOCK_WORDS] {
    let c: [u64; LANES] = core::array::from_fn(|lane| counter.wrapping_add(lane as u64));

    let lo: [u32; LANES] = core::array::from_fn(|lane| c[lane] as u32);
    let hi: [u32; LANES] = core::array::from_fn(|lane| (c[lane] >> 32) as u32);

    let mut x = [vdupq_n_u32(0); BLOCK_WORDS];

    x[0] = vdupq_n_u32(SIGMA[0]);
    x[5] = vdupq_n_u32(SIGMA[1]);
    x[10] = vdupq_n_u32(SIGMA[2]);
    x[15] = vdupq_n_u32(SIGMA[3]);

    x[COUNTER_LO] = vld1q_u32(lo.as_ptr());
    x[COUNTER_HI] = vld1q_u32(hi.as_ptr());

    x
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn quarter_round(x: &mut [uint32x4_t; BLOCK_WORDS], [a, b, c, d]: [usize; 4]) {
    x[b] = veorq_u32(x[b], rotl!(vaddq_u32(x[a], x[d]), 7));
    x[c] = veorq_u32(x[c], rotl!(vaddq_u32(x[b], x[a]), 9));
    x[d] = veorq_u32(x[d], rotl!(vaddq_u32(x[c], x[b]), 13));
    x[a] = veorq_u32(x[a], rotl!(vaddq_u32(x[d], x[c]), 18));
}
