//! # SSE2 Engine
//!
//! **Only for x86_64 architectures!**
//!
//! Mixes the four blocks of a refill at once. Register `x[i]` holds word `i` of
//! all four blocks (one block per 32-bit lane), so every quarter-round runs on four
//! counters in parallel. The result is transposed back to block order on store.

use super::{BLOCK_LEN, BLOCK_WORDS, BUFFER_LEN, COLUMN_ROUND, COUNTER_HI, COUNTER_LO, DOUBLE_ROUNDS, Engine, LANES, ROW_ROUND, SIGMA};
use core::arch::x86_64::*;

const _: () = assert!(LANES == 4, "one 128-bit register carries exactly four lanes");

pub(crate) struct Sse2;

/// Rotate every lane left by a constant amount.
macro_rules! rotl {
    ($x:expr, $b:literal) => {{
        let x = $x;
        _mm_or_si128(_mm_slli_epi32(x, $b), _mm_srli_epi32(x, 32 - $b))
    }};
}

impl Engine for Sse2 {
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
            x[i] = _mm_add_epi32(x[i], input[i]);
        }

        store_transposed(&x, out);
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn input_lanes(counter: u64) -> [__m128i; BLOCK_WORDS] {
    let c: [u64; LANES] = core::array::from_fn(|lane| counter.wrapping_add(lane as u64));

    let lo = _mm_set_epi32(c[3] as i32, c[2] as i32, c[1] as i32, c[0] as i32);
    let hi = _mm_set_epi32(
        (c[3] >> 32) as i32,
        (c[2] >> 32) as i32,
        (c[1] >> 32) as i32,
        (c[0] >> 32) as i32,
    );

    let mut x = [_mm_setzero_si128(); BLOCK_WORDS];

    x[0] = _mm_set1_epi32(SIGMA[0] as i32);
    x[5] = _mm_set1_epi32(SIGMA[1] as i32);
    x[10] = _mm_set1_epi32(SIGMA[2] as i32);
    x[15] = _mm_set1_epi32(SIGMA[3] as i32);

    x[COUNTER_LO] = lo;
    x[COUNTER_HI] = hi;

    x
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn quarter_round(x: &mut [__m128i; BLOCK_WORDS], [a, b, c, d]: [usize; 4]) {
    x[b] = _mm_xor_si128(x[b], rotl!(_mm_add_epi32(x[a], x[d]), 7));
    x[c] = _mm_xor_si128(x[c], rotl!(_mm_add_epi32(x[b], x[a]), 9));
    x[d] = _mm_xor_si128(x[d], rotl!(_mm_add_epi32(x[c], x[b]), 13));
    x[a] = _mm_xor_si128(x[a], rotl!(_mm_add_epi32(x[d], x[c]), 18));
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
/// Writes the word-major registers back in block-major byte order.
///
/// ## Visualization
///
/// ```md
/// x[g+0] => | a0 b0 c0 d0 |        | a0 a1 a2 a3 | => block a, words g..g+4
/// x[g+1] => | a1 b1 c1 d1 |  4x4   | b0 b1 b2 b3 | => block b
/// x[g+2] => | a2 b2 c2 d2 |  ===>  | c0 c1 c2 c3 | => block c
/// x[g+3] => | a3 b3 c3 d3 |        | d0 d1 d2 d3 | => block d
/// ```
unsafe fn store_transposed(x: &[__m128i; BLOCK_WORDS], out: &mut [u8; BUFFER_LEN]) {
    let dst = out.as_mut_ptr();

    for group in 0..BLOCK_WORDS / 4 {
        let g = group * 4;

        let t0 = _mm_unpacklo_epi32(x[g], x[g + 1]);
        let t1 = _mm_unpacklo_epi32(x[g + 2], x[g + 3]);
        let t2 = _mm_unpackhi_epi32(x[g], x[g + 1]);
        let t3 = _mm_unpackhi_epi32(x[g + 2], x[g + 3]);

        let rows = [
            _mm_unpacklo_epi64(t0, t1),
            _mm_unpackhi_epi64(t0, t1),
            _mm_unpacklo_epi64(t2, t3),
            _mm_unpackhi_epi64(t2, t3),
        ];

        for (lane, row) in rows.into_iter().enumerate() {
            // x86_64 is little-endian, so the lane layout already is the byte layout
            _mm_storeu_si128(dst.add(lane * BLOCK_LEN + g * 4) as *mut __m128i, row);
        }
    }
}
