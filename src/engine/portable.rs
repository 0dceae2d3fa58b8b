//! # Portable Engine
//!
//! Scalar Salsa20/20 core with an all-zero key and nonce. The counter occupies the
//! block-counter words, so consecutive counters give independent 64-byte blocks.
//! This is the reference the SIMD engines are tested against.

use super::{BLOCK_LEN, BLOCK_WORDS, BUFFER_LEN, COLUMN_ROUND, COUNTER_HI, COUNTER_LO, DOUBLE_ROUNDS, Engine, ROW_ROUND, SIGMA};

pub(crate) struct Portable;

impl Portable {
    #[inline(always)]
    pub(crate) fn refill_blocks(counter: u64, out: &mut [u8; BUFFER_LEN]) {
        for (lane, block) in out.chunks_exact_mut(BLOCK_LEN).enumerate() {
            let words = mash(counter.wrapping_add(lane as u64));

            for (dst, word) in block.chunks_exact_mut(4).zip(words) {
                dst.copy_from_slice(&word.to_le_bytes());
            }
        }
    }
}

impl Engine for Portable {
    #[inline(always)]
    unsafe fn refill(counter: u64, out: &mut [u8; BUFFER_LEN]) {
        Portable::refill_blocks(counter, out);
    }
}

/// Input matrix for `counter`: constants on the diagonal, counter in the
/// block-counter words, zeros everywhere else.
#[inline(always)]
pub(crate) fn input_matrix(counter: u64) -> [u32; BLOCK_WORDS] {
    let mut x = [0u32; BLOCK_WORDS];

    x[0] = SIGMA[0];
    x[5] = SIGMA[1];
    x[10] = SIGMA[2];
    x[15] = SIGMA[3];

    x[COUNTER_LO] = counter as u32;
    x[COUNTER_HI] = (counter >> 32) as u32;

    x
}

#[inline(always)]
fn quarter_round(x: &mut [u32; BLOCK_WORDS], [a, b, c, d]: [usize; 4]) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

/// Expands a 64-bit counter into a 64-byte block (sixteen words).
///
/// Pure and keyless: the same counter yields the same block on every platform and
/// with every [`Backend`](crate::Backend). Safe to call with sequentially
/// incrementing counters.
///
/// ```
/// let block = guacamole::mash(0);
/// assert_eq!(block[0], 0x5bf6979a);
/// ```
#[inline]
pub fn mash(counter: u64) -> [u32; BLOCK_WORDS] {
    let input = input_matrix(counter);
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
    for (word, init) in x.iter_mut().zip(input) {
        *word = word.wrapping_add(init);
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mash_zero_matches_reference_block() {
        let expected: [u32; BLOCK_WORDS] = [
            0x5bf6979a, 0x1b724c9b, 0x21670a96, 0xd4a8fc45, 0xf9672ee3, 0x79a91e11, 0x26489cce, 0xe6ee6a80,
            0xdac0e93d, 0x1ef9d72b, 0x9b63b2bc, 0x25c689f9, 0x38bf291b, 0xdc9b9ad3, 0x4b5fc5e7, 0x392ac12a,
        ];

        assert_eq!(mash(0), expected);
    }

    #[test]
    fn test_mash_uses_both_counter_halves() {
        assert_eq!(mash(1)[..4], [0x178aeaab, 0x771a6d64, 0xaef2f482, 0xde2b9f5e]);
        assert_eq!(mash(1 << 32)[..4], [0x77c75fb6, 0xec50f9c4, 0x0fff7402, 0xe3a6b0fb]);
    }

    #[test]
    fn test_mash_is_deterministic() {
        for counter in [0u64, 42, u64::MAX] {
            assert_eq!(mash(counter), mash(counter));
        }
    }

    #[test]
    fn test_quarter_round_diffuses_single_bit() {
        let mut x = [0u32; BLOCK_WORDS];
        x[0] = 1;

        quarter_round(&mut x, [0, 4, 8, 12]);

        assert!(x[4] != 0 && x[8] != 0 && x[12] != 0, "one bit should reach every operand");
    }

    #[test]
    fn test_refill_blocks_serializes_little_endian() {
        let mut out = [0u8; BUFFER_LEN];
        Portable::refill_blocks(0, &mut out);

        assert_eq!(out[..8], [0x9a, 0x97, 0xf6, 0x5b, 0x9b, 0x4c, 0x72, 0x1b]);
    }
}
