//! # Scrambler
//!
//! A keyed permutation of the 64-bit integers: the Blowfish block cipher with the
//! 64-bit bijection number as its key. Feeding Zipf ranks (or any clustered ids)
//! through [`Scrambler::scramble`] spreads them over the whole `u64` space while
//! keeping them collision free.
//!
//! Table sizes, round count and the pi-derived initial tables are fixed; changing
//! any of them changes every scrambled value.

mod tables;

use core::fmt;

use log::trace;

use tables::{P_INIT, S_INIT};

/// Feistel rounds per block.
pub(crate) const ROUNDS: usize = 16;

/// One subkey per round plus two whitening words.
pub(crate) const SUBKEYS: usize = ROUNDS + 2;

pub(crate) const SBOXES: usize = 4;
pub(crate) const SBOX_LEN: usize = 256;

/// Maps every `u64` to a distinct `u64`, determined entirely by a 64-bit bijection number.
///
/// All state lives inline (4 KiB of S-boxes plus 18 subkeys); building or rekeying
/// never allocates. Scrambling only reads the tables, so a shared `&Scrambler` can
/// be used from many threads at once.
#[derive(Clone)]
pub struct Scrambler {
    s: [[u32; SBOX_LEN]; SBOXES],
    p: [u32; SUBKEYS],
    bijection: u64,
}

impl Scrambler {
    pub fn new(bijection: u64) -> Self {
        let mut scrambler = Self {
            s: S_INIT,
            p: P_INIT,
            bijection,
        };

        scrambler.expand_key();
        scrambler
    }

    /// Switches to another bijection. Nothing of the previous key survives: the
    /// tables restart from their initial values before the new key is mixed in.
    pub fn rekey(&mut self, bijection: u64) {
        self.s = S_INIT;
        self.p = P_INIT;
        self.bijection = bijection;

        self.expand_key();
    }

    /// The bijection number this scrambler was keyed with.
    #[inline(always)]
    pub fn bijection(&self) -> u64 {
        self.bijection
    }

    #[inline]
    pub fn scramble(&self, value: u64) -> u64 {
        let (l, r) = self.encrypt((value >> 32) as u32, value as u32);

        (u64::from(l) << 32) | u64::from(r)
    }

    /// Inverse of [`Scrambler::scramble`] under the same bijection.
    #[inline]
    pub fn unscramble(&self, value: u64) -> u64 {
        let (l, r) = self.decrypt((value >> 32) as u32, value as u32);

        (u64::from(l) << 32) | u64::from(r)
    }

    fn expand_key(&mut self) {
        // The key's big-endian bytes cycle over the subkeys four at a time; with
        // eight key bytes that is the high word on even subkeys, the low word on odd ones.
        let halves = [(self.bijection >> 32) as u32, self.bijection as u32];

        for (i, p) in self.p.iter_mut().enumerate() {
            *p ^= halves[i % 2];
        }

        let (mut l, mut r) = (0u32, 0u32);

        for i in (0..SUBKEYS).step_by(2) {
            (l, r) = self.encrypt(l, r);
            self.p[i] = l;
            self.p[i + 1] = r;
        }

        for b in 0..SBOXES {
            for i in (0..SBOX_LEN).step_by(2) {
                (l, r) = self.encrypt(l, r);
                self.s[b][i] = l;
                self.s[b][i + 1] = r;
            }
        }

        trace!("scrambler keyed with bijection {:#018x}", self.bijection);
    }

    #[inline(always)]
    fn round(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();

        (self.s[0][a as usize].wrapping_add(self.s[1][b as usize]) ^ self.s[2][c as usize])
            .wrapping_add(self.s[3][d as usize])
    }

    #[inline(always)]
    fn encrypt(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        for i in 0..ROUNDS {
            l ^= self.p[i];
            r ^= self.round(l);

            core::mem::swap(&mut l, &mut r);
        }

        // undo the last swap, then whiten
        core::mem::swap(&mut l, &mut r);

        r ^= self.p[ROUNDS];
        l ^= self.p[ROUNDS + 1];

        (l, r)
    }

    #[inline(always)]
    fn decrypt(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        for i in (2..SUBKEYS).rev() {
            l ^= self.p[i];
            r ^= self.round(l);

            core::mem::swap(&mut l, &mut r);
        }

        core::mem::swap(&mut l, &mut r);

        r ^= self.p[1];
        l ^= self.p[0];

        (l, r)
    }
}

impl Default for Scrambler {
    fn default() -> Self {
        Scrambler::new(0)
    }
}

impl fmt::Debug for Scrambler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scrambler")
            .field("bijection", &self.bijection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod initial_tables {
        use super::*;

        #[test]
        fn test_initial_tables_are_pi_digits() {
            assert_eq!(P_INIT[0], 0x243f6a88);
            assert_eq!(P_INIT[SUBKEYS - 1], 0x8979fb1b);
            assert_eq!(S_INIT[0][0], 0xd1310ba6);
            assert_eq!(S_INIT[SBOXES - 1][SBOX_LEN - 1], 0x3ac372e6);
        }
    }

    mod vectors {
        use super::*;

        #[test]
        fn test_default_bijection_reference_outputs() {
            let s = Scrambler::default();

            assert_eq!(s.scramble(0), 0x4ef997456198dd78);
            assert_eq!(s.scramble(1), 0x64ed065757511fa7);
            assert_eq!(s.scramble(2), 0xad63166cadf9811e);
            assert_eq!(s.scramble(3), 0x731ca6b4131b7ef1);
            assert_eq!(s.scramble(4), 0xac25f3282f17f3b2);
        }

        #[test]
        fn test_bijection_reads_as_big_endian_key() {
            assert_eq!(
                Scrambler::new(0x0123456789abcdef).scramble(0x1111111111111111),
                0x61f9c3802281b096
            );
            assert_eq!(
                Scrambler::new(0xfedcba9876543210).scramble(0x0123456789abcdef),
                0x0aceab0fc6a0a28d
            );
            assert_eq!(
                Scrambler::new(u64::MAX).scramble(u64::MAX),
                0x51866fd5b85ecb8a
            );
        }
    }

    mod keying {
        use super::*;

        #[test]
        fn test_rekey_leaves_no_trace_of_previous_key() {
            let mut s = Scrambler::new(0xdead_beef);
            s.rekey(7);

            let fresh = Scrambler::new(7);

            assert_eq!(s.p, fresh.p);
            assert_eq!(s.s, fresh.s);
            assert_eq!(s.bijection(), 7);
        }

        #[test]
        fn test_different_bijections_disagree() {
            let a = Scrambler::new(1);
            let b = Scrambler::new(2);

            assert!((0..64).any(|v| a.scramble(v) != b.scramble(v)));
        }

        #[test]
        fn test_unscramble_inverts_scramble() {
            let s = Scrambler::new(0x9e37_79b9_7f4a_7c15);

            for v in [0, 1, 42, u64::MAX, 1 << 63] {
                assert_eq!(s.unscramble(s.scramble(v)), v);
            }
        }

        #[test]
        fn test_debug_hides_tables() {
            let repr = format!("{:?}", Scrambler::new(3));

            assert_eq!(repr, "Scrambler { bijection: 3, .. }");
        }
    }
}
