//! `rand_core` 0.6 integration, so a [`Guacamole`] can drive `rand` distributions.
//!
//! This is deliberately *not* a `CryptoRng`.

use rand_core::{Error, RngCore, SeedableRng, impls};

use crate::Guacamole;

impl RngCore for Guacamole {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        Guacamole::next_u32(self)
    }

    /// Two little-endian words, low word first. Differs from the inherent
    /// [`Guacamole::next_u64`], which reads eight bytes big-endian.
    #[inline]
    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest);
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill(dest);
        Ok(())
    }
}

impl SeedableRng for Guacamole {
    /// The starting block, little-endian.
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Guacamole::new_seeded(u64::from_le_bytes(seed))
    }

    /// Uses `state` as the block number directly, keeping seeds seekable.
    fn seed_from_u64(state: u64) -> Self {
        Guacamole::new_seeded(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_is_little_endian_block_number() {
        let a = Guacamole::from_seed(7u64.to_le_bytes());
        let b = Guacamole::new_seeded(7);

        assert_eq!(a.bytes(64), b.bytes(64));
    }

    #[test]
    fn test_seed_from_u64_keeps_stream_position() {
        let mut a = <Guacamole as SeedableRng>::seed_from_u64(100);
        let b = Guacamole::new_seeded(100);

        let mut buf = [0u8; 40];
        a.fill_bytes(&mut buf);

        assert_eq!(buf.to_vec(), b.bytes(40));
    }

    #[test]
    fn test_next_u64_combines_words_low_first() {
        let mut rng = Guacamole::new_seeded(0);
        let g = Guacamole::new_seeded(0);

        let lo = u64::from(g.next_u32());
        let hi = u64::from(g.next_u32());

        assert_eq!(RngCore::next_u64(&mut rng), (hi << 32) | lo);
    }

    #[test]
    fn test_try_fill_bytes_never_fails() {
        let mut rng = Guacamole::new_seeded(3);
        let mut buf = [0u8; 1000];

        assert!(rng.try_fill_bytes(&mut buf).is_ok());
        assert!(buf.iter().any(|&b| b != 0));
    }
}
