mod common;

use proptest::prelude::*;
use rstest::*;
use statrs::statistics::{Data, Distribution};

use guacamole::{Backend, Guacamole, mash};

const BLOCK_LEN: usize = 64;

#[rstest]
#[case::origin(0)]
#[case::small(1)]
#[case::word_boundary(0xffff_ffff)]
#[case::top(u64::MAX - 3)]
fn every_backend_produces_the_same_stream(#[case] seed: u64) {
    common::init_logging();

    let reference = Guacamole::with_backend(seed, Backend::Portable).bytes(4096);

    for backend in common::backends() {
        let g = Guacamole::with_backend(seed, backend);

        assert_eq!(g.bytes(4096), reference, "{backend:?} diverged at seed {seed:#x}");
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(1 << 32)]
#[case(u64::MAX)]
fn stream_starts_with_the_mixed_block(#[case] seed: u64) {
    let g = Guacamole::new_seeded(seed);
    let words: Vec<u32> = (0..16).map(|_| g.next_u32()).collect();

    assert_eq!(words, mash(seed));
}

#[test]
fn stream_wraps_around_the_counter_space() {
    let g = Guacamole::new_seeded(u64::MAX);
    let mut skip = [0u8; BLOCK_LEN];
    g.fill(&mut skip);

    let first_of_zero: Vec<u32> = (0..16).map(|_| g.next_u32()).collect();

    assert_eq!(first_of_zero, mash(0));
}

#[test]
fn known_bytes_at_seed_zero() {
    let g = Guacamole::new_seeded(0);

    assert_eq!(g.bytes(8), [0x9a, 0x97, 0xf6, 0x5b, 0x9b, 0x4c, 0x72, 0x1b]);
    assert_eq!(Guacamole::new_seeded(0).next_u64(), 0x9a97_f65b_9b4c_721b);
    assert_eq!(Guacamole::new_seeded(0).next_f64(), 0.35923144829161757);
}

#[test]
fn words_cover_every_bit() {
    let g = Guacamole::new_seeded(4242);

    let (mut any, mut all) = (0u32, u32::MAX);
    for _ in 0..10_000 {
        let w = g.next_u32();
        any |= w;
        all &= w;
    }

    assert_eq!(any, u32::MAX);
    assert_eq!(all, 0);
}

#[test]
fn doubles_look_uniform() {
    let g = Guacamole::new_seeded(8);
    let samples: Vec<f64> = (0..common::SAMPLES).map(|_| g.next_f64()).collect();

    assert!(samples.iter().all(|v| (0.0..1.0).contains(v)));

    let mut hist = [0usize; 256];
    for &v in &samples {
        hist[(v * 256.0) as usize] += 1;
    }

    let total = samples.len() as f64;
    let entropy: f64 = hist
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();

    let data = Data::new(samples);

    assert!((data.mean().unwrap() - 0.5).abs() < 0.005);
    assert!((data.variance().unwrap() - 1.0 / 12.0).abs() < 0.002);
    assert!(entropy > 7.99, "entropy {entropy} bits");
}

proptest! {
    #[test]
    fn split_reads_equal_one_read(seed: u64, a in 0usize..700, b in 0usize..700) {
        let whole = Guacamole::new_seeded(seed).bytes(a + b);

        let g = Guacamole::new_seeded(seed);
        let mut parts = g.bytes(a);
        parts.extend(g.bytes(b));

        prop_assert_eq!(parts, whole);
    }

    #[test]
    fn skipping_blocks_equals_advancing_the_seed(seed: u64, blocks in 0u64..12) {
        let a = Guacamole::new_seeded(seed);
        let _ = a.bytes(blocks as usize * BLOCK_LEN);

        let b = Guacamole::new_seeded(seed.wrapping_add(blocks));

        prop_assert_eq!(a.bytes(300), b.bytes(300));
    }

    #[test]
    fn word_reads_follow_byte_reads(seed: u64, offset in 0usize..300) {
        let g = Guacamole::new_seeded(seed);
        let _ = g.bytes(offset);
        let word = g.next_u32();

        let bytes = Guacamole::new_seeded(seed).bytes(offset + 4);

        let word_bytes = word.to_le_bytes();
        prop_assert_eq!(word_bytes.as_slice(), &bytes[offset..]);
    }
}
