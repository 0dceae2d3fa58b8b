//! # Armnod
//!
//! Deterministic random strings for benchmarks.
//!
//! Two streams cooperate. A `random` [`Guacamole`] drives a [`StringChooser`], which
//! picks the *seed* of the next string. A second `strings` generator is moved to that
//! seed and produces the string itself: first its length from a [`LengthChooser`], then
//! one byte per character. Because the string depends only on its seed, a chooser that
//! draws seeds from a fixed set yields a fixed set of strings, and drawing those seeds
//! with [`ZipfParams`] gives a skewed workload over them.
//!
//! ```
//! use guacamole::armnod::{Charset, Configuration, LengthChooser, StringChooser};
//!
//! let config = Configuration {
//!     charset: Charset::new(Charset::HEX_LOWER).unwrap(),
//!     strings: StringChooser::fixed_set(100),
//!     lengths: LengthChooser::Uniform { min: 8, max: 16 },
//! };
//!
//! let keys: Vec<String> = config.generator().unwrap().take(3).collect();
//!
//! assert!(keys.iter().all(|k| (8..16).contains(&k.len())));
//! ```

use log::debug;

use crate::error::{Error, Result};
use crate::{Guacamole, ZipfParams};

/// Entries in the stretched character table; one random byte picks one entry.
const STRETCH_LEN: usize = 256;

/// Largest charset that still lets every character own at least two table entries.
pub const MAX_CHARSET_LEN: usize = STRETCH_LEN / 2;

/// Length used by [`Configuration::default`].
pub const DEFAULT_LENGTH: usize = 10;

/// Characters a generated string may contain.
///
/// Lengths are counted in characters, so multi-byte characters are fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    chars: Vec<char>,
}

impl Charset {
    pub const LOWER_LETTERS: &'static str = "abcdefghijklmnopqrstuvwxyz";
    pub const UPPER_LETTERS: &'static str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    pub const LETTERS: &'static str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    pub const DIGITS: &'static str = "0123456789";
    pub const ALPHANUMERIC: &'static str =
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    pub const PUNCTUATION: &'static str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
    pub const HEX_LOWER: &'static str = "0123456789abcdef";
    pub const HEX_UPPER: &'static str = "0123456789ABCDEF";
    pub const MODHEX: &'static str = "cbdefghijklnrtuv";
    pub const BASE64: &'static str =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    pub const BASE64_URL: &'static str =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    /// Alphanumerics followed by punctuation.
    pub const DEFAULT: &'static str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

    /// Fails unless `chars` holds between 1 and [`MAX_CHARSET_LEN`] characters.
    pub fn new(chars: &str) -> Result<Self> {
        let chars: Vec<char> = chars.chars().collect();

        if chars.is_empty() || chars.len() > MAX_CHARSET_LEN {
            return Err(Error::InvalidCharset {
                len: chars.len(),
                max: MAX_CHARSET_LEN,
            });
        }

        Ok(Self { chars })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Spreads the characters evenly over the byte range: entry `i` holds character
    /// `floor(i / 256 * len)`.
    fn stretch(&self) -> [char; STRETCH_LEN] {
        core::array::from_fn(|i| self.chars[i * self.chars.len() / STRETCH_LEN])
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            chars: Self::DEFAULT.chars().collect(),
        }
    }
}

/// Picks the seed of the next string, or ends generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StringChooser {
    /// Unbounded: every string gets a fresh 64-bit seed.
    #[default]
    Random,
    /// Uniformly repeated draws from `n` strings. `n == 0` generates nothing.
    FixedSet { n: u64 },
    /// Zipf-distributed repeated draws from `params.n()` strings.
    FixedSetZipf(ZipfParams),
    /// Strings `next..limit` of a set of `n`, each exactly once, then finish.
    FixedSlice { n: u64, next: u64, limit: u64 },
}

impl StringChooser {
    pub fn fixed_set(n: u64) -> Self {
        Self::FixedSet { n }
    }

    pub fn fixed_set_zipf(params: ZipfParams) -> Self {
        Self::FixedSetZipf(params)
    }

    /// Every string of a set of `n`, once each.
    pub fn initialize_fixed_set(n: u64) -> Self {
        Self::fixed_slice(n, 0, n)
    }

    /// Strings `start..limit` of a set of `n`, once each. Lets several loaders split
    /// one set between them.
    pub fn fixed_slice(n: u64, start: u64, limit: u64) -> Self {
        Self::FixedSlice { n, next: start, limit }
    }

    /// The next seed. The unbounded variants always consume eight bytes of `g`; the
    /// slice consumes none.
    fn next_seed(&mut self, g: &Guacamole) -> Option<u64> {
        match self {
            Self::Random => Some(g.next_u64()),

            Self::FixedSet { n } => {
                if *n == 0 {
                    return None;
                }

                let idx = (*n as f64 * g.next_f64()) as u64;
                Some(distribute(idx.min(*n - 1), *n))
            }

            Self::FixedSetZipf(params) => Some(distribute(g.zipf(params) - 1, params.n())),

            Self::FixedSlice { n, next, limit } => {
                if *next >= *limit || *n == 0 {
                    return None;
                }

                let seed = distribute(*next, *n);
                *next += 1;

                Some(seed)
            }
        }
    }
}

/// Spaces the `n` members of a set evenly over the seed space, so neighbouring
/// members never share stream blocks.
#[inline(always)]
fn distribute(x: u64, n: u64) -> u64 {
    x.wrapping_mul(u64::MAX / n)
}

/// Picks the length, in characters, of the next string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthChooser {
    Constant(usize),
    /// `min + floor((max - min) * u)` for a uniform `u` in `[0, 1)`, so `max` itself
    /// is only produced when `min == max`.
    Uniform { min: usize, max: usize },
}

impl LengthChooser {
    pub fn uniform(min: usize, max: usize) -> Result<Self> {
        let lengths = Self::Uniform { min, max };
        lengths.validate()?;

        Ok(lengths)
    }

    /// Upper bound on any length this chooser returns.
    pub fn max_length(&self) -> usize {
        match *self {
            Self::Constant(len) => len,
            Self::Uniform { max, .. } => max,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::Uniform { min, max } if min > max => Err(Error::InvalidLengthRange { min, max }),
            _ => Ok(()),
        }
    }

    #[inline]
    fn next_length(&self, g: &Guacamole) -> usize {
        match *self {
            Self::Constant(len) => len,
            Self::Uniform { min, max } => min + ((max - min) as f64 * g.next_f64()) as usize,
        }
    }
}

impl Default for LengthChooser {
    fn default() -> Self {
        Self::Constant(DEFAULT_LENGTH)
    }
}

/// Everything that determines the strings a generator produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    pub charset: Charset,
    pub strings: StringChooser,
    pub lengths: LengthChooser,
}

impl Configuration {
    pub fn generator(self) -> Result<Armnod> {
        Armnod::new(self)
    }
}

/// A random string generator. Iterate it, or call [`Armnod::next_string`].
#[derive(Debug, Clone)]
pub struct Armnod {
    table: [char; STRETCH_LEN],
    chooser: StringChooser,
    lengths: LengthChooser,
    random: Guacamole,
    strings: Guacamole,
    bytes: Vec<u8>,
}

impl Armnod {
    pub fn new(config: Configuration) -> Result<Self> {
        let Configuration {
            charset,
            strings: chooser,
            lengths,
        } = config;

        lengths.validate()?;

        debug!(
            "armnod: {} chars, max length {}, chooser {:?}",
            charset.len(),
            lengths.max_length(),
            chooser
        );

        Ok(Self::from_parts(&charset, chooser, lengths))
    }

    fn from_parts(charset: &Charset, chooser: StringChooser, lengths: LengthChooser) -> Self {
        Self {
            table: charset.stretch(),
            chooser,
            lengths,
            random: Guacamole::new(),
            strings: Guacamole::new(),
            bytes: vec![0u8; lengths.max_length()],
        }
    }

    /// Reseeds the stream that drives the string chooser. Neighbouring seeds are a
    /// fixed number of strings apart (for the unbounded choosers, eight per seed).
    pub fn seed(&mut self, seed: u64) {
        self.random.seed(seed);
    }

    /// The next string, or `None` once the chooser is exhausted.
    pub fn next_string(&mut self) -> Option<String> {
        let seed = self.chooser.next_seed(&self.random)?;

        self.strings.seed(seed);
        let len = self.lengths.next_length(&self.strings);

        // always draw the full buffer so every string consumes the same stream span
        self.strings.fill(&mut self.bytes);

        Some(self.bytes[..len].iter().map(|&b| self.table[b as usize]).collect())
    }
}

impl Default for Armnod {
    fn default() -> Self {
        Self::from_parts(&Charset::default(), StringChooser::default(), LengthChooser::default())
    }
}

impl Iterator for Armnod {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_string()
    }
}
