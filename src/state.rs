use crate::engine::{BUFFER_LEN, Backend, LANES};

const WORD_LEN: usize = 4;

/// `2^-53`, the spacing of doubles in `[0.5, 1)`.
const F64_UNIT: f64 = 1.0 / (1u64 << 53) as f64;

#[repr(align(64))]
#[derive(Clone)]
struct Buffer([u8; BUFFER_LEN]);

/// Generator state: a 256-byte window onto the stream, the counter of the block
/// after that window, and how much of the window is consumed.
#[derive(Clone)]
pub(crate) struct State {
    buf: Buffer,
    counter: u64,
    cursor: usize,
    backend: Backend,
}

impl State {
    #[inline(always)]
    pub(crate) fn new(seed: u64, backend: Backend) -> Self {
        Self {
            buf: Buffer([0u8; BUFFER_LEN]),
            counter: seed,
            cursor: BUFFER_LEN,
            backend,
        }
    }

    /// Positions the stream at block `seed`. The next read refills.
    #[inline(always)]
    pub(crate) fn seed(&mut self, seed: u64) {
        self.counter = seed;
        self.cursor = BUFFER_LEN;
    }

    #[inline(always)]
    pub(crate) fn backend(&self) -> Backend {
        self.backend
    }

    #[inline(always)]
    pub(crate) fn set_backend(&mut self, backend: Backend) {
        self.backend = backend;
    }

    #[inline(always)]
    fn refill(&mut self) {
        self.backend.refill(self.counter, &mut self.buf.0);
        self.counter = self.counter.wrapping_add(LANES as u64);
        self.cursor = 0;
    }

    /// Little-endian word at word index `idx` of the buffer.
    #[inline(always)]
    fn word(&self, idx: usize) -> u32 {
        let at = idx * WORD_LEN;
        let b = &self.buf.0;

        u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
    }

    pub(crate) fn fill(&mut self, out: &mut [u8]) {
        // sanity check
        debug_assert!(self.cursor <= BUFFER_LEN);

        let rest = self.drain(out);
        let (windows, tail) = rest.as_chunks_mut::<BUFFER_LEN>();

        // whole windows go straight to the caller, skipping the buffer
        for window in windows {
            self.backend.refill(self.counter, window);
            self.counter = self.counter.wrapping_add(LANES as u64);
        }

        if !tail.is_empty() {
            self.refill();
            self.drain(tail);
        }
    }

    /// Copies what is left of the window into `out`; returns the part of `out` not
    /// covered. Anything returned non-empty means the window is exhausted.
    #[inline(always)]
    fn drain<'a>(&mut self, out: &'a mut [u8]) -> &'a mut [u8] {
        let n = (BUFFER_LEN - self.cursor).min(out.len());
        let (head, rest) = out.split_at_mut(n);

        head.copy_from_slice(&self.buf.0[self.cursor..self.cursor + n]);
        self.cursor += n;

        rest
    }

    #[inline(always)]
    pub(crate) fn next_u32(&mut self) -> u32 {
        // sanity check
        debug_assert!(self.cursor <= BUFFER_LEN);

        if self.cursor == BUFFER_LEN {
            self.refill();
        }

        // NOTE: BUFFER_LEN is a multiple of WORD_LEN, so an aligned cursor never straddles a refill
        if self.cursor % WORD_LEN == 0 {
            let val = self.word(self.cursor / WORD_LEN);
            self.cursor += WORD_LEN;

            return val;
        }

        let mut bytes = [0u8; WORD_LEN];
        self.fill(&mut bytes);

        u32::from_le_bytes(bytes)
    }

    /// Next eight stream bytes, read big-endian.
    #[inline(always)]
    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill(&mut bytes);

        u64::from_be_bytes(bytes)
    }

    /// 53 random mantissa bits from two words; `hi` supplies the leading bits.
    #[inline(always)]
    pub(crate) fn next_f64(&mut self) -> f64 {
        let hi = u64::from(self.next_u32());
        let lo = u64::from(self.next_u32());
        let bits = (hi << 21) | (lo >> 11);

        // exact: bits < 2^53, so the product is at most 1 - 2^-53
        bits as f64 * F64_UNIT
    }
}
