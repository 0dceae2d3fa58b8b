use guacamole::{Backend, Guacamole};
use std::hint::black_box;
use std::time::Instant;

const ITERS: usize = 10_000_000;
const FILL_LEN: usize = 1 << 20;
const FILL_ROUNDS: usize = 256;

fn words(backend: Backend) {
    let g = Guacamole::with_backend(0xDEADBEEF_u64, backend);

    // warmup
    for _ in 0..1_000 {
        black_box(g.next_u32());
    }

    let mut _acc: u32 = 0;
    let start = Instant::now();

    for _ in 0..ITERS {
        // NOTE: We consume result to avoid optimizations
        _acc = _acc.wrapping_add(black_box(g.next_u32()));
    }

    let elapsed = start.elapsed();
    let thpt = elapsed.as_nanos().wrapping_div(ITERS as u128);

    println!("backend={:?}, iters={}, ns_per_u32={}, time_ns={}", backend, ITERS, thpt, elapsed.as_nanos());
}

fn bytes(backend: Backend) {
    let g = Guacamole::with_backend(0xDEADBEEF_u64, backend);
    let mut buf = vec![0u8; FILL_LEN];

    let start = Instant::now();

    for _ in 0..FILL_ROUNDS {
        g.fill(black_box(&mut buf));
    }

    let elapsed = start.elapsed();
    let mib_per_s = FILL_ROUNDS as f64 / elapsed.as_secs_f64();

    println!("backend={:?}, fill_mib_per_s={:.1}", backend, mib_per_s);
}

fn main() {
    let mut backends = vec![Backend::Portable];
    backends.extend(Backend::accelerated());

    for backend in backends {
        words(backend);
        bytes(backend);
    }
}
