//! # Zipf
//!
//! Draws ranks in `[1, n]` whose frequency falls off as `rank^-theta`, using the
//! closed-form inverse transform of Gray et al. ("Quickly generating billion-record
//! synthetic databases"). All the expensive work (the generalized harmonic number
//! `zeta(n, theta)`) happens once in the constructor; a draw costs one `next_f64`
//! and at most one `powf`.

use log::debug;

use crate::Guacamole;
use crate::error::{Error, Result};

/// Populations up to this size get an exact `zeta(n, theta)`. Larger ones sum the
/// first `EXACT_ZETA_LIMIT - 1` terms exactly and approximate the rest.
const EXACT_ZETA_LIMIT: u64 = 1 << 22;

/// Precomputed parameters of a Zipf distribution over `n` ranks.
///
/// Immutable once built, `Copy`, and usable with any number of generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZipfParams {
    n: u64,
    alpha: f64,
    theta: f64,
    zetan: f64,
    zeta2: f64,
    eta: f64,
}

impl ZipfParams {
    /// Builds parameters from the `alpha` parameterization, `theta = 1 - 1/alpha`.
    ///
    /// `alpha` must be finite and at least 1 (`alpha == 1` is the uniform case).
    pub fn from_alpha(n: u64, alpha: f64) -> Result<Self> {
        validate_population(n)?;

        if !(alpha.is_finite() && alpha >= 1.0) {
            return Err(Error::InvalidAlpha(alpha));
        }

        let theta = 1.0 - 1.0 / alpha;

        // very large alphas round theta up to the singularity
        if theta >= 1.0 {
            return Err(Error::InvalidAlpha(alpha));
        }

        Ok(Self::build(n, theta, alpha))
    }

    /// Builds parameters from the `theta` parameterization, `alpha = 1 / (1 - theta)`.
    ///
    /// `theta` must lie in `[0, 1)`; `theta == 0` is the uniform case and `theta == 1`
    /// is rejected because the closed form is singular there.
    pub fn from_theta(n: u64, theta: f64) -> Result<Self> {
        validate_population(n)?;

        if !(0.0..1.0).contains(&theta) {
            return Err(Error::InvalidTheta(theta));
        }

        Ok(Self::build(n, theta, 1.0 / (1.0 - theta)))
    }

    fn build(n: u64, theta: f64, alpha: f64) -> Self {
        let zetan = zeta(n, theta);
        let zeta2 = zeta(2, theta);

        // n <= 2 is served entirely by the fast paths of `sample`, and the closed form is 0/0
        let eta = if n > 2 {
            (1.0 - (2.0 / n as f64).powf(1.0 - theta)) / (1.0 - zeta2 / zetan)
        } else {
            0.0
        };

        debug!(
            "zipf params: n={n} theta={theta} zetan={zetan} eta={eta} tail_approximated={}",
            n > EXACT_ZETA_LIMIT
        );

        Self {
            n,
            alpha,
            theta,
            zetan,
            zeta2,
            eta,
        }
    }

    /// Number of ranks.
    #[inline(always)]
    pub fn n(&self) -> u64 {
        self.n
    }

    #[inline(always)]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline(always)]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// `zeta(n, theta)`
    #[inline(always)]
    pub fn zetan(&self) -> f64 {
        self.zetan
    }

    /// `zeta(2, theta)`
    #[inline(always)]
    pub fn zeta2(&self) -> f64 {
        self.zeta2
    }

    #[inline(always)]
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Draws one rank in `[1, n]`, consuming eight bytes of `g`.
    #[inline]
    pub fn sample(&self, g: &Guacamole) -> u64 {
        self.rank_for(g.next_f64())
    }

    /// Maps a uniform `u` in `[0, 1)` to a rank.
    #[inline(always)]
    fn rank_for(&self, u: f64) -> u64 {
        let uz = u * self.zetan;

        if uz < 1.0 {
            return 1;
        }

        // 1 + 0.5^theta == zeta2, i.e. u < zeta2 / zetan
        if uz < self.zeta2 {
            return 2;
        }

        let spread = (self.eta * u - self.eta + 1.0).powf(self.alpha);
        let rank = 1u64.saturating_add((self.n as f64 * spread) as u64);

        // rounding at either end of the curve
        rank.clamp(1, self.n)
    }
}

#[inline(always)]
fn validate_population(n: u64) -> Result<()> {
    if n == 0 {
        return Err(Error::EmptyPopulation);
    }

    Ok(())
}

/// Generalized harmonic number `sum(i^-theta for i in 1..=n)`.
fn zeta(n: u64, theta: f64) -> f64 {
    if n <= EXACT_ZETA_LIMIT {
        return exact_zeta(1, n, theta);
    }

    exact_zeta(1, EXACT_ZETA_LIMIT - 1, theta) + zeta_tail(EXACT_ZETA_LIMIT, n, theta)
}

/// Exact `sum(i^-theta for i in from..=to)`, smallest terms first.
fn exact_zeta(from: u64, to: u64, theta: f64) -> f64 {
    (from..=to).rev().map(|i| (i as f64).powf(-theta)).sum()
}

/// Euler-Maclaurin estimate of `sum(i^-theta for i in m..=n)` for `theta < 1`.
///
/// Integral plus endpoint average plus the `B2` and `B4` derivative corrections.
/// With `m` in the millions the truncation error is far below f64 resolution.
fn zeta_tail(m: u64, n: u64, theta: f64) -> f64 {
    let (m, n) = (m as f64, n as f64);

    let f = |x: f64| x.powf(-theta);
    let d1 = |x: f64| -theta * x.powf(-theta - 1.0);
    let d3 = |x: f64| -theta * (theta + 1.0) * (theta + 2.0) * x.powf(-theta - 3.0);

    let integral = (n.powf(1.0 - theta) - m.powf(1.0 - theta)) / (1.0 - theta);
    let endpoints = (f(m) + f(n)) / 2.0;

    integral + endpoints + (d1(n) - d1(m)) / 12.0 - (d3(n) - d3(m)) / 720.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Backend;

    mod construction {
        use super::*;

        #[test]
        fn test_empty_population_is_rejected() {
            assert_eq!(ZipfParams::from_theta(0, 0.5), Err(Error::EmptyPopulation));
            assert_eq!(ZipfParams::from_alpha(0, 2.0), Err(Error::EmptyPopulation));
        }

        #[test]
        fn test_theta_singularity_is_rejected() {
            assert_eq!(ZipfParams::from_theta(10, 1.0), Err(Error::InvalidTheta(1.0)));
            assert_eq!(ZipfParams::from_theta(10, 1.5), Err(Error::InvalidTheta(1.5)));
            assert_eq!(ZipfParams::from_theta(10, -0.1), Err(Error::InvalidTheta(-0.1)));
            assert!(matches!(ZipfParams::from_theta(10, f64::NAN), Err(Error::InvalidTheta(_))));
        }

        #[test]
        fn test_alpha_outside_domain_is_rejected() {
            assert_eq!(ZipfParams::from_alpha(10, 0.5), Err(Error::InvalidAlpha(0.5)));
            assert_eq!(
                ZipfParams::from_alpha(10, f64::INFINITY),
                Err(Error::InvalidAlpha(f64::INFINITY))
            );
            assert_eq!(ZipfParams::from_alpha(10, 1e300), Err(Error::InvalidAlpha(1e300)));
        }

        #[test]
        fn test_alpha_and_theta_describe_the_same_distribution() {
            let by_alpha = ZipfParams::from_alpha(1000, 2.0).unwrap();
            let by_theta = ZipfParams::from_theta(1000, 0.5).unwrap();

            assert_eq!(by_alpha, by_theta);
        }

        #[test]
        fn test_uniform_case_has_trivial_constants() {
            let p = ZipfParams::from_theta(100, 0.0).unwrap();

            assert_eq!(p.zetan(), 100.0);
            assert_eq!(p.zeta2(), 2.0);
            assert_eq!(p.eta(), 1.0);
            assert_eq!(p.alpha(), 1.0);
        }

        #[test]
        fn test_tiny_populations_have_finite_eta() {
            for n in [1, 2] {
                let p = ZipfParams::from_theta(n, 0.9).unwrap();
                assert_eq!(p.eta(), 0.0);
            }
        }
    }

    mod harmonic {
        use super::*;

        #[test]
        fn test_exact_zeta_small_values() {
            let expected = 1.0 + 0.5f64.sqrt() + (1.0f64 / 3.0).sqrt() + 0.5;

            assert!((exact_zeta(1, 4, 0.5) - expected).abs() < 1e-15);
            assert_eq!(zeta(2, 0.3), 1.0 + 2f64.powf(-0.3));
        }

        #[test]
        fn test_tail_approximation_tracks_exact_sum() {
            for theta in [0.0, 0.1, 0.5, 0.99] {
                let exact = exact_zeta(1000, 200_000, theta);
                let approx = zeta_tail(1000, 200_000, theta);

                assert!(
                    ((approx - exact) / exact).abs() < 1e-12,
                    "theta {theta}: {approx} vs {exact}"
                );
            }
        }

        #[test]
        fn test_zeta_is_continuous_across_exact_limit() {
            let below = zeta(EXACT_ZETA_LIMIT, 0.7);
            let above = zeta(EXACT_ZETA_LIMIT + 1, 0.7);
            let step = ((EXACT_ZETA_LIMIT + 1) as f64).powf(-0.7);

            assert!(((above - below) - step).abs() < 1e-9);
        }

        #[test]
        fn test_huge_population_builds_quickly() {
            let p = ZipfParams::from_theta(10_000_000_000_000_000, 0.5).unwrap();

            // zeta(n, 0.5) ~ 2 sqrt(n) + zeta(0.5)
            let expected = 2.0 * 1e8 - 1.460_354_508_809_586_8;
            assert!(((p.zetan() - expected) / expected).abs() < 1e-9);
        }
    }

    mod sampling {
        use super::*;

        #[test]
        fn test_fast_paths_cover_two_most_frequent_ranks() {
            let p = ZipfParams::from_theta(1000, 0.9).unwrap();

            assert_eq!(p.rank_for(0.0), 1);
            assert_eq!(p.rank_for(0.999_999 / p.zetan()), 1);
            assert_eq!(p.rank_for(1.000_001 / p.zetan()), 2);
            assert_eq!(p.rank_for((p.zeta2() - 1e-9) / p.zetan()), 2);
        }

        #[test]
        fn test_rank_is_clamped_at_the_top() {
            let p = ZipfParams::from_theta(1000, 0.5).unwrap();
            let largest_u = 1.0 - f64::EPSILON / 2.0;

            assert!(p.rank_for(largest_u) <= 1000);
        }

        #[test]
        fn test_single_rank_population_always_returns_one() {
            let p = ZipfParams::from_theta(1, 0.5).unwrap();
            let g = Guacamole::with_backend(9, Backend::Portable);

            for _ in 0..1000 {
                assert_eq!(p.sample(&g), 1);
            }
        }

        #[test]
        fn test_samples_stay_in_range() {
            let p = ZipfParams::from_alpha(37, 3.0).unwrap();
            let g = Guacamole::new_seeded(12);

            for _ in 0..10_000 {
                let r = p.sample(&g);
                assert!((1..=37).contains(&r), "rank {r} out of range");
            }
        }

        #[test]
        fn test_skewed_draws_favour_low_ranks() {
            let p = ZipfParams::from_theta(10, 0.99).unwrap();
            let g = Guacamole::new_seeded(2025);
            let mut hits = [0u64; 10];

            for _ in 0..100_000 {
                hits[(p.sample(&g) - 1) as usize] += 1;
            }

            assert!(hits[0] > 3 * hits[9], "rank 1 should dominate rank 10: {hits:?}");
        }
    }
}
