//! Truncated-normal sampling for the target product.

use rand::Rng;

/// Numerical floor for uniform draws fed to `ln`.
const EPSILON: f64 = 1e-12;

/// Draw a standard normal value using the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(EPSILON);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Sample `N(mu, sigma)` restricted to `[min, max]` by rejection.
///
/// Up to `max_draws` draws are tried; after that, or when `sigma` is not a
/// usable positive number, the mean clamped into the range is returned.
pub fn sample_truncated_normal<R: Rng + ?Sized>(
    rng: &mut R,
    min: f64,
    max: f64,
    mu: f64,
    sigma: f64,
    max_draws: u32,
) -> f64 {
    let clamped_mean = mu.max(min).min(max);
    if !(sigma.is_finite() && sigma > 0.0) {
        return clamped_mean;
    }
    for _ in 0..max_draws {
        let x = mu + sigma * standard_normal(rng);
        if (min..=max).contains(&x) {
            return x;
        }
    }
    clamped_mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn samples_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..2_000 {
            let x = sample_truncated_normal(&mut rng, 1.0, 144.0, 72.5, 143.0 / 6.0, 40);
            assert!((1.0..=144.0).contains(&x), "out of range: {x}");
        }
    }

    #[test]
    fn degenerate_sigma_returns_clamped_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(sample_truncated_normal(&mut rng, 4.0, 4.0, 4.0, 0.0, 40), 4.0);
        assert_eq!(sample_truncated_normal(&mut rng, 1.0, 9.0, 20.0, f64::NAN, 40), 9.0);
    }

    #[test]
    fn exhausted_draws_fall_back_to_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // A window far out in the tail is essentially never hit.
        let x = sample_truncated_normal(&mut rng, 1000.0, 1001.0, 0.0, 1.0, 40);
        assert_eq!(x, 1000.0);

        assert_eq!(sample_truncated_normal(&mut rng, 0.0, 10.0, 5.0, 2.0, 0), 5.0);
    }

    #[test]
    fn standard_normal_is_roughly_centered() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 20_000;
        let mean = (0..n).map(|_| standard_normal(&mut rng)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean drifted: {mean}");
    }
}
