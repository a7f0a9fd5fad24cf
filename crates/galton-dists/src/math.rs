//! Numeric helpers shared by the distribution families.
//!
//! Log-gamma uses the Lanczos approximation (g = 7, 9 coefficients), good to
//! roughly 1e-13 relative error over the positive reals. Gamma variates use
//! Marsaglia and Tsang's squeeze method with the shape < 1 boost; normals
//! use Box-Muller.

use rand::Rng;
use rand_pcg::Pcg64;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0`.
pub fn ln_gamma(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }
    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFICIENTS[0];
    for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Natural log of the beta function B(a, b).
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Natural log of the binomial coefficient C(n, k); requires `k <= n`.
pub fn ln_choose(n: u64, k: u64) -> f64 {
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// One standard normal variate via Box-Muller.
pub fn draw_standard_normal(rng: &mut Pcg64) -> f64 {
    let u1 = rng.random::<f64>().max(1e-15);
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// One Gamma(shape, 1) variate via Marsaglia and Tsang's method.
///
/// Shapes below 1 are boosted through Gamma(shape + 1, 1) and scaled by
/// U^(1/shape).
pub fn draw_gamma(rng: &mut Pcg64, shape: f64) -> f64 {
    if shape < 1.0 {
        let boost = rng.random::<f64>().max(1e-15).powf(1.0 / shape);
        return draw_gamma(rng, shape + 1.0) * boost;
    }
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = draw_standard_normal(rng);
        let v = (1.0 + c * x).powi(3);
        if v > 0.0 {
            let u = rng.random::<f64>().max(1e-15);
            if u.ln() < 0.5 * x * x + d - d * v + d * v.ln() {
                return d * v;
            }
        }
    }
}
