//! Standard normal distribution helpers.

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal PDF.
pub(crate) fn pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF (Abramowitz-Stegun 26.2.17, absolute error < 7.5e-8).
pub(crate) fn cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }

    let abs_x = x.abs();
    let t = 1.0 / (1.0 + 0.231_641_9 * abs_x);
    let poly = t
        * (0.319_381_530
            + t * (-0.356_563_782 + t * (1.781_477_937 + t * (-1.821_255_978 + t * 1.330_274_429))));
    let upper = pdf(abs_x) * poly;

    if x >= 0.0 { 1.0 - upper } else { upper }
}
