//! Slice statistics for the verif workspace.
//!
//! Every moment here uses population (N) centering, which is what the
//! verification scores are defined against.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Population variance with N denominator.
/// Returns 0.0 if empty.
pub fn population_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation with N denominator.
pub fn population_sd(data: &[f64]) -> f64 {
    population_variance(data).sqrt()
}

/// Population covariance of two equally long slices.
///
/// Only the common prefix is used when the lengths differ. Returns 0.0 if
/// either slice is empty.
pub fn population_covariance(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = mean(x);
    let my = mean(y);
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - mx) * (yi - my))
        .sum::<f64>()
        / n as f64
}

/// Returns true if every element equals the first. Empty slices are constant.
///
/// Compared exactly: the centred variance of a constant slice is not always
/// zero once the mean has been rounded (e.g. `[0.1; 3]`).
pub fn is_constant(data: &[f64]) -> bool {
    match data.first() {
        Some(&first) => data.iter().all(|&v| v == first),
        None => true,
    }
}

/// Pearson correlation coefficient with population centering:
/// `cov(x, y) / (sd(x) * sd(y))`.
///
/// Returns `None` if the slices are empty, differ in length, or either
/// one is constant (zero denominator).
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }
    if is_constant(x) || is_constant(y) {
        return None;
    }

    let denom = population_sd(x) * population_sd(y);
    if denom == 0.0 {
        return None;
    }

    Some(population_covariance(x, y) / denom)
}
