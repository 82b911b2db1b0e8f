//! # Distribution Library
//!
//! Stateless samplers for realistic (non-uniform) column values. Every
//! function takes its random source explicitly, so a seeded `StdRng` gives
//! reproducible output.
//!
//! Samplers are total: inverted bounds are swapped, a mean outside
//! `[min, max]` still clamps, and degenerate spreads collapse to a point
//! instead of panicking.

use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};

/// Spread used by [`log_normal`] when the median and max do not imply one.
const DEFAULT_LOG_SIGMA: f64 = 0.5;

/// Put a pair of bounds in ascending order.
fn ordered(min: f64, max: f64) -> (f64, f64) {
    if min <= max {
        (min, max)
    } else {
        (max, min)
    }
}

/// Clamp into `[min, max]`, mapping NaN to `min`.
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Sample a Gaussian value, clamped to `[min, max]`.
pub fn normal(rng: &mut impl Rng, mean: f64, std_dev: f64, min: f64, max: f64) -> f64 {
    let (min, max) = ordered(min, max);
    let sample = match Normal::new(mean, std_dev.abs()) {
        Ok(dist) if std_dev.is_finite() => dist.sample(rng),
        _ => mean,
    };
    clamp(sample, min, max)
}

/// Sample a right-skewed value whose median is `median` and whose long tail
/// reaches toward `max`, clamped to `[min, max]`.
///
/// The log-space spread is chosen so that `max` sits three standard
/// deviations above the median.
pub fn log_normal(rng: &mut impl Rng, median: f64, min: f64, max: f64) -> f64 {
    log_normal_with_sigma(rng, median, implied_sigma(median, max), min, max)
}

/// [`log_normal`] with an explicit log-space spread.
pub fn log_normal_with_sigma(
    rng: &mut impl Rng,
    median: f64,
    sigma: f64,
    min: f64,
    max: f64,
) -> f64 {
    let (min, max) = ordered(min, max);
    if !(median.is_finite() && median > 0.0) {
        return clamp(median, min, max);
    }
    let sample = match LogNormal::new(median.ln(), sigma.abs()) {
        Ok(dist) if sigma.is_finite() => dist.sample(rng),
        _ => median,
    };
    clamp(sample, min, max)
}

/// Log-space spread that puts `max` at three sigma above `median`.
pub fn implied_sigma(median: f64, max: f64) -> f64 {
    if median > 0.0 && max > median && max.is_finite() {
        (max / median).ln() / 3.0
    } else {
        DEFAULT_LOG_SIGMA
    }
}

/// Pick an index proportional to `weights`.
///
/// Weights need not sum to 100 (or 1). Negative and non-finite weights
/// count as zero; if nothing is left the pick is uniform. Returns `None`
/// only for an empty slice.
pub fn weighted_index(rng: &mut impl Rng, weights: &[f64]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    if weights.len() == 1 {
        return Some(0);
    }

    let clamped: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = clamped.iter().sum();

    if total <= 0.0 {
        return Some(rng.random_range(0..weights.len()));
    }

    let roll: f64 = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, w) in clamped.iter().enumerate() {
        cumulative += w;
        if roll < cumulative {
            return Some(i);
        }
    }

    // Floating-point edge case: last index with positive weight
    clamped.iter().rposition(|w| *w > 0.0)
}

/// Single draw from `values`, proportional to `weights`.
///
/// Missing weights (a shorter `weights` slice) count as zero; an empty
/// `weights` slice means uniform.
pub fn weighted_categorical<'a, T>(
    rng: &mut impl Rng,
    values: &'a [T],
    weights: &[f64],
) -> Option<&'a T> {
    if values.is_empty() {
        return None;
    }
    if weights.is_empty() {
        return values.get(rng.random_range(0..values.len()));
    }
    let aligned: Vec<f64> = (0..values.len())
        .map(|i| weights.get(i).copied().unwrap_or(0.0))
        .collect();
    weighted_index(rng, &aligned).and_then(|i| values.get(i))
}

/// Select a `[min, max)` range proportional to `weights`, then draw
/// uniformly within it. A zero-width range yields its bound.
pub fn weighted_range(rng: &mut impl Rng, ranges: &[[f64; 2]], weights: &[f64]) -> Option<f64> {
    let [lo, hi] = *weighted_categorical(rng, ranges, weights)?;
    Some(uniform(rng, lo, hi))
}

/// Uniform draw from `[min, max)`; `min` when the range is empty.
pub fn uniform(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    let (min, max) = ordered(min, max);
    if min < max && min.is_finite() && max.is_finite() {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Uniform integer draw from `[min, max]`.
pub fn uniform_int(rng: &mut impl Rng, min: i64, max: i64) -> i64 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(min..=max)
}

/// Round to a number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(15) as i32);
    (value * factor).round() / factor
}

/// The tightest bounds inside `[min, max]` that are exact at `places`
/// decimal places: `min` rounded up, `max` rounded down. `None` when no
/// value at that precision lies in the range.
pub fn inward_bounds(min: f64, max: f64, places: u32) -> Option<(f64, f64)> {
    let (min, max) = ordered(min, max);
    let step = 10f64.powi(-(places.min(15) as i32));
    let mut lo = round_to(min, places);
    if lo < min {
        lo = round_to(lo + step, places);
    }
    let mut hi = round_to(max, places);
    if hi > max {
        hi = round_to(hi - step, places);
    }
    (lo <= hi).then_some((lo, hi))
}

/// Round to `places` without leaving `[min, max]`.
pub fn round_within(value: f64, places: u32, min: f64, max: f64) -> Option<f64> {
    let (lo, hi) = inward_bounds(min, max, places)?;
    Some(clamp(round_to(value, places), lo, hi))
}
