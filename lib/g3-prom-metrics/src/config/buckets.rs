/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use crate::ConfigError;

/// Default histogram buckets, tailored to measure request latency in seconds.
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Create `count` buckets, the lowest being `start` and each following one
/// `width` wider than the previous.
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Result<Vec<f64>, ConfigError> {
    if count < 1 {
        return Err(ConfigError::InvalidBucketLayout(
            "linear buckets need a positive count",
        ));
    }
    if !(width > 0.0) {
        return Err(ConfigError::InvalidBucketLayout(
            "linear buckets need a positive width",
        ));
    }

    let mut buckets = Vec::with_capacity(count);
    let mut current = start;
    for _ in 0..count {
        buckets.push(current);
        current += width;
    }
    Ok(buckets)
}

/// Create `count` buckets, the lowest being `start` and each following one
/// `factor` times the previous.
pub fn exponential_buckets(
    start: f64,
    factor: f64,
    count: usize,
) -> Result<Vec<f64>, ConfigError> {
    if count < 1 {
        return Err(ConfigError::InvalidBucketLayout(
            "exponential buckets need a positive count",
        ));
    }
    if !(start > 0.0) {
        return Err(ConfigError::InvalidBucketLayout(
            "exponential buckets need a positive start value",
        ));
    }
    if !(factor > 1.0) {
        return Err(ConfigError::InvalidBucketLayout(
            "exponential buckets need a factor greater than 1",
        ));
    }

    let mut buckets = Vec::with_capacity(count);
    let mut current = start;
    for _ in 0..count {
        buckets.push(current);
        current *= factor;
    }
    Ok(buckets)
}

/// Sort out the final upper bounds, appending +Inf if missing.
pub(crate) fn upper_bounds(buckets: &[f64]) -> Result<Box<[f64]>, ConfigError> {
    if buckets.is_empty() {
        return Err(ConfigError::EmptyBuckets);
    }

    let mut bounds = buckets.to_vec();
    if bounds.last() != Some(&f64::INFINITY) {
        bounds.push(f64::INFINITY);
    }
    for w in bounds.windows(2) {
        // NaN never compares as increasing
        if !(w[1] > w[0]) {
            return Err(ConfigError::BucketsNotIncreasing {
                prev: w[0],
                next: w[1],
            });
        }
    }
    Ok(bounds.into_boxed_slice())
}
