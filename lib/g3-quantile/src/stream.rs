/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::mem;

use crate::Objective;

const BATCH_SIZE: usize = 500;

/// A stored value, covering `width` ranks of the stream.
///
/// The true rank of `value` lies between `rmin` and `rmin + delta`, where
/// `rmin` is the sum of all widths up to and including this sample.
#[derive(Clone, Copy, Debug)]
struct Sample {
    value: f64,
    width: u64,
    delta: u64,
}

/// Streaming quantile estimator for a fixed set of objectives.
///
/// This is the Greenwald-Khanna summary, "Space-Efficient Online Computation
/// of Quantile Summaries", with the rank error bound set to the smallest
/// epsilon among the objectives. Every sample keeps `width + delta <= 2εn`,
/// so any quantile query, targeted or not, returns a value whose rank is
/// within `εn` of the requested one whatever the input order.
///
/// Incoming values are buffered in a fixed size batch, which is sorted and
/// merged into the sample list once full.
#[derive(Clone, Debug)]
pub struct TargetedStream {
    epsilon: f64,
    n: u64,
    samples: Vec<Sample>,
    scratch: Vec<Sample>,
    batch: Vec<f64>,
    sorted: bool,
}

impl TargetedStream {
    pub fn new(objectives: &[Objective]) -> Self {
        let epsilon = objectives
            .iter()
            .map(|o| o.epsilon())
            .fold(1.0, f64::min);
        TargetedStream {
            epsilon,
            n: 0,
            samples: Vec::new(),
            scratch: Vec::new(),
            batch: Vec::with_capacity(BATCH_SIZE),
            sorted: true,
        }
    }

    /// The absolute rank error bound, as a fraction of the stream length.
    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn insert(&mut self, v: f64) {
        self.batch.push(v);
        self.sorted = false;
        if self.batch.len() >= BATCH_SIZE {
            self.flush();
        }
    }

    /// Get the estimated value at quantile `q`.
    ///
    /// The result is meaningless if the stream is empty, callers should check
    /// [`TargetedStream::count`] first.
    pub fn query(&mut self, q: f64) -> f64 {
        if self.samples.is_empty() {
            // not merged yet, answer exactly from the batch
            let len = self.batch.len();
            if len == 0 {
                return 0.0;
            }
            let mut i = (len as f64 * q).ceil() as usize;
            i = i.saturating_sub(1).min(len - 1);
            self.sort_batch();
            return self.batch[i];
        }

        self.flush();
        let n = self.n as f64;
        let bound = q * n + self.epsilon * n;

        let mut prev = self.samples[0];
        let mut rmin = prev.width;
        for cur in &self.samples[1..] {
            let next_rmin = rmin + cur.width;
            if (next_rmin + cur.delta) as f64 > bound {
                return prev.value;
            }
            rmin = next_rmin;
            prev = *cur;
        }
        prev.value
    }

    /// Number of values inserted since the last reset.
    pub fn count(&self) -> u64 {
        self.n + self.batch.len() as u64
    }

    /// Drop all samples. Allocated memory is kept for later use.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.batch.clear();
        self.n = 0;
        self.sorted = true;
    }

    fn sort_batch(&mut self) {
        if !self.sorted {
            self.batch.sort_unstable_by(f64::total_cmp);
            self.sorted = true;
        }
    }

    fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        self.sort_batch();
        self.merge();
        self.batch.clear();
        self.compress();
    }

    /// Merge the sorted batch into the sample list.
    fn merge(&mut self) {
        self.scratch.clear();
        let mut i = 0;
        for &v in &self.batch {
            while i < self.samples.len() && self.samples[i].value <= v {
                self.scratch.push(self.samples[i]);
                i += 1;
            }
            // new minimum and maximum values have an exact rank
            let delta = match self.samples.get(i) {
                Some(next) if !self.scratch.is_empty() => next.width + next.delta - 1,
                _ => 0,
            };
            self.scratch.push(Sample {
                value: v,
                width: 1,
                delta,
            });
            self.n += 1;
        }
        self.scratch.extend_from_slice(&self.samples[i..]);
        mem::swap(&mut self.samples, &mut self.scratch);
    }

    fn max_band(&self) -> u64 {
        (2.0 * self.epsilon * self.n as f64).floor() as u64
    }

    /// Fold samples into their successor while the band allows it. The
    /// minimum sample is never folded.
    fn compress(&mut self) {
        let len = self.samples.len();
        if len < 3 {
            return;
        }

        let max_band = self.max_band();
        self.scratch.clear();
        let mut acc = self.samples[len - 1];
        for cur in self.samples[1..len - 1].iter().rev() {
            if cur.width + acc.width + acc.delta <= max_band {
                acc.width += cur.width;
            } else {
                self.scratch.push(acc);
                acc = *cur;
            }
        }
        self.scratch.push(acc);
        self.scratch.push(self.samples[0]);
        self.scratch.reverse();
        mem::swap(&mut self.samples, &mut self.scratch);
    }
}
