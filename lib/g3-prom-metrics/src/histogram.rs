/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::{
    AtomicCount, AtomicSum, ConfigError, HistogramConfig, LabelName, Metric, MetricData,
    MetricType,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bucket {
    pub upper_bound: f64,
    pub cumulative_count: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistogramSnapshot {
    pub sample_count: u64,
    pub sample_sum: f64,
    pub buckets: Vec<Bucket>,
}

struct HistogramShared {
    upper_bounds: Box<[f64]>,
    label_names: Vec<LabelName>,
    suppress_initial_value: bool,
}

/// A cumulative histogram with fixed bucket upper bounds.
///
/// The histogram itself is the unlabelled instance, children for other label
/// combinations are created by [`Histogram::new_child`] and share the bucket
/// layout.
pub struct Histogram {
    shared: Arc<HistogramShared>,
    unlabelled: HistogramChild,
}

impl Histogram {
    pub fn new(config: &HistogramConfig) -> Result<Self, ConfigError> {
        let upper_bounds = config.check()?;
        let shared = Arc::new(HistogramShared {
            upper_bounds,
            label_names: config.label_names().to_vec(),
            suppress_initial_value: config.suppress_initial_value(),
        });
        let unlabelled = HistogramChild::new(Arc::clone(&shared));
        Ok(Histogram { shared, unlabelled })
    }

    pub fn new_child(&self) -> HistogramChild {
        HistogramChild::new(Arc::clone(&self.shared))
    }

    #[inline]
    pub fn unlabelled(&self) -> &HistogramChild {
        &self.unlabelled
    }

    #[inline]
    pub fn upper_bounds(&self) -> &[f64] {
        &self.shared.upper_bounds
    }

    #[inline]
    pub fn label_names(&self) -> &[LabelName] {
        &self.shared.label_names
    }

    #[inline]
    pub fn observe(&self, v: f64) {
        self.unlabelled.observe(v);
    }

    #[inline]
    pub fn publish(&self) {
        self.unlabelled.publish();
    }
}

pub struct HistogramChild {
    shared: Arc<HistogramShared>,
    bucket_counts: Box<[AtomicCount]>,
    sum: AtomicSum,
    published: AtomicBool,
}

impl HistogramChild {
    fn new(shared: Arc<HistogramShared>) -> Self {
        let bucket_counts = shared
            .upper_bounds
            .iter()
            .map(|_| AtomicCount::default())
            .collect();
        let published = AtomicBool::new(!shared.suppress_initial_value);
        HistogramChild {
            shared,
            bucket_counts,
            sum: AtomicSum::default(),
            published,
        }
    }

    pub fn observe(&self, v: f64) {
        if v.is_nan() {
            return;
        }

        // the last bound is +Inf, so there is always a match
        let i = self.shared.upper_bounds.partition_point(|b| *b < v);
        self.bucket_counts[i].add(1);
        self.sum.add(v);
        self.published.store(true, Ordering::Relaxed);
    }

    /// Mark this instance as having data to export even without observations.
    #[inline]
    pub fn publish(&self) {
        self.published.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_published(&self) -> bool {
        self.published.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut cumulative = 0u64;
        let buckets = self
            .shared
            .upper_bounds
            .iter()
            .zip(self.bucket_counts.iter())
            .map(|(upper_bound, count)| {
                cumulative += count.value();
                Bucket {
                    upper_bound: *upper_bound,
                    cumulative_count: cumulative,
                }
            })
            .collect();
        HistogramSnapshot {
            sample_count: cumulative,
            sample_sum: self.sum.value(),
            buckets,
        }
    }
}

impl Metric for HistogramChild {
    fn metric_type(&self) -> MetricType {
        MetricType::Histogram
    }

    fn observe(&self, value: f64) {
        HistogramChild::observe(self, value);
    }

    fn populate(&self, _now: Instant) -> MetricData {
        MetricData::Histogram(self.snapshot())
    }

    fn is_published(&self) -> bool {
        HistogramChild::is_published(self)
    }
}
