/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::time::Instant;

use crate::{HistogramSnapshot, SummarySnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricType {
    Histogram,
    Summary,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetricData {
    Histogram(HistogramSnapshot),
    Summary(SummarySnapshot),
}

impl MetricData {
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricData::Histogram(_) => MetricType::Histogram,
            MetricData::Summary(_) => MetricType::Summary,
        }
    }

    pub fn sample_count(&self) -> u64 {
        match self {
            MetricData::Histogram(h) => h.sample_count,
            MetricData::Summary(s) => s.sample_count,
        }
    }

    pub fn sample_sum(&self) -> f64 {
        match self {
            MetricData::Histogram(h) => h.sample_sum,
            MetricData::Summary(s) => s.sample_sum,
        }
    }
}

/// A per label combination metric instance that accepts observations and
/// can be collected by the exporter.
pub trait Metric: Send + Sync {
    fn metric_type(&self) -> MetricType;

    /// Record one observation. NaN values are ignored.
    fn observe(&self, value: f64);

    /// Take a snapshot of the accumulated state.
    fn populate(&self, now: Instant) -> MetricData;

    /// Whether the instance has data worth exporting.
    fn is_published(&self) -> bool;
}
