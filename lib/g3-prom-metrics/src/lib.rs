/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

pub use g3_quantile::{Objective, ObjectiveError};

mod atomic;
pub use atomic::{AtomicCount, AtomicSum};

mod buffer;
pub use buffer::SampleBuffer;

mod label;
pub use label::{LabelName, LabelNameError};

mod error;
pub use error::ConfigError;

mod config;
pub use config::{
    DEFAULT_AGE_BUCKETS, DEFAULT_BUCKETS, DEFAULT_BUF_CAP, DEFAULT_MAX_AGE, DEFAULT_OBJECTIVES,
    HistogramConfig, SummaryConfig, exponential_buckets, linear_buckets,
};

mod metric;
pub use metric::{Metric, MetricData, MetricType};

mod histogram;
pub use histogram::{Bucket, Histogram, HistogramChild, HistogramSnapshot};

mod summary;
pub use summary::{QuantileValue, Summary, SummaryChild, SummarySnapshot};
