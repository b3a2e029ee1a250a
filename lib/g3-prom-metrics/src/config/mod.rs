/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use chrono::TimeDelta;

use g3_quantile::Objective;

use crate::{ConfigError, LabelName};

mod buckets;
pub(crate) use buckets::upper_bounds;
pub use buckets::{DEFAULT_BUCKETS, exponential_buckets, linear_buckets};

/// Default quantile objectives of a summary.
pub const DEFAULT_OBJECTIVES: [Objective; 3] = [Objective::P50, Objective::P90, Objective::P99];
/// Default duration for which observations stay relevant.
pub const DEFAULT_MAX_AGE: TimeDelta = TimeDelta::minutes(10);
/// Default number of buckets used to calculate the age of observations.
pub const DEFAULT_AGE_BUCKETS: u32 = 5;
/// Default sample buffer capacity.
pub const DEFAULT_BUF_CAP: usize = 500;

fn check_label_names(names: &[LabelName], reserved: &'static str) -> Result<(), ConfigError> {
    for (i, name) in names.iter().enumerate() {
        if name == reserved {
            return Err(ConfigError::ReservedLabel(reserved));
        }
        if names[..i].contains(name) {
            return Err(ConfigError::DuplicatedLabel(name.to_string()));
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistogramConfig {
    buckets: Vec<f64>,
    label_names: Vec<LabelName>,
    suppress_initial_value: bool,
}

impl HistogramConfig {
    pub const BUCKET_LABEL: &'static str = "le";

    #[inline]
    pub fn set_buckets(&mut self, buckets: Vec<f64>) {
        self.buckets = buckets;
    }

    #[inline]
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    #[inline]
    pub fn set_label_names(&mut self, names: Vec<LabelName>) {
        self.label_names = names;
    }

    #[inline]
    pub fn label_names(&self) -> &[LabelName] {
        &self.label_names
    }

    /// Do not publish children until they get their first observation.
    #[inline]
    pub fn set_suppress_initial_value(&mut self, suppress: bool) {
        self.suppress_initial_value = suppress;
    }

    #[inline]
    pub fn suppress_initial_value(&self) -> bool {
        self.suppress_initial_value
    }

    pub(crate) fn check(&self) -> Result<Box<[f64]>, ConfigError> {
        check_label_names(&self.label_names, Self::BUCKET_LABEL)?;
        upper_bounds(&self.buckets)
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        HistogramConfig {
            buckets: DEFAULT_BUCKETS.to_vec(),
            label_names: Vec::new(),
            suppress_initial_value: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryConfig {
    objectives: Vec<Objective>,
    max_age: TimeDelta,
    age_buckets: u32,
    buf_cap: usize,
    label_names: Vec<LabelName>,
    suppress_initial_value: bool,
}

impl SummaryConfig {
    pub const QUANTILE_LABEL: &'static str = "quantile";

    /// Set the quantile rank estimates with their respective absolute error.
    ///
    /// An empty list means the default objectives.
    #[inline]
    pub fn set_objectives(&mut self, objectives: Vec<Objective>) {
        self.objectives = objectives;
    }

    pub fn add_objective(&mut self, quantile: f64, epsilon: f64) -> Result<(), ConfigError> {
        let o = Objective::new(quantile, epsilon)?;
        self.objectives.push(o);
        Ok(())
    }

    #[inline]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Set the duration for which an observation stays relevant.
    ///
    /// Zero means the default value, negative values are rejected when the
    /// summary is created.
    #[inline]
    pub fn set_max_age(&mut self, max_age: TimeDelta) {
        self.max_age = max_age;
    }

    #[inline]
    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// Set the number of buckets used to exclude observations older than max
    /// age. With only one age bucket the summary is completely reset every
    /// max age period. Zero means the default value.
    #[inline]
    pub fn set_age_buckets(&mut self, age_buckets: u32) {
        self.age_buckets = age_buckets;
    }

    #[inline]
    pub fn age_buckets(&self) -> u32 {
        self.age_buckets
    }

    /// Set the sample buffer capacity. Zero means the default value.
    #[inline]
    pub fn set_buf_cap(&mut self, buf_cap: usize) {
        self.buf_cap = buf_cap;
    }

    #[inline]
    pub fn buf_cap(&self) -> usize {
        self.buf_cap
    }

    #[inline]
    pub fn set_label_names(&mut self, names: Vec<LabelName>) {
        self.label_names = names;
    }

    #[inline]
    pub fn label_names(&self) -> &[LabelName] {
        &self.label_names
    }

    /// Do not publish children until they get their first observation.
    #[inline]
    pub fn set_suppress_initial_value(&mut self, suppress: bool) {
        self.suppress_initial_value = suppress;
    }

    #[inline]
    pub fn suppress_initial_value(&self) -> bool {
        self.suppress_initial_value
    }

    pub(crate) fn check_label_names(&self) -> Result<(), ConfigError> {
        check_label_names(&self.label_names, Self::QUANTILE_LABEL)
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig {
            objectives: DEFAULT_OBJECTIVES.to_vec(),
            max_age: DEFAULT_MAX_AGE,
            age_buckets: DEFAULT_AGE_BUCKETS,
            buf_cap: DEFAULT_BUF_CAP,
            label_names: Vec::new(),
            suppress_initial_value: false,
        }
    }
}
