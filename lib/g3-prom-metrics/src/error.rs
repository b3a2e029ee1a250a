/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use chrono::TimeDelta;
use thiserror::Error;

use g3_quantile::ObjectiveError;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("histogram must have at least one bucket")]
    EmptyBuckets,
    #[error("bucket values must be increasing, found {next} after {prev}")]
    BucketsNotIncreasing { prev: f64, next: f64 },
    #[error("invalid bucket layout: {0}")]
    InvalidBucketLayout(&'static str),
    #[error("{0} is a reserved label name")]
    ReservedLabel(&'static str),
    #[error("duplicated label name {0}")]
    DuplicatedLabel(String),
    #[error("illegal max age {0}")]
    NegativeMaxAge(TimeDelta),
    #[error("max age {0:?} is too small to be split into {1} age buckets")]
    MaxAgeTooSmall(Duration, u32),
    #[error("invalid objective: {0}")]
    InvalidObjective(#[from] ObjectiveError),
}
