/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod primary;

pub use primary::{as_bool, as_f64, as_list, as_unsigned};

#[cfg(feature = "prom-metrics")]
mod prom_metrics;
#[cfg(feature = "prom-metrics")]
pub use prom_metrics::{
    as_histogram_buckets, as_histogram_config, as_label_name, as_summary_config,
    as_summary_objective,
};
