/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use log::warn;
use yaml_rust::{Yaml, yaml};

use g3_prom_metrics::{HistogramConfig, LabelName, Objective, SummaryConfig};

pub fn as_label_name(v: &Yaml) -> anyhow::Result<LabelName> {
    if let Yaml::String(s) = v {
        LabelName::from_str(s).map_err(|e| anyhow!("invalid label name {s}: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'label name' should be 'string'"))
    }
}

/// Parse an objective in the `<quantile>:<epsilon>` form, or a map with the
/// `quantile` and `epsilon` keys.
pub fn as_summary_objective(v: &Yaml) -> anyhow::Result<Objective> {
    match v {
        Yaml::String(s) => {
            Objective::from_str(s).map_err(|e| anyhow!("invalid objective string {s}: {e}"))
        }
        Yaml::Hash(map) => {
            let mut quantile = None;
            let mut epsilon = None;
            crate::foreach_kv(map, |k, v| match k {
                "quantile" => {
                    quantile = Some(crate::value::as_f64(v)?);
                    Ok(())
                }
                "epsilon" => {
                    epsilon = Some(crate::value::as_f64(v)?);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            let (Some(quantile), Some(epsilon)) = (quantile, epsilon) else {
                return Err(anyhow!("both quantile and epsilon should be set"));
            };
            Objective::new(quantile, epsilon).map_err(|e| anyhow!("invalid objective: {e}"))
        }
        _ => Err(anyhow!(
            "yaml value type for 'summary objective' should be 'string' or 'map'"
        )),
    }
}

fn as_bucket_layout(map: &yaml::Hash, step_key: &str) -> anyhow::Result<(f64, f64, usize)> {
    let mut start = None;
    let mut step = None;
    let mut count = None;
    crate::foreach_kv(map, |k, v| {
        match k {
            "start" => {
                start = Some(
                    crate::value::as_f64(v).context(format!("invalid f64 value for key {k}"))?,
                );
                Ok(())
            }
            "count" => {
                count = Some(
                    crate::value::as_unsigned::<usize>(v)
                        .context(format!("invalid usize value for key {k}"))?,
                );
                Ok(())
            }
            s if s == step_key => {
                step = Some(
                    crate::value::as_f64(v).context(format!("invalid f64 value for key {k}"))?,
                );
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    })?;
    let Some(start) = start else {
        return Err(anyhow!("no start value set"));
    };
    let Some(step) = step else {
        return Err(anyhow!("no {step_key} value set"));
    };
    let Some(count) = count else {
        return Err(anyhow!("no count value set"));
    };
    Ok((start, step, count))
}

/// Parse histogram buckets, either as an explicit list of upper bounds or as a
/// `linear` / `exponential` generator map.
pub fn as_histogram_buckets(v: &Yaml) -> anyhow::Result<Vec<f64>> {
    match v {
        Yaml::Hash(map) => {
            if map.len() != 1 {
                return Err(anyhow!(
                    "the bucket generator map should contain exactly one of 'linear' or 'exponential'"
                ));
            }
            let mut buckets = Vec::new();
            crate::foreach_kv(map, |k, v| {
                let Yaml::Hash(layout) = v else {
                    return Err(anyhow!("yaml value type for key {k} should be 'map'"));
                };
                match k {
                    "linear" => {
                        let (start, width, count) = as_bucket_layout(layout, "width")?;
                        buckets = g3_prom_metrics::linear_buckets(start, width, count)?;
                        Ok(())
                    }
                    "exponential" => {
                        let (start, factor, count) = as_bucket_layout(layout, "factor")?;
                        buckets = g3_prom_metrics::exponential_buckets(start, factor, count)?;
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid bucket generator {k}")),
                }
            })?;
            Ok(buckets)
        }
        _ => crate::value::as_list(v, crate::value::as_f64),
    }
}

/// Parse a histogram config map. A simplified form with only the bucket value
/// is also accepted.
pub fn as_histogram_config(v: &Yaml) -> anyhow::Result<HistogramConfig> {
    let mut config = HistogramConfig::default();
    if let Yaml::Hash(map) = v {
        crate::foreach_kv(map, |k, v| match k {
            "buckets" => {
                let buckets = as_histogram_buckets(v)
                    .context(format!("invalid histogram buckets value for key {k}"))?;
                config.set_buckets(buckets);
                Ok(())
            }
            "labels" | "label_names" => {
                let names = crate::value::as_list(v, as_label_name)
                    .context(format!("invalid label name list value for key {k}"))?;
                config.set_label_names(names);
                Ok(())
            }
            "suppress_initial_value" => {
                let suppress = crate::value::as_bool(v)
                    .context(format!("invalid bool value for key {k}"))?;
                config.set_suppress_initial_value(suppress);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
    } else {
        let buckets = as_histogram_buckets(v).context(
            "the value for simplified form of histogram config map should be the buckets",
        )?;
        config.set_buckets(buckets);
    }
    Ok(config)
}

pub fn as_summary_config(v: &Yaml) -> anyhow::Result<SummaryConfig> {
    let Yaml::Hash(map) = v else {
        return Err(anyhow!("yaml value type for 'summary config' should be 'map'"));
    };

    let mut config = SummaryConfig::default();
    crate::foreach_kv(map, |k, v| match k {
        "objectives" => {
            let objectives = crate::value::as_list(v, as_summary_objective)
                .context(format!("invalid objective list value for key {k}"))?;
            config.set_objectives(objectives);
            Ok(())
        }
        "max_age" => {
            let max_age = crate::humanize::as_time_delta(v)
                .context(format!("invalid humanize duration value for key {k}"))?;
            config.set_max_age(max_age);
            Ok(())
        }
        "age_buckets" => {
            let age_buckets = crate::value::as_unsigned::<u32>(v)
                .context(format!("invalid u32 value for key {k}"))?;
            config.set_age_buckets(age_buckets);
            Ok(())
        }
        "buf_cap" => {
            let buf_cap = crate::value::as_unsigned::<usize>(v)
                .context(format!("invalid usize value for key {k}"))?;
            config.set_buf_cap(buf_cap);
            Ok(())
        }
        "buffer_capacity" => {
            warn!("deprecated config key '{k}', please use 'buf_cap' instead");
            let buf_cap = crate::value::as_unsigned::<usize>(v)
                .context(format!("invalid usize value for key {k}"))?;
            config.set_buf_cap(buf_cap);
            Ok(())
        }
        "labels" | "label_names" => {
            let names = crate::value::as_list(v, as_label_name)
                .context(format!("invalid label name list value for key {k}"))?;
            config.set_label_names(names);
            Ok(())
        }
        "suppress_initial_value" => {
            let suppress =
                crate::value::as_bool(v).context(format!("invalid bool value for key {k}"))?;
            config.set_suppress_initial_value(suppress);
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;
    Ok(config)
}
