/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use chrono::TimeDelta;
use humanize_rs::ParseError;
use yaml_rust::Yaml;

fn to_time_delta(d: Duration, negative: bool) -> anyhow::Result<TimeDelta> {
    let delta = TimeDelta::from_std(d).map_err(|e| anyhow!("out of range duration: {e}"))?;
    if negative {
        Ok(-delta)
    } else {
        Ok(delta)
    }
}

fn seconds_f64(f: f64) -> anyhow::Result<TimeDelta> {
    let d = Duration::try_from_secs_f64(f.abs()).map_err(anyhow::Error::new)?;
    to_time_delta(d, f.is_sign_negative())
}

/// Parse a signed humanize duration.
///
/// Besides the humanize form like `1h30m`, plain numbers are taken as seconds.
/// A leading `-` makes the value negative, which is left to the consumer to
/// reject.
pub fn as_time_delta(v: &Yaml) -> anyhow::Result<TimeDelta> {
    match v {
        Yaml::String(value) => {
            let value = value.trim();
            let (negative, abs) = match value.strip_prefix('-') {
                Some(s) => (true, s),
                None => (false, value),
            };
            match humanize_rs::duration::parse(abs) {
                Ok(d) => to_time_delta(d, negative),
                Err(ParseError::MissingUnit) => {
                    if let Ok(u) = i64::from_str(value) {
                        TimeDelta::try_seconds(u)
                            .ok_or_else(|| anyhow!("out of range seconds {u}"))
                    } else if let Ok(f) = f64::from_str(value) {
                        seconds_f64(f)
                    } else {
                        Err(anyhow!("invalid duration string {value}"))
                    }
                }
                Err(e) => Err(anyhow!("invalid humanize duration string {value}: {e}")),
            }
        }
        Yaml::Integer(value) => {
            TimeDelta::try_seconds(*value).ok_or_else(|| anyhow!("out of range seconds {value}"))
        }
        Yaml::Real(s) => {
            let f = f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))?;
            seconds_f64(f)
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer' or 'real'"
        )),
    }
}
