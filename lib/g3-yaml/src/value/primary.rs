/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

/// Parse an unsigned integer like a bucket count or a buffer capacity.
pub fn as_unsigned<T>(v: &Yaml) -> anyhow::Result<T>
where
    T: TryFrom<i64> + FromStr,
{
    match v {
        Yaml::Integer(i) => T::try_from(*i).map_err(|_| anyhow!("integer {i} is out of range")),
        Yaml::String(s) => {
            T::from_str(s.trim()).map_err(|_| anyhow!("invalid unsigned integer string {s}"))
        }
        _ => Err(anyhow!(
            "yaml value type for unsigned integer should be 'integer' or 'string'"
        )),
    }
}

fn parse_f64(s: &str) -> anyhow::Result<f64> {
    match s.trim().to_lowercase().as_str() {
        "inf" | "+inf" | ".inf" | "+.inf" => Ok(f64::INFINITY),
        "-inf" | "-.inf" => Ok(f64::NEG_INFINITY),
        t => f64::from_str(t).map_err(|e| anyhow!("invalid float string {s}: {e}")),
    }
}

/// Parse a float value. The yaml infinity forms are accepted, NaN is not.
pub fn as_f64(v: &Yaml) -> anyhow::Result<f64> {
    let f = match v {
        Yaml::Real(s) | Yaml::String(s) => parse_f64(s)?,
        Yaml::Integer(i) => *i as f64,
        _ => {
            return Err(anyhow!(
                "yaml value type for 'f64' should be 'real', 'integer' or 'string'"
            ));
        }
    };
    if f.is_nan() {
        Err(anyhow!("NaN is not a valid value"))
    } else {
        Ok(f)
    }
}

pub fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::Boolean(b) => Ok(*b),
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("invalid bool string {s}")),
        },
        _ => Err(anyhow!("yaml value type for 'bool' should be 'boolean' or 'string'")),
    }
}

/// Convert a sequence, or a single value as a one element list.
pub fn as_list<T, F>(v: &Yaml, convert: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&Yaml) -> anyhow::Result<T>,
{
    if let Yaml::Array(seq) = v {
        seq.iter()
            .enumerate()
            .map(|(i, v)| convert(v).context(format!("invalid value for list element #{i}")))
            .collect()
    } else {
        let node = convert(v).context("invalid single value for the list")?;
        Ok(vec![node])
    }
}
