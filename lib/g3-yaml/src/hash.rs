/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

/// Call `f` on every entry of the map with the normalized key, which is lower
/// case and has `-` replaced by `_`.
///
/// Keys that become the same after normalization are rejected.
pub fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    let mut seen: Vec<String> = Vec::with_capacity(table.len());
    for (k, v) in table.iter() {
        let Yaml::String(raw) = k else {
            return Err(anyhow!("key in map should be string, found {k:?}"));
        };
        let key = normalize_key(raw);
        if seen.contains(&key) {
            return Err(anyhow!("duplicated key {raw}"));
        }
        f(&key, v).context(format!("failed to parse value of key {raw}"))?;
        seen.push(key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize() {
        assert_eq!(normalize_key("buf_cap"), "buf_cap");
        assert_eq!(normalize_key("Buf-Cap"), "buf_cap");
        assert_eq!(normalize_key("MAX-AGE"), "max_age");
    }

    #[test]
    fn foreach_kv_ok() {
        let yaml = yaml_doc!("Age-Buckets: 5\nbuf_cap: 500");
        let hash = yaml.as_hash().unwrap();
        let mut result = Vec::new();
        foreach_kv(hash, |k, v| {
            result.push((k.to_owned(), v.as_i64().unwrap()));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            result,
            vec![
                ("age_buckets".to_string(), 5),
                ("buf_cap".to_string(), 500)
            ]
        );
    }

    #[test]
    fn foreach_kv_err() {
        let yaml = yaml_doc!("0.5: 0.05");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |_, _| Ok(())).is_err());

        let yaml = yaml_doc!("max_age: 10m");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |k, _| Err(anyhow!("error at {k}"))).is_err());
    }

    #[test]
    fn duplicated_key() {
        let yaml = yaml_doc!("buf_cap: 10\nbuf-cap: 20");
        let hash = yaml.as_hash().unwrap();
        let mut count = 0;
        assert!(
            foreach_kv(hash, |_, _| {
                count += 1;
                Ok(())
            })
            .is_err()
        );
        assert_eq!(count, 1);
    }
}
