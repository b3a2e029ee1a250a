/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelNameError {
    #[error("empty label name")]
    Empty,
    #[error("invalid char {0:?} at position {1}")]
    InvalidChar(char, usize),
    #[error("label names starting with '__' are reserved for internal use")]
    ReservedPrefix,
}

/// Name of a metric label, following the `[a-zA-Z_][a-zA-Z0-9_]*` syntax.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelName(String);

impl LabelName {
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for LabelName {
    type Err = LabelNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(LabelNameError::Empty);
        }
        for (i, c) in s.chars().enumerate() {
            match c {
                'a'..='z' | 'A'..='Z' | '_' => {}
                '0'..='9' if i > 0 => {}
                _ => return Err(LabelNameError::InvalidChar(c, i)),
            }
        }
        if s.starts_with("__") {
            return Err(LabelNameError::ReservedPrefix);
        }
        Ok(LabelName(s.to_string()))
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for LabelName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
