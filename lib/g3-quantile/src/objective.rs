/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ObjectiveError {
    #[error("quantile {0} is not in range (0, 1)")]
    QuantileOutOfRange(f64),
    #[error("epsilon {0} is not in range (0, 1)")]
    EpsilonOutOfRange(f64),
    #[error("no ':' delimiter found")]
    NoDelimiter,
    #[error("invalid float value: {0}")]
    InvalidFloat(#[from] ParseFloatError),
}

/// A target quantile together with the absolute rank error allowed for it.
///
/// If the objective is `(0.9, 0.01)`, the value reported for 0.9 will be the
/// φ-quantile value for some φ between 0.89 and 0.91.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Objective {
    quantile: f64,
    epsilon: f64,
}

impl Objective {
    pub const P50: Objective = Objective {
        quantile: 0.5,
        epsilon: 0.05,
    };
    pub const P90: Objective = Objective {
        quantile: 0.9,
        epsilon: 0.01,
    };
    pub const P99: Objective = Objective {
        quantile: 0.99,
        epsilon: 0.001,
    };

    pub fn new(quantile: f64, epsilon: f64) -> Result<Self, ObjectiveError> {
        if !(quantile > 0.0 && quantile < 1.0) {
            return Err(ObjectiveError::QuantileOutOfRange(quantile));
        }
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(ObjectiveError::EpsilonOutOfRange(epsilon));
        }
        Ok(Objective { quantile, epsilon })
    }

    #[inline]
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl FromStr for Objective {
    type Err = ObjectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, e) = s.split_once(':').ok_or(ObjectiveError::NoDelimiter)?;
        let quantile = f64::from_str(q.trim())?;
        let epsilon = f64::from_str(e.trim())?;
        Objective::new(quantile, epsilon)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.quantile, self.epsilon)
    }
}
