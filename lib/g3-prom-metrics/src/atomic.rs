/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

use portable_atomic::AtomicF64;

/// Lock free f64 accumulator.
///
/// The add is a compare-and-swap retry loop on the bit pattern, so concurrent
/// adders never lose updates.
#[derive(Debug, Default)]
pub struct AtomicSum {
    inner: AtomicF64,
}

impl AtomicSum {
    pub const fn new(v: f64) -> Self {
        AtomicSum {
            inner: AtomicF64::new(v),
        }
    }

    /// Add `delta` and return the updated value.
    #[inline]
    pub fn add(&self, delta: f64) -> f64 {
        self.inner.fetch_add(delta, Ordering::AcqRel) + delta
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.inner.load(Ordering::Acquire)
    }
}

/// Lock free u64 accumulator.
#[derive(Debug, Default)]
pub struct AtomicCount {
    inner: AtomicU64,
}

impl AtomicCount {
    pub const fn new(v: u64) -> Self {
        AtomicCount {
            inner: AtomicU64::new(v),
        }
    }

    /// Add `delta` and return the updated value.
    #[inline]
    pub fn add(&self, delta: u64) -> u64 {
        self.inner.fetch_add(delta, Ordering::AcqRel).wrapping_add(delta)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.inner.load(Ordering::Acquire)
    }
}
