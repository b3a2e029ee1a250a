/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Fixed capacity append only buffer of pending observations.
#[derive(Debug)]
pub struct SampleBuffer {
    values: Box<[f64]>,
    position: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        SampleBuffer {
            values: vec![0.0; capacity].into_boxed_slice(),
            position: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.position == self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// Append a value. The caller must make sure the buffer is not full.
    pub fn append(&mut self, v: f64) {
        assert!(!self.is_full(), "sample buffer overflow");
        self.values[self.position] = v;
        self.position += 1;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.position]
    }

    #[inline]
    pub fn reset(&mut self) {
        self.position = 0;
    }
}
