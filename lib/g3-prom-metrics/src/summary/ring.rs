/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::debug;

use g3_quantile::{Objective, TargetedStream};

use crate::SampleBuffer;

/// The write side, protected by the buffer lock.
pub(super) struct HotBuffer {
    pub(super) buf: SampleBuffer,
    pub(super) expires: Instant,
}

/// Everything else, protected by the state lock.
pub(super) struct StreamRing {
    pub(super) cold: SampleBuffer,
    streams: Box<[TargetedStream]>,
    pub(super) head_idx: usize,
    pub(super) head_expires: Instant,
    pub(super) sum: f64,
    pub(super) count: u64,
}

impl StreamRing {
    pub(super) fn new(
        objectives: &[Objective],
        age_buckets: usize,
        buf_cap: usize,
        expires: Instant,
    ) -> Self {
        let streams = (0..age_buckets)
            .map(|_| TargetedStream::new(objectives))
            .collect();
        StreamRing {
            cold: SampleBuffer::new(buf_cap),
            streams,
            head_idx: 0,
            head_expires: expires,
            sum: 0.0,
            count: 0,
        }
    }

    /// Swap the hot and cold buffer, then drain the new cold buffer into every
    /// stream and rotate the expired streams out.
    pub(super) fn flush(&mut self, hot: &mut HotBuffer, now: Instant, stream_duration: Duration) {
        assert!(self.cold.is_empty(), "cold sample buffer is not empty");
        mem::swap(&mut hot.buf, &mut self.cold);

        // the hot buffer is now empty and gets a new expiry
        if now > hot.expires {
            hot.expires += round_up(now - hot.expires, stream_duration);
        }

        self.drain_cold();
        self.maybe_rotate(hot.expires, stream_duration);
    }

    fn drain_cold(&mut self) {
        for &v in self.cold.as_slice() {
            for stream in self.streams.iter_mut() {
                stream.insert(v);
            }
            self.count += 1;
            self.sum += v;
        }
        self.cold.reset();
    }

    fn maybe_rotate(&mut self, hot_expires: Instant, stream_duration: Duration) {
        if self.head_expires == hot_expires {
            return;
        }

        let len = self.streams.len();
        let behind = (hot_expires - self.head_expires).as_nanos() / stream_duration.as_nanos();
        if behind >= len as u128 {
            debug!("summary stayed idle for {behind} age buckets, reset all {len} streams");
            for stream in self.streams.iter_mut() {
                stream.reset();
            }
            self.head_idx = ((self.head_idx as u128 + behind) % len as u128) as usize;
            self.head_expires = hot_expires;
            return;
        }

        while self.head_expires != hot_expires {
            self.streams[self.head_idx].reset();
            self.head_idx = (self.head_idx + 1) % len;
            self.head_expires += stream_duration;
        }
    }

    /// Query the head stream, NaN if it has no observations.
    pub(super) fn query_head(&mut self, quantile: f64) -> f64 {
        let head = &mut self.streams[self.head_idx];
        if head.count() == 0 {
            f64::NAN
        } else {
            head.query(quantile)
        }
    }

    #[cfg(test)]
    pub(super) fn stream_counts(&self) -> Vec<u64> {
        self.streams.iter().map(|s| s.count()).collect()
    }
}

/// The buffer lock and the state lock of one summary child.
///
/// The state lock is only reachable from a held [`HotGuard`] of the same
/// pair, so it is always taken after the buffer lock.
pub(super) struct LockPair {
    hot: Mutex<HotBuffer>,
    state: Mutex<StreamRing>,
}

impl LockPair {
    pub(super) fn new(hot: HotBuffer, ring: StreamRing) -> Self {
        LockPair {
            hot: Mutex::new(hot),
            state: Mutex::new(ring),
        }
    }

    pub(super) fn lock(&self) -> HotGuard<'_> {
        HotGuard {
            hot: self.hot.lock().unwrap(),
            state: &self.state,
        }
    }
}

pub(super) struct HotGuard<'a> {
    hot: MutexGuard<'a, HotBuffer>,
    state: &'a Mutex<StreamRing>,
}

impl<'a> HotGuard<'a> {
    pub(super) fn lock_state(&self) -> MutexGuard<'a, StreamRing> {
        self.state.lock().unwrap()
    }
}

impl Deref for HotGuard<'_> {
    type Target = HotBuffer;

    fn deref(&self) -> &Self::Target {
        &self.hot
    }
}

impl DerefMut for HotGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.hot
    }
}

/// Round `gap` up to a multiple of `step`.
fn round_up(gap: Duration, step: Duration) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let step = step.as_nanos();
    let nanos = gap.as_nanos().div_ceil(step) * step;
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}
