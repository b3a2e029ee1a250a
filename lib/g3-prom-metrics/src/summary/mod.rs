/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use g3_quantile::Objective;

use crate::config::{DEFAULT_AGE_BUCKETS, DEFAULT_BUF_CAP, DEFAULT_MAX_AGE, DEFAULT_OBJECTIVES};
use crate::{ConfigError, LabelName, Metric, MetricData, MetricType, SampleBuffer, SummaryConfig};

mod ring;
use ring::{HotBuffer, HotGuard, LockPair, StreamRing};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantileValue {
    pub quantile: f64,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummarySnapshot {
    pub sample_count: u64,
    pub sample_sum: f64,
    pub quantiles: Vec<QuantileValue>,
}

struct SummaryShared {
    // sorted by quantile, ties kept in declaration order
    objectives: Box<[Objective]>,
    max_age: Duration,
    age_buckets: usize,
    buf_cap: usize,
    stream_duration: Duration,
    label_names: Vec<LabelName>,
    suppress_initial_value: bool,
}

/// Sliding time window summary with targeted quantiles.
///
/// Observations stay relevant for `max_age`. The window is split into
/// `age_buckets` streams, and the oldest one is replaced each
/// `max_age / age_buckets` period, so the reported quantiles cover something
/// between `max_age - max_age / age_buckets` and `max_age` of data.
pub struct Summary {
    shared: Arc<SummaryShared>,
    unlabelled: SummaryChild,
}

impl Summary {
    pub fn new(config: &SummaryConfig) -> Result<Self, ConfigError> {
        Summary::new_at(config, Instant::now())
    }

    pub fn new_at(config: &SummaryConfig, now: Instant) -> Result<Self, ConfigError> {
        config.check_label_names()?;

        let max_age = if config.max_age().is_zero() {
            debug!("zero summary max age, use default value {DEFAULT_MAX_AGE}");
            DEFAULT_MAX_AGE
        } else {
            config.max_age()
        };
        let max_age = max_age
            .to_std()
            .map_err(|_| ConfigError::NegativeMaxAge(max_age))?;

        let mut objectives = if config.objectives().is_empty() {
            debug!("no summary objectives set, use the default ones");
            DEFAULT_OBJECTIVES.to_vec()
        } else {
            config.objectives().to_vec()
        };
        objectives.sort_by(|a, b| a.quantile().total_cmp(&b.quantile()));

        let age_buckets = match config.age_buckets() {
            0 => DEFAULT_AGE_BUCKETS,
            n => n,
        };
        let buf_cap = match config.buf_cap() {
            0 => DEFAULT_BUF_CAP,
            n => n,
        };
        let stream_duration = max_age / age_buckets;
        if stream_duration.is_zero() {
            return Err(ConfigError::MaxAgeTooSmall(max_age, age_buckets));
        }

        let shared = Arc::new(SummaryShared {
            objectives: objectives.into_boxed_slice(),
            max_age,
            age_buckets: age_buckets as usize,
            buf_cap,
            stream_duration,
            label_names: config.label_names().to_vec(),
            suppress_initial_value: config.suppress_initial_value(),
        });
        let unlabelled = SummaryChild::new(Arc::clone(&shared), now);
        Ok(Summary { shared, unlabelled })
    }

    pub fn new_child(&self) -> SummaryChild {
        self.new_child_at(Instant::now())
    }

    pub fn new_child_at(&self, now: Instant) -> SummaryChild {
        SummaryChild::new(Arc::clone(&self.shared), now)
    }

    #[inline]
    pub fn unlabelled(&self) -> &SummaryChild {
        &self.unlabelled
    }

    /// The objectives in ascending quantile order.
    #[inline]
    pub fn objectives(&self) -> &[Objective] {
        &self.shared.objectives
    }

    #[inline]
    pub fn max_age(&self) -> Duration {
        self.shared.max_age
    }

    #[inline]
    pub fn age_buckets(&self) -> usize {
        self.shared.age_buckets
    }

    #[inline]
    pub fn buf_cap(&self) -> usize {
        self.shared.buf_cap
    }

    #[inline]
    pub fn stream_duration(&self) -> Duration {
        self.shared.stream_duration
    }

    #[inline]
    pub fn label_names(&self) -> &[LabelName] {
        &self.shared.label_names
    }

    #[inline]
    pub fn observe(&self, v: f64) {
        self.unlabelled.observe(v);
    }

    #[inline]
    pub fn publish(&self) {
        self.unlabelled.publish();
    }
}

/// Per label combination state of a summary.
///
/// The hot buffer is always locked before the stream ring, see [`LockPair`].
pub struct SummaryChild {
    shared: Arc<SummaryShared>,
    locks: LockPair,
    published: AtomicBool,
}

impl SummaryChild {
    fn new(shared: Arc<SummaryShared>, now: Instant) -> Self {
        let expires = now + shared.stream_duration;
        let hot = HotBuffer {
            buf: SampleBuffer::new(shared.buf_cap),
            expires,
        };
        let ring = StreamRing::new(
            &shared.objectives,
            shared.age_buckets,
            shared.buf_cap,
            expires,
        );
        let published = AtomicBool::new(!shared.suppress_initial_value);
        SummaryChild {
            shared,
            locks: LockPair::new(hot, ring),
            published,
        }
    }

    #[inline]
    pub fn observe(&self, v: f64) {
        self.observe_at(v, Instant::now());
    }

    pub fn observe_at(&self, v: f64, now: Instant) {
        if v.is_nan() {
            return;
        }

        let mut hot = self.locks.lock();
        if now > hot.expires {
            self.flush(&mut hot, now);
        }
        hot.buf.append(v);
        if hot.buf.is_full() {
            self.flush(&mut hot, now);
        }
        drop(hot);

        self.published.store(true, Ordering::Relaxed);
    }

    fn flush(&self, hot: &mut HotGuard<'_>, now: Instant) {
        let mut state = hot.lock_state();
        state.flush(hot, now, self.shared.stream_duration);
    }

    /// Mark this instance as having data to export even without observations.
    #[inline]
    pub fn publish(&self) {
        self.published.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_published(&self) -> bool {
        self.published.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn snapshot(&self) -> SummarySnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> SummarySnapshot {
        let mut hot = self.locks.lock();
        let mut state = hot.lock_state();

        // swap even if the hot buffer is empty to set a new expiry
        state.flush(&mut hot, now, self.shared.stream_duration);

        let quantiles = self
            .shared
            .objectives
            .iter()
            .map(|o| QuantileValue {
                quantile: o.quantile(),
                value: state.query_head(o.quantile()),
            })
            .collect();
        SummarySnapshot {
            sample_count: state.count,
            sample_sum: state.sum,
            quantiles,
        }
    }
}

impl Metric for SummaryChild {
    fn metric_type(&self) -> MetricType {
        MetricType::Summary
    }

    fn observe(&self, value: f64) {
        SummaryChild::observe(self, value);
    }

    fn populate(&self, now: Instant) -> MetricData {
        MetricData::Summary(self.snapshot_at(now))
    }

    fn is_published(&self) -> bool {
        SummaryChild::is_published(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::str::FromStr;
    use std::thread;

    use crate::{Histogram, HistogramConfig};

    fn summary(max_age: Duration, age_buckets: u32, buf_cap: usize) -> Summary {
        let mut config = SummaryConfig::default();
        config.set_max_age(TimeDelta::from_std(max_age).unwrap());
        config.set_age_buckets(age_buckets);
        config.set_buf_cap(buf_cap);
        Summary::new(&config).unwrap()
    }

    fn values(snap: &SummarySnapshot) -> Vec<f64> {
        snap.quantiles.iter().map(|q| q.value).collect()
    }

    #[test]
    fn defaults() {
        let mut config = SummaryConfig::default();
        config.set_objectives(Vec::new());
        config.set_max_age(TimeDelta::zero());
        config.set_age_buckets(0);
        config.set_buf_cap(0);
        let s = Summary::new(&config).unwrap();
        assert_eq!(s.objectives(), &DEFAULT_OBJECTIVES);
        assert_eq!(s.max_age(), Duration::from_secs(600));
        assert_eq!(s.age_buckets(), 5);
        assert_eq!(s.buf_cap(), 500);
        assert_eq!(s.stream_duration(), Duration::from_secs(120));
        assert!(s.unlabelled().is_published());
    }

    #[test]
    fn construct_err() {
        let mut config = SummaryConfig::default();
        config.set_max_age(TimeDelta::seconds(-1));
        assert_eq!(
            Summary::new(&config).err(),
            Some(ConfigError::NegativeMaxAge(TimeDelta::seconds(-1)))
        );

        let mut config = SummaryConfig::default();
        config.set_label_names(vec![LabelName::from_str("quantile").unwrap()]);
        assert_eq!(
            Summary::new(&config).err(),
            Some(ConfigError::ReservedLabel("quantile"))
        );

        let mut config = SummaryConfig::default();
        config.set_max_age(TimeDelta::nanoseconds(3));
        assert!(matches!(
            Summary::new(&config),
            Err(ConfigError::MaxAgeTooSmall(_, 5))
        ));
    }

    #[test]
    fn objectives_sorted() {
        let mut config = SummaryConfig::default();
        config.set_objectives(vec![
            Objective::P99,
            Objective::new(0.5, 0.01).unwrap(),
            Objective::P90,
            Objective::P50,
        ]);
        let s = Summary::new(&config).unwrap();
        let quantiles: Vec<f64> = s.objectives().iter().map(|o| o.quantile()).collect();
        assert_eq!(quantiles, vec![0.5, 0.5, 0.9, 0.99]);
        // ties stay in declaration order
        assert_eq!(s.objectives()[0].epsilon(), 0.01);
        assert_eq!(s.objectives()[1].epsilon(), 0.05);

        let snap = s.unlabelled().snapshot();
        let quantiles: Vec<f64> = snap.quantiles.iter().map(|q| q.quantile).collect();
        assert_eq!(quantiles, vec![0.5, 0.5, 0.9, 0.99]);
    }

    #[test]
    fn exact_quantiles() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(60), 5, 10);
        let child = s.new_child_at(t0);
        for i in 1..=100 {
            child.observe_at(i as f64, t0);
        }
        let snap = child.snapshot_at(t0);
        assert_eq!(snap.sample_count, 100);
        assert_eq!(snap.sample_sum, 5050.0);
        assert_eq!(values(&snap), vec![50.0, 90.0, 99.0]);
    }

    #[test]
    fn empty_snapshot() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(60), 5, 10);
        let child = s.new_child_at(t0);
        let snap = child.snapshot_at(t0);
        assert_eq!(snap.sample_count, 0);
        assert_eq!(snap.sample_sum, 0.0);
        assert_eq!(snap.quantiles.len(), 3);
        assert!(snap.quantiles.iter().all(|q| q.value.is_nan()));
    }

    #[test]
    fn buffer_full_flush() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(60), 5, 10);
        let child = s.new_child_at(t0);

        for i in 0..9 {
            child.observe_at(i as f64, t0);
        }
        {
            let hot = child.locks.lock();
            assert_eq!(hot.buf.len(), 9);
            let state = hot.lock_state();
            assert_eq!(state.count, 0);
        }

        child.observe_at(9.0, t0);
        {
            let hot = child.locks.lock();
            assert!(hot.buf.is_empty());
            let state = hot.lock_state();
            assert!(state.cold.is_empty());
            assert_eq!(state.count, 10);
            assert_eq!(state.sum, 45.0);
            assert_eq!(state.stream_counts(), vec![10; 5]);
        }
    }

    #[test]
    fn window_expired() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(1), 1, 10);
        let child = s.new_child_at(t0);
        for v in [1.0, 2.0, 3.0] {
            child.observe_at(v, t0);
        }

        let snap = child.snapshot_at(t0 + Duration::from_secs(2));
        assert!(snap.quantiles.iter().all(|q| q.value.is_nan()));
        assert_eq!(snap.sample_count, 3);
        assert_eq!(snap.sample_sum, 6.0);
    }

    #[test]
    fn sliding_window() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(10), 5, 500);
        let child = s.new_child_at(t0);
        for i in 1..=10 {
            child.observe_at(i as f64, t0);
        }

        let snap = child.snapshot_at(t0 + Duration::from_secs(1));
        assert_eq!(snap.quantiles[0].value, 5.0);

        // still inside max age
        let snap = child.snapshot_at(t0 + Duration::from_secs(10));
        assert_eq!(snap.quantiles[0].value, 5.0);

        let snap = child.snapshot_at(t0 + Duration::from_millis(10_001));
        assert!(snap.quantiles[0].value.is_nan());
        assert_eq!(snap.sample_count, 10);
    }

    #[test]
    fn sliding_window_mixed() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(10), 5, 500);
        let child = s.new_child_at(t0);
        for i in 1..=10 {
            child.observe_at(i as f64, t0);
        }
        for i in 100..=110 {
            child.observe_at(i as f64, t0 + Duration::from_secs(5));
        }

        // both batches are inside the window
        let snap = child.snapshot_at(t0 + Duration::from_secs(9));
        assert_eq!(snap.sample_count, 21);
        assert_eq!(snap.quantiles[0].value, 100.0);

        // only the second batch is left
        let snap = child.snapshot_at(t0 + Duration::from_secs(11));
        assert_eq!(snap.sample_count, 21);
        assert_eq!(snap.quantiles[0].value, 105.0);
    }

    #[test]
    fn long_idle_gap() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(3), 3, 10);
        let child = s.new_child_at(t0);
        child.observe_at(1.0, t0);

        let t1 = t0 + Duration::from_secs(3600);
        let snap = child.snapshot_at(t1);
        assert!(snap.quantiles.iter().all(|q| q.value.is_nan()));

        child.observe_at(2.0, t1);
        let snap = child.snapshot_at(t1);
        assert_eq!(values(&snap), vec![2.0, 2.0, 2.0]);
        assert_eq!(snap.sample_count, 2);
        assert_eq!(snap.sample_sum, 3.0);
    }

    #[test]
    fn accuracy_after_rotation() {
        let t0 = Instant::now();
        let s = summary(Duration::from_secs(3), 3, 500);
        let child = s.new_child_at(t0);
        for i in 0..2000 {
            child.observe_at(1e6 + i as f64, t0);
        }

        // descending input into a freshly rotated stream
        let t1 = t0 + Duration::from_millis(1500);
        for i in (1..=20_000).rev() {
            child.observe_at(i as f64, t1);
        }

        // the two streams holding the early values are rotated out
        let snap = child.snapshot_at(t0 + Duration::from_millis(3500));
        assert_eq!(snap.sample_count, 22_000);
        for (q, o) in snap.quantiles.iter().zip(s.objectives()) {
            let expected = o.quantile() * 20_000.0;
            let allowed = o.epsilon() * 20_000.0 + 1.0;
            assert!(
                (q.value - expected).abs() <= allowed,
                "quantile {} got {}",
                q.quantile,
                q.value
            );
        }
    }

    #[test]
    fn nan_ignored() {
        let t0 = Instant::now();
        let mut config = SummaryConfig::default();
        config.set_suppress_initial_value(true);
        let s = Summary::new(&config).unwrap();
        let child = s.new_child_at(t0);

        child.observe_at(f64::NAN, t0);
        assert!(!child.is_published());
        {
            let hot = child.locks.lock();
            assert!(hot.buf.is_empty());
        }
        let snap = child.snapshot_at(t0);
        assert_eq!(snap.sample_count, 0);
        assert_eq!(snap.sample_sum, 0.0);
        assert!(!child.is_published());

        child.observe_at(1.0, t0);
        assert!(child.is_published());
    }

    #[test]
    fn publish_flag() {
        let mut config = SummaryConfig::default();
        config.set_suppress_initial_value(true);
        let s = Summary::new(&config).unwrap();
        assert!(!s.unlabelled().is_published());
        s.publish();
        assert!(s.unlabelled().is_published());
        assert!(!s.new_child().is_published());

        s.observe(0.5);
        assert_eq!(s.unlabelled().snapshot().sample_count, 1);
    }

    #[test]
    fn concurrent_observe() {
        const THREADS: usize = 8;
        const ROUNDS: usize = 5000;

        let t0 = Instant::now();
        let s = summary(Duration::from_secs(60), 5, 64);
        let child = s.new_child_at(t0);
        thread::scope(|scope| {
            for t in 0..THREADS {
                let child = &child;
                scope.spawn(move || {
                    for i in 0..ROUNDS {
                        let now = t0 + Duration::from_millis((i / 100) as u64);
                        child.observe_at(((t + i) % 10) as f64, now);
                    }
                });
            }
            let child = &child;
            scope.spawn(move || {
                for i in 0..100 {
                    let snap = child.snapshot_at(t0 + Duration::from_millis(i));
                    assert!(snap.sample_count <= (THREADS * ROUNDS) as u64);
                }
            });
        });

        let snap = child.snapshot_at(t0 + Duration::from_secs(1));
        assert_eq!(snap.sample_count, (THREADS * ROUNDS) as u64);
        // each thread observes 0 ..= 9 five hundred times
        assert_eq!(snap.sample_sum, 45.0 * 500.0 * THREADS as f64);
        assert!(snap.quantiles.iter().all(|q| (0.0..=9.0).contains(&q.value)));
    }

    #[test]
    fn metric_kinds() {
        let t0 = Instant::now();
        let h = Histogram::new(&HistogramConfig::default()).unwrap();
        let s = Summary::new_at(&SummaryConfig::default(), t0).unwrap();
        let metrics: Vec<Box<dyn Metric>> =
            vec![Box::new(h.new_child()), Box::new(s.new_child_at(t0))];

        for m in &metrics {
            m.observe(0.3);
            m.observe(f64::NAN);
        }
        let data: Vec<MetricData> = metrics.iter().map(|m| m.populate(t0)).collect();
        assert_eq!(data[0].metric_type(), MetricType::Histogram);
        assert_eq!(data[1].metric_type(), MetricType::Summary);
        for d in &data {
            assert_eq!(d.sample_count(), 1);
            assert_eq!(d.sample_sum(), 0.3);
        }
        assert_eq!(metrics[1].metric_type().to_string(), "summary");
        match &data[1] {
            MetricData::Summary(snap) => assert_eq!(values(snap), vec![0.3, 0.3, 0.3]),
            MetricData::Histogram(_) => unreachable!(),
        }
    }
}
