use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::HpHistoryConfig;

/// One polled HP reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HpSample {
    pub hp_percent: i32,
    pub at: Instant,
}

/// Bounded, time-windowed HP samples in chronological order.
///
/// Samples older than the window are pruned on every append, then the oldest
/// samples are evicted until the length fits the capacity.
#[derive(Clone, Debug)]
pub struct HpHistory {
    samples: VecDeque<HpSample>,
    capacity: usize,
    window: Duration,
}

impl HpHistory {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(256)),
            capacity: capacity.max(1),
            window,
        }
    }

    pub fn from_config(config: &HpHistoryConfig) -> Self {
        Self::new(config.capacity, config.window())
    }

    pub fn record(&mut self, hp_percent: i32, now: Instant) {
        self.samples.push_back(HpSample { hp_percent, at: now });

        while self
            .samples
            .front()
            .is_some_and(|oldest| now.saturating_duration_since(oldest.at) > self.window)
        {
            self.samples.pop_front();
        }
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn samples(&self) -> impl ExactSizeIterator<Item = &HpSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<HpSample> {
        self.samples.back().copied()
    }

    /// True when HP fell by at least `threshold` percent within `window`.
    ///
    /// Compares the highest reading inside the window against the latest one.
    pub fn has_damage_spike(&self, threshold: i32, window: Duration, now: Instant) -> bool {
        let Some(latest) = self.latest() else {
            return false;
        };
        let peak = self
            .samples
            .iter()
            .filter(|sample| now.saturating_duration_since(sample.at) <= window)
            .map(|sample| sample.hp_percent)
            .max()
            .unwrap_or(latest.hp_percent);
        peak - latest.hp_percent >= threshold
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(5);

    #[test]
    fn keeps_recent_samples_in_order() {
        let start = Instant::now();
        let mut history = HpHistory::new(100, WINDOW);
        for (i, hp) in [100, 90, 95, 80].into_iter().enumerate() {
            history.record(hp, start + Duration::from_millis(500 * i as u64));
        }
        let hps: Vec<_> = history.samples().map(|s| s.hp_percent).collect();
        assert_eq!(hps, vec![100, 90, 95, 80]);
    }

    #[test]
    fn prunes_samples_older_than_window() {
        let start = Instant::now();
        let mut history = HpHistory::new(100, WINDOW);
        history.record(100, start);
        history.record(90, start + Duration::from_secs(3));
        history.record(80, start + Duration::from_millis(5_001));

        let hps: Vec<_> = history.samples().map(|s| s.hp_percent).collect();
        assert_eq!(hps, vec![90, 80]);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let start = Instant::now();
        let mut history = HpHistory::new(3, WINDOW);
        for i in 0..5 {
            history.record(100 - i, start + Duration::from_millis(10 * i as u64));
            assert!(history.len() <= 3);
        }
        let hps: Vec<_> = history.samples().map(|s| s.hp_percent).collect();
        assert_eq!(hps, vec![98, 97, 96]);
    }

    #[test]
    fn spike_within_window() {
        let start = Instant::now();
        let mut history = HpHistory::new(100, WINDOW);
        history.record(80, start);
        history.record(60, start + Duration::from_secs(1));

        let now = start + Duration::from_secs(1);
        assert!(history.has_damage_spike(15, Duration::from_millis(2000), now));
        assert!(!history.has_damage_spike(25, Duration::from_millis(2000), now));
    }

    #[test]
    fn slow_bleed_is_not_a_spike() {
        let start = Instant::now();
        let mut history = HpHistory::new(100, WINDOW);
        history.record(80, start);
        history.record(60, start + Duration::from_secs(3));

        let now = start + Duration::from_secs(3);
        assert!(!history.has_damage_spike(15, Duration::from_millis(2000), now));
    }

    #[test]
    fn empty_history_has_no_spike() {
        let history = HpHistory::new(10, WINDOW);
        assert!(!history.has_damage_spike(1, WINDOW, Instant::now()));
    }
}
