//! Rolling sample history backing the trend charts.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::risk::Vitals;

/// Manual-mode history cap; oldest samples are evicted beyond this.
pub const MANUAL_CAPACITY: usize = 100;

/// One recorded time point. Immutable once created; `risk` is always the
/// score of this sample's own vitals, never of a neighbour's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub map: f64,
    pub co: f64,
    pub svv: f64,
    pub pvv: f64,
    pub risk: f64,
}

impl Sample {
    pub fn new(time: f64, vitals: Vitals, risk: f64) -> Self {
        Sample {
            time,
            map: vitals.map,
            co: vitals.co,
            svv: vitals.svv,
            pvv: vitals.pvv,
            risk,
        }
    }
}

/// Insertion-ordered sample history.
///
/// The manual path appends through [`push_bounded`](Self::push_bounded) and
/// stays capped at [`MANUAL_CAPACITY`]; the automatic path rebuilds the whole
/// store each tick through [`replace`](Self::replace) and is unbounded by
/// design (it holds everything replayed so far, not a sliding window).
#[derive(Debug, Default, Clone)]
pub struct SeriesStore {
    samples: VecDeque<Sample>,
}

impl SeriesStore {
    pub fn new() -> Self {
        SeriesStore {
            samples: VecDeque::with_capacity(MANUAL_CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Append with FIFO eviction at [`MANUAL_CAPACITY`].
    pub fn push_bounded(&mut self, sample: Sample) {
        debug_assert!(
            self.samples.back().map_or(true, |s| sample.time >= s.time),
            "sample times must be non-decreasing"
        );
        if self.samples.len() >= MANUAL_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Replace the whole history, automatic-mode style.
    pub fn replace(&mut self, samples: impl IntoIterator<Item = Sample>) {
        self.samples.clear();
        self.samples.extend(samples);
    }

    pub fn risk_history(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.risk).collect()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Samples whose risk is a usable number.
    pub fn scored_len(&self) -> usize {
        self.samples.iter().filter(|s| s.risk.is_finite()).count()
    }

    /// Rewrite trailing non-finite scores with `risk`.
    ///
    /// A malformed source row can carry NaN vitals through to its score;
    /// the update loop repairs those with the freshly computed value so the
    /// risk history always matches the sample count.
    pub fn repair_tail_risk(&mut self, risk: f64) {
        for sample in self.samples.iter_mut().rev() {
            if sample.risk.is_finite() {
                break;
            }
            sample.risk = risk;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, risk: f64) -> Sample {
        Sample::new(time, Vitals::default(), risk)
    }

    #[test]
    fn push_bounded_evicts_oldest_first() {
        let mut store = SeriesStore::new();
        for i in 0..105 {
            store.push_bounded(sample(i as f64 * 0.1, 50.0));
        }
        assert_eq!(store.len(), MANUAL_CAPACITY);
        // Samples 0..=4 evicted; the oldest retained is the 6th push.
        assert!((store.first().unwrap().time - 0.5).abs() < 1e-9);
        assert!((store.last().unwrap().time - 10.4).abs() < 1e-9);
    }

    #[test]
    fn replace_is_wholesale_and_unbounded() {
        let mut store = SeriesStore::new();
        store.push_bounded(sample(0.0, 10.0));
        store.replace((0..250).map(|i| sample(i as f64, 20.0)));
        assert_eq!(store.len(), 250);
        assert!((store.first().unwrap().time - 0.0).abs() < 1e-9);
    }

    #[test]
    fn repair_tail_risk_only_touches_trailing_nans() {
        let mut store = SeriesStore::new();
        store.replace([sample(0.0, 30.0), sample(1.0, f64::NAN), sample(2.0, f64::NAN)]);
        assert_eq!(store.scored_len(), 1);
        store.repair_tail_risk(46.5);
        assert_eq!(store.scored_len(), 3);
        let risks = store.risk_history();
        assert_eq!(risks[0], 30.0);
        assert_eq!(risks[1], 46.5);
        assert_eq!(risks[2], 46.5);
    }

    #[test]
    fn times_are_non_decreasing_after_manual_appends() {
        let mut store = SeriesStore::new();
        for i in 0..20 {
            store.push_bounded(sample(i as f64 * 0.1, 40.0));
        }
        let times = store.times();
        assert!(times.windows(2).all(|w| w[1] >= w[0]));
    }
}
