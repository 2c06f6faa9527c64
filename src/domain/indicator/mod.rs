//! Moving-average indicator types.
//!
//! - `SmaSeries`: one simple moving average aligned index-for-index with a series
//! - `MovingAverageSet`: every average computed for a series, keyed by window
//!
//! Insufficient history is `None`, never a sentinel number.

pub mod sma;

use crate::domain::series::Series;
use std::collections::BTreeMap;
use std::fmt;

/// Windows required by the reference crossover rules.
pub const DEFAULT_WINDOWS: [usize; 6] = [5, 10, 20, 50, 200, 500];

#[derive(Debug, Clone, PartialEq)]
pub struct SmaSeries {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

impl SmaSeries {
    /// Value at `index`, `None` when out of range or still warming up.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl fmt::Display for SmaSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMA({})", self.window)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovingAverageSet {
    averages: BTreeMap<usize, SmaSeries>,
}

impl MovingAverageSet {
    /// Compute one average per distinct window.
    pub fn compute(series: &Series, windows: &[usize]) -> Self {
        let mut set = Self::default();
        for &window in windows {
            if !set.averages.contains_key(&window) {
                set.insert(sma::calculate_sma(&series.points, window));
            }
        }
        set
    }

    pub fn insert(&mut self, average: SmaSeries) {
        self.averages.insert(average.window, average);
    }

    pub fn get(&self, window: usize) -> Option<&SmaSeries> {
        self.averages.get(&window)
    }

    pub fn windows(&self) -> impl Iterator<Item = usize> + '_ {
        self.averages.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use chrono::NaiveDate;

    fn make_series(closes: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + chrono::Duration::days(i as i64), c))
            .collect();
        Series::new("TEST".into(), points)
    }

    #[test]
    fn sma_series_display() {
        let s = SmaSeries {
            window: 20,
            values: vec![],
        };
        assert_eq!(s.to_string(), "SMA(20)");
    }

    #[test]
    fn sma_series_get_out_of_range_is_none() {
        let s = SmaSeries {
            window: 1,
            values: vec![Some(1.0), None],
        };
        assert_eq!(s.get(0), Some(1.0));
        assert_eq!(s.get(1), None);
        assert_eq!(s.get(5), None);
        assert_eq!(s.defined_count(), 1);
    }

    #[test]
    fn compute_default_windows() {
        let series = make_series(&[1.0; 30]);
        let set = MovingAverageSet::compute(&series, &DEFAULT_WINDOWS);

        assert_eq!(set.len(), 6);
        assert_eq!(set.windows().collect::<Vec<_>>(), vec![5, 10, 20, 50, 200, 500]);
        for w in DEFAULT_WINDOWS {
            assert_eq!(set.get(w).unwrap().len(), 30);
        }
        assert_eq!(set.get(20).unwrap().defined_count(), 11);
        assert_eq!(set.get(50).unwrap().defined_count(), 0);
    }

    #[test]
    fn compute_collapses_duplicate_windows() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let set = MovingAverageSet::compute(&series, &[2, 2, 3]);
        assert_eq!(set.len(), 2);
        assert!(set.get(7).is_none());
    }
}
