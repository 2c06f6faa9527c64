//! Simple Moving Average indicator.
//!
//! O(n) sliding window over closes.
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) points are `None`.
//!
//! The window sum is Kahan-compensated. A window holding a single repeated
//! close yields that close exactly, so averages of a flat run compare equal
//! whatever their length.

use crate::domain::indicator::SmaSeries;
use crate::domain::price::PricePoint;

#[derive(Debug, Default)]
struct RunningMean {
    count: usize,
    sum: f64,
    compensation: f64,
    same_run: usize,
    last: f64,
}

impl RunningMean {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.accumulate(value);
        if self.same_run > 0 && value == self.last {
            self.same_run += 1;
        } else {
            self.same_run = 1;
        }
        self.last = value;
    }

    fn remove(&mut self, value: f64) {
        self.count -= 1;
        self.accumulate(-value);
    }

    fn accumulate(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    fn mean(&self) -> f64 {
        if self.same_run >= self.count {
            self.last
        } else {
            self.sum / self.count as f64
        }
    }
}

pub fn calculate_sma(points: &[PricePoint], window: usize) -> SmaSeries {
    if window == 0 {
        return SmaSeries {
            window,
            values: vec![None; points.len()],
        };
    }

    let mut values = Vec::with_capacity(points.len());
    let mut running = RunningMean::default();

    for (i, point) in points.iter().enumerate() {
        if i >= window {
            running.remove(points[i - window].close);
        }
        running.add(point.close);

        let value = if i + 1 >= window {
            Some(running.mean())
        } else {
            None
        };
        values.push(value);
    }

    SmaSeries { window, values }
}
