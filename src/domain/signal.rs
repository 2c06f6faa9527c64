//! Crossover signal generation.
//!
//! Each row carries four raw flags evaluated independently of one another
//! and of any position state:
//!
//! - buy: `SMA(buy.fast) > SMA(buy.slow)`
//! - sell: `SMA(sell.fast) < SMA(sell.slow)`
//! - close_buy: `SMA(close_buy.fast)` crosses below `SMA(close_buy.slow)`
//! - close_sell: `SMA(close_sell.fast)` crosses below `SMA(close_sell.slow)`
//!
//! A crossover needs `index >= 1` and the previous point strictly on the
//! other side. Any comparison touching an undefined average is false.

use crate::domain::error::MacrossError;
use crate::domain::indicator::{MovingAverageSet, SmaSeries};
use crate::domain::series::Series;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPair {
    pub fast: usize,
    pub slow: usize,
}

impl WindowPair {
    pub const fn new(fast: usize, slow: usize) -> Self {
        Self { fast, slow }
    }
}

impl fmt::Display for WindowPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMA({})/SMA({})", self.fast, self.slow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRules {
    pub buy: WindowPair,
    pub sell: WindowPair,
    pub close_buy: WindowPair,
    pub close_sell: WindowPair,
}

impl Default for SignalRules {
    fn default() -> Self {
        SignalRules {
            buy: WindowPair::new(50, 500),
            sell: WindowPair::new(20, 200),
            close_buy: WindowPair::new(10, 20),
            close_sell: WindowPair::new(5, 10),
        }
    }
}

impl SignalRules {
    /// Distinct windows the rules read, ascending.
    pub fn windows(&self) -> Vec<usize> {
        let mut windows = vec![
            self.buy.fast,
            self.buy.slow,
            self.sell.fast,
            self.sell.slow,
            self.close_buy.fast,
            self.close_buy.slow,
            self.close_sell.fast,
            self.close_sell.slow,
        ];
        windows.sort_unstable();
        windows.dedup();
        windows
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub close: f64,
    pub buy_signal: bool,
    pub sell_signal: bool,
    pub close_buy: bool,
    pub close_sell: bool,
}

impl SignalRow {
    pub fn any(&self) -> bool {
        self.buy_signal || self.sell_signal || self.close_buy || self.close_sell
    }
}

struct Legs<'a> {
    fast: &'a SmaSeries,
    slow: &'a SmaSeries,
}

impl<'a> Legs<'a> {
    fn resolve(averages: &'a MovingAverageSet, pair: WindowPair) -> Result<Self, MacrossError> {
        let lookup = |window: usize| {
            averages
                .get(window)
                .ok_or(MacrossError::MissingAverage { window })
        };
        Ok(Legs {
            fast: lookup(pair.fast)?,
            slow: lookup(pair.slow)?,
        })
    }

    fn above(&self, index: usize) -> bool {
        match (self.fast.get(index), self.slow.get(index)) {
            (Some(fast), Some(slow)) => fast > slow,
            _ => false,
        }
    }

    fn below(&self, index: usize) -> bool {
        match (self.fast.get(index), self.slow.get(index)) {
            (Some(fast), Some(slow)) => fast < slow,
            _ => false,
        }
    }

    fn crosses_below(&self, index: usize) -> bool {
        index > 0 && self.below(index) && self.above(index - 1)
    }
}

/// Evaluate the rules against averages that were computed beforehand.
pub fn generate_signals(
    series: &Series,
    averages: &MovingAverageSet,
    rules: &SignalRules,
) -> Result<Vec<SignalRow>, MacrossError> {
    let buy = Legs::resolve(averages, rules.buy)?;
    let sell = Legs::resolve(averages, rules.sell)?;
    let close_buy = Legs::resolve(averages, rules.close_buy)?;
    let close_sell = Legs::resolve(averages, rules.close_sell)?;

    let rows = series
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| SignalRow {
            date: point.date,
            close: point.close,
            buy_signal: buy.above(i),
            sell_signal: sell.below(i),
            close_buy: close_buy.crosses_below(i),
            close_sell: close_sell.crosses_below(i),
        })
        .collect();

    Ok(rows)
}

/// Compute the averages the rules need, then evaluate them.
pub fn generate_signals_for(
    series: &Series,
    rules: &SignalRules,
) -> Result<(MovingAverageSet, Vec<SignalRow>), MacrossError> {
    let averages = MovingAverageSet::compute(series, &rules.windows());
    let rows = generate_signals(series, &averages, rules)?;
    Ok((averages, rows))
}
