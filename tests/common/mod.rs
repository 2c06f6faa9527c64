#![allow(dead_code)]

use chrono::NaiveDate;
use macross::domain::backtest::BacktestConfig;
use macross::domain::error::MacrossError;
use macross::domain::ledger::LedgerConfig;
use macross::domain::price::PricePoint;
use macross::domain::series::Series;
use macross::domain::signal::{SignalRules, WindowPair};
use macross::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.data.insert(symbol.to_string(), make_points(closes));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str) -> Result<Series, MacrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MacrossError::DataSource {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(points) => Ok(Series::new(symbol.to_string(), points.clone())),
            None => Err(MacrossError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, MacrossError> {
        let mut symbols: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One point per close on consecutive days from 2020-01-01.
pub fn make_points(closes: &[f64]) -> Vec<PricePoint> {
    let start = date(2020, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(start + chrono::Duration::days(i as i64), c))
        .collect()
}

pub fn make_series(symbol: &str, closes: &[f64]) -> Series {
    Series::new(symbol.to_string(), make_points(closes))
}

/// Closes 1, 2, ..., n.
pub fn rising_closes(n: usize) -> Vec<f64> {
    (1..=n).map(|i| i as f64).collect()
}

/// Every rule on the same fast/slow pair.
pub fn uniform_rules(fast: usize, slow: usize) -> SignalRules {
    let pair = WindowPair::new(fast, slow);
    SignalRules {
        buy: pair,
        sell: pair,
        close_buy: pair,
        close_sell: pair,
    }
}

pub fn small_config(fast: usize, slow: usize) -> BacktestConfig {
    BacktestConfig {
        rules: uniform_rules(fast, slow),
        ledger: LedgerConfig::default(),
        jobs: 0,
    }
}

/// Writes `Date,Close` CSV for each symbol into `dir`.
pub fn write_csv(dir: &std::path::Path, symbol: &str, closes: &[f64]) {
    let mut content = String::from("Date,Close\n");
    for p in make_points(closes) {
        content.push_str(&format!("{},{}\n", p.date, p.close));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
