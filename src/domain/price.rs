//! Daily closing price representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// Realized value of moving `quantity` units from `entry` to this close.
    pub fn pnl_from(&self, entry: f64, quantity: u32) -> f64 {
        (self.close - entry) * quantity as f64
    }
}
