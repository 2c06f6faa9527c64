//! Open positions and closed trades.

use crate::domain::price::PricePoint;
use chrono::NaiveDate;

/// Units bought per entry unless configured otherwise.
pub const DEFAULT_QUANTITY: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub quantity: u32,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn open(at: &PricePoint, quantity: u32) -> Self {
        Self {
            quantity,
            entry_price: at.close,
            entry_date: at.date,
        }
    }

    /// Consume the position, realizing its P/L against `at`.
    pub fn close(self, symbol: &str, at: &PricePoint) -> ClosedTrade {
        ClosedTrade {
            symbol: symbol.to_string(),
            quantity: self.quantity,
            entry_price: self.entry_price,
            exit_price: at.close,
            entry_date: self.entry_date,
            exit_date: at.date,
            pnl: at.pnl_from(self.entry_price, self.quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub quantity: u32,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub pnl: f64,
}

impl ClosedTrade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), close)
    }

    fn sample_position() -> Position {
        Position::open(&point(15, 50.0), DEFAULT_QUANTITY)
    }

    #[test]
    fn open_takes_close_and_date() {
        let pos = sample_position();
        assert_eq!(pos.quantity, 100);
        assert!((pos.entry_price - 50.0).abs() < f64::EPSILON);
        assert_eq!(pos.entry_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn close_realizes_pnl() {
        let trade = sample_position().close("BHP", &point(20, 55.0));

        assert_eq!(trade.symbol, "BHP");
        assert_eq!(trade.quantity, 100);
        assert!((trade.entry_price - 50.0).abs() < f64::EPSILON);
        assert!((trade.exit_price - 55.0).abs() < f64::EPSILON);
        assert!((trade.pnl - 500.0).abs() < f64::EPSILON);
        assert_eq!(trade.holding_days(), 5);
    }

    #[test]
    fn close_at_loss() {
        let trade = sample_position().close("BHP", &point(16, 47.5));
        assert!((trade.pnl - (-250.0)).abs() < f64::EPSILON);
    }
}
