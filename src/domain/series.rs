//! Per-symbol price series.
//!
//! Points are kept in the order they were supplied. Nothing here sorts;
//! [`Series::validate`] rejects input whose dates do not strictly increase.

use crate::domain::error::MacrossError;
use crate::domain::price::PricePoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl Series {
    pub fn new(symbol: String, points: Vec<PricePoint>) -> Self {
        Self { symbol, points }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol.into(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fail-fast precondition check: strictly increasing dates, finite closes.
    pub fn validate(&self) -> Result<(), MacrossError> {
        for (row, point) in self.points.iter().enumerate() {
            if !point.close.is_finite() {
                return Err(MacrossError::MalformedInput {
                    symbol: self.symbol.clone(),
                    row,
                    reason: format!("close {} is not a finite number", point.close),
                });
            }
            if row > 0 {
                let prev = self.points[row - 1].date;
                if point.date <= prev {
                    return Err(MacrossError::MalformedInput {
                        symbol: self.symbol.clone(),
                        row,
                        reason: format!("date {} does not follow {}", point.date, prev),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(date: &str, close: f64) -> PricePoint {
        PricePoint::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), close)
    }

    #[test]
    fn keeps_supplied_order() {
        let series = Series::new(
            "AAPL".into(),
            vec![point("2024-01-03", 3.0), point("2024-01-01", 1.0)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].close, 3.0);
        assert_eq!(series.points[1].close, 1.0);
    }

    #[test]
    fn empty_series_is_valid() {
        let series = Series::empty("EMPTY");
        assert!(series.is_empty());
        assert!(series.validate().is_ok());
    }

    #[test]
    fn validate_accepts_ascending_dates() {
        let series = Series::new(
            "AAPL".into(),
            vec![point("2024-01-01", 1.0), point("2024-01-04", 2.0)],
        );
        assert!(series.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_order_dates() {
        let series = Series::new(
            "AAPL".into(),
            vec![
                point("2024-01-01", 1.0),
                point("2024-01-03", 2.0),
                point("2024-01-02", 3.0),
            ],
        );
        let err = series.validate().unwrap_err();
        assert!(matches!(err, MacrossError::MalformedInput { row: 2, .. }));
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let series = Series::new(
            "AAPL".into(),
            vec![point("2024-01-01", 1.0), point("2024-01-01", 2.0)],
        );
        assert!(matches!(
            series.validate(),
            Err(MacrossError::MalformedInput { row: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_nan_close() {
        let series = Series::new(
            "AAPL".into(),
            vec![point("2024-01-01", 1.0), point("2024-01-02", f64::NAN)],
        );
        let err = series.validate().unwrap_err();
        match err {
            MacrossError::MalformedInput { symbol, row, .. } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
