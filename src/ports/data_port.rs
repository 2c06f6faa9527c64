//! Price data access port trait.

use crate::domain::error::MacrossError;
use crate::domain::series::Series;

pub trait DataPort {
    /// Load one symbol's closes in source order.
    fn fetch_series(&self, symbol: &str) -> Result<Series, MacrossError>;

    fn list_symbols(&self) -> Result<Vec<String>, MacrossError>;
}
