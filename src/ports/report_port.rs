//! Result output port trait.

use crate::domain::backtest::{SymbolBacktest, UniverseResult};
use crate::domain::error::MacrossError;
use std::path::Path;

/// Port for writing the per-symbol profit/loss table.
pub trait ReportPort {
    fn write(&self, result: &UniverseResult, output_path: &Path) -> Result<(), MacrossError>;
}

/// Port for rendering one symbol's prices with its buy/sell markers.
pub trait ChartPort {
    fn render(&self, backtest: &SymbolBacktest, output_dir: &Path) -> Result<(), MacrossError>;

    /// Default implementation: renders every symbol in turn, stopping at the first failure.
    fn render_all(&self, result: &UniverseResult, output_dir: &Path) -> Result<(), MacrossError> {
        for backtest in &result.backtests {
            self.render(backtest, output_dir)?;
        }
        Ok(())
    }
}
