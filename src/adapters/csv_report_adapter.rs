//! CSV profit/loss report adapter.
//!
//! One row per symbol under a `Symbol,Profit/Loss` header, sorted by symbol.
//! Also writes the per-row signal table for a single symbol.

use crate::domain::backtest::{ProfitLossResult, SymbolBacktest, UniverseResult};
use crate::domain::error::MacrossError;
use crate::ports::report_port::ReportPort;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 2] = ["Symbol", "Profit/Loss"];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_to<W: Write>(
        &self,
        profit_loss: &ProfitLossResult,
        writer: W,
    ) -> Result<(), MacrossError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(HEADER)?;
        for (symbol, pnl) in profit_loss.iter() {
            wtr.write_record([symbol, pnl.to_string().as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Date, close, one `<window>_MA` column per average, then the four flags.
/// Close-buy is written as -1/0, the other flags as 1/0. Undefined averages
/// are empty cells.
pub fn write_signal_table<W: Write>(
    backtest: &SymbolBacktest,
    writer: W,
) -> Result<(), MacrossError> {
    let averages: Vec<_> = backtest
        .averages
        .windows()
        .filter_map(|w| backtest.averages.get(w))
        .collect();

    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Date".to_string(), "Close".to_string()];
    header.extend(averages.iter().map(|a| format!("{}_MA", a.window)));
    header.extend(
        ["Buy_Signal", "Sell_Signal", "Close_Buy_Position", "Close_Sell_Position"]
            .map(String::from),
    );
    wtr.write_record(&header)?;

    let flag = |set: bool, on: &str| if set { on.to_string() } else { "0".to_string() };

    for (i, row) in backtest.signals.iter().enumerate() {
        let mut record = vec![row.date.to_string(), row.close.to_string()];
        record.extend(
            averages
                .iter()
                .map(|a| a.get(i).map(|v| v.to_string()).unwrap_or_default()),
        );
        record.push(flag(row.buy_signal, "1"));
        record.push(flag(row.sell_signal, "1"));
        record.push(flag(row.close_buy, "-1"));
        record.push(flag(row.close_sell, "1"));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &UniverseResult, output_path: &Path) -> Result<(), MacrossError> {
        let file = std::fs::File::create(output_path).map_err(|e| MacrossError::Report {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        self.write_to(&result.profit_loss, file)?;
        tracing::info!(
            path = %output_path.display(),
            symbols = result.profit_loss.len(),
            "profit/loss written"
        );
        Ok(())
    }
}
