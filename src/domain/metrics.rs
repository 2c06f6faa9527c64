//! Per-symbol trade statistics.

use super::backtest::SymbolBacktest;
use super::position::ClosedTrade;

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSummary {
    pub symbol: String,
    pub rows: usize,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_trade_duration: f64,
    pub holding_at_end: bool,
}

impl SymbolSummary {
    pub fn compute(backtest: &SymbolBacktest) -> Self {
        let mut summary = Self::from_trades(&backtest.series.symbol, &backtest.ledger.trades);
        summary.rows = backtest.signals.len();
        summary.total_pnl = backtest.ledger.total_pnl;
        summary.holding_at_end = backtest.ledger.open_position.is_some();
        summary
    }

    pub fn from_trades(symbol: &str, trades: &[ClosedTrade]) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_pnl = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration_days = 0i64;

        for trade in trades {
            let pnl = trade.pnl;
            total_pnl += pnl;
            if pnl > 0.0 {
                trades_won += 1;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
            total_duration_days += trade.holding_days();
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };
        let avg_trade_duration = if total_trades > 0 {
            total_duration_days as f64 / total_trades as f64
        } else {
            0.0
        };

        SymbolSummary {
            symbol: symbol.to_string(),
            rows: 0,
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            total_pnl,
            largest_win,
            largest_loss,
            avg_trade_duration,
            holding_at_end: false,
        }
    }
}
