//! Single-position ledger.
//!
//! Walks signal rows in index order through two states:
//!
//! - `Flat` + buy flag: open at the row close, move to `Holding`
//! - `Holding` + sell flag: close at the row close, realize
//!   `(exit - entry) * quantity`, move to `Flat`
//!
//! Every other combination leaves the state unchanged. A sell while `Flat`
//! is ignored rather than reported. The close-buy/close-sell flags are not
//! read here. A position still open after the last row realizes nothing.

use crate::domain::position::{ClosedTrade, DEFAULT_QUANTITY, Position};
use crate::domain::price::PricePoint;
use crate::domain::signal::SignalRow;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub quantity: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            quantity: DEFAULT_QUANTITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerState {
    Flat,
    Holding(Position),
}

impl LedgerState {
    pub fn is_flat(&self) -> bool {
        matches!(self, LedgerState::Flat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LedgerEvent {
    Opened { index: usize, price: f64 },
    Closed { index: usize, price: f64, pnl: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerOutcome {
    pub total_pnl: f64,
    pub trades: Vec<ClosedTrade>,
    pub events: Vec<LedgerEvent>,
    pub open_position: Option<Position>,
}

#[derive(Debug)]
pub struct PositionLedger {
    symbol: String,
    config: LedgerConfig,
    state: LedgerState,
    total_pnl: f64,
    trades: Vec<ClosedTrade>,
    events: Vec<LedgerEvent>,
    next_index: usize,
}

impl PositionLedger {
    pub fn new(symbol: impl Into<String>, config: LedgerConfig) -> Self {
        Self {
            symbol: symbol.into(),
            config,
            state: LedgerState::Flat,
            total_pnl: 0.0,
            trades: Vec::new(),
            events: Vec::new(),
            next_index: 0,
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn total_pnl(&self) -> f64 {
        self.total_pnl
    }

    /// Apply the next row. Rows are numbered in the order they arrive.
    pub fn apply(&mut self, row: &SignalRow) {
        let index = self.next_index;
        self.next_index += 1;
        let at = PricePoint::new(row.date, row.close);

        let state = std::mem::replace(&mut self.state, LedgerState::Flat);
        self.state = match state {
            LedgerState::Flat if row.buy_signal => {
                self.events.push(LedgerEvent::Opened {
                    index,
                    price: at.close,
                });
                LedgerState::Holding(Position::open(&at, self.config.quantity))
            }
            LedgerState::Holding(position) if row.sell_signal => {
                let trade = position.close(&self.symbol, &at);
                self.total_pnl += trade.pnl;
                self.events.push(LedgerEvent::Closed {
                    index,
                    price: at.close,
                    pnl: trade.pnl,
                });
                self.trades.push(trade);
                LedgerState::Flat
            }
            unchanged => unchanged,
        };
    }

    pub fn finish(self) -> LedgerOutcome {
        let open_position = match self.state {
            LedgerState::Flat => None,
            LedgerState::Holding(position) => Some(position),
        };
        LedgerOutcome {
            total_pnl: self.total_pnl,
            trades: self.trades,
            events: self.events,
            open_position,
        }
    }
}

/// Run a full signal stream through a fresh ledger.
pub fn run_ledger(symbol: &str, rows: &[SignalRow], config: &LedgerConfig) -> LedgerOutcome {
    let mut ledger = PositionLedger::new(symbol, config.clone());
    for row in rows {
        ledger.apply(row);
    }
    ledger.finish()
}
