//! Backtest runner.
//!
//! Each symbol runs validate → averages → signals → ledger on its own.
//! Symbols fan out over rayon; every worker returns an owned result and
//! the collector alone writes the profit/loss mapping.

use crate::domain::error::MacrossError;
use crate::domain::indicator::MovingAverageSet;
use crate::domain::ledger::{LedgerConfig, LedgerOutcome, run_ledger};
use crate::domain::series::Series;
use crate::domain::signal::{SignalRow, SignalRules, generate_signals};
use rayon::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BacktestConfig {
    pub rules: SignalRules,
    pub ledger: LedgerConfig,
    /// Worker threads; 0 uses the global rayon pool.
    pub jobs: usize,
}

/// Everything computed for one symbol. Charts read series and signals.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBacktest {
    pub series: Series,
    pub averages: MovingAverageSet,
    pub signals: Vec<SignalRow>,
    pub ledger: LedgerOutcome,
}

impl SymbolBacktest {
    pub fn symbol(&self) -> &str {
        &self.series.symbol
    }
}

#[derive(Debug, Clone)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
}

/// Realized profit/loss per symbol, ordered by symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfitLossResult {
    entries: BTreeMap<String, f64>,
}

impl ProfitLossResult {
    pub fn insert(&mut self, symbol: impl Into<String>, pnl: f64) {
        self.entries.insert(symbol.into(), pnl);
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries.get(symbol).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(s, pnl)| (s.as_str(), *pnl))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UniverseResult {
    pub profit_loss: ProfitLossResult,
    pub backtests: Vec<SymbolBacktest>,
    pub failures: Vec<SymbolFailure>,
}

impl UniverseResult {
    pub fn record_failure(&mut self, symbol: impl Into<String>, err: &MacrossError) {
        let symbol = symbol.into();
        tracing::warn!(%symbol, error = %err, "skipping symbol");
        self.failures.push(SymbolFailure {
            symbol,
            reason: err.to_string(),
        });
    }

    pub fn backtest(&self, symbol: &str) -> Option<&SymbolBacktest> {
        self.backtests.iter().find(|b| b.symbol() == symbol)
    }
}

pub fn run_symbol(series: Series, config: &BacktestConfig) -> Result<SymbolBacktest, MacrossError> {
    series.validate()?;

    let averages = MovingAverageSet::compute(&series, &config.rules.windows());
    let signals = generate_signals(&series, &averages, &config.rules)?;
    let ledger = run_ledger(&series.symbol, &signals, &config.ledger);

    tracing::debug!(
        symbol = %series.symbol,
        rows = signals.len(),
        trades = ledger.trades.len(),
        pnl = ledger.total_pnl,
        "symbol processed"
    );

    Ok(SymbolBacktest {
        series,
        averages,
        signals,
        ledger,
    })
}

pub fn run_universe(series: Vec<Series>, config: &BacktestConfig) -> UniverseResult {
    let run_all = || -> Vec<(String, Result<SymbolBacktest, MacrossError>)> {
        series
            .into_par_iter()
            .map(|s| (s.symbol.clone(), run_symbol(s, config)))
            .collect()
    };

    let outcomes = if config.jobs > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()
        {
            Ok(pool) => pool.install(run_all),
            Err(e) => {
                tracing::warn!(jobs = config.jobs, error = %e, "falling back to global pool");
                run_all()
            }
        }
    } else {
        run_all()
    };

    let mut result = UniverseResult::default();
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(backtest) => {
                result
                    .profit_loss
                    .insert(symbol, backtest.ledger.total_pnl);
                result.backtests.push(backtest);
            }
            Err(e) => result.record_failure(symbol, &e),
        }
    }
    result
}
