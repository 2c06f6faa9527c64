//! Property tests for the moving averages, signals and ledger.

mod common;

use common::*;
use macross::domain::backtest::{BacktestConfig, run_symbol};
use macross::domain::indicator::sma::calculate_sma;
use macross::domain::ledger::{LedgerConfig, LedgerEvent};
use macross::domain::signal::{SignalRules, WindowPair};
use proptest::prelude::*;

fn closes_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, 0..max_len)
}

proptest! {
    #[test]
    fn sma_shorter_than_window_is_undefined(closes in closes_strategy(20), extra in 1usize..10) {
        let window = closes.len() + extra;
        let sma = calculate_sma(&make_points(&closes), window);
        prop_assert_eq!(sma.len(), closes.len());
        prop_assert!(sma.values.iter().all(Option::is_none));
    }

    #[test]
    fn sma_of_window_one_is_the_closes(closes in closes_strategy(200)) {
        let sma = calculate_sma(&make_points(&closes), 1);
        for (i, close) in closes.iter().enumerate() {
            prop_assert_eq!(sma.get(i), Some(*close));
        }
    }

    #[test]
    fn sma_defined_exactly_from_window_minus_one(closes in closes_strategy(100), window in 1usize..30) {
        let sma = calculate_sma(&make_points(&closes), window);
        for i in 0..closes.len() {
            prop_assert_eq!(sma.get(i).is_some(), i + 1 >= window);
        }
    }

    #[test]
    fn sma_stays_within_window_bounds(closes in closes_strategy(100), window in 1usize..30) {
        let sma = calculate_sma(&make_points(&closes), window);
        for i in (window - 1)..closes.len() {
            let slice = &closes[i + 1 - window..=i];
            let lo = slice.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let v = sma.get(i).unwrap();
            prop_assert!(v >= lo - 1e-6 && v <= hi + 1e-6);
        }
    }

    #[test]
    fn ledger_events_alternate(closes in closes_strategy(150), fast in 1usize..5, gap in 1usize..10) {
        let bt = run_symbol(make_series("P", &closes), &small_config(fast, fast + gap)).unwrap();

        for (i, event) in bt.ledger.events.iter().enumerate() {
            prop_assert_eq!(matches!(event, LedgerEvent::Opened { .. }), i % 2 == 0);
        }
        prop_assert_eq!(bt.ledger.trades.len(), bt.ledger.events.len() / 2);
        prop_assert_eq!(bt.ledger.open_position.is_some(), bt.ledger.events.len() % 2 == 1);

        let realized: f64 = bt.ledger.trades.iter().map(|t| t.pnl).sum();
        prop_assert!((realized - bt.ledger.total_pnl).abs() < 1e-6);
    }

    #[test]
    fn no_flags_before_slow_average(closes in closes_strategy(80), fast in 1usize..5, gap in 1usize..20) {
        let slow = fast + gap;
        let bt = run_symbol(make_series("P", &closes), &small_config(fast, slow)).unwrap();

        prop_assert_eq!(bt.signals.len(), closes.len());
        for row in bt.signals.iter().take(slow - 1) {
            prop_assert!(!row.any());
        }
        for row in &bt.signals {
            prop_assert!(!(row.buy_signal && row.sell_signal));
        }
    }

    #[test]
    fn runs_are_deterministic(closes in closes_strategy(120)) {
        let config = small_config(2, 5);
        let first = run_symbol(make_series("D", &closes), &config).unwrap();
        let second = run_symbol(make_series("D", &closes), &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn constant_prices_never_signal(
        close in 0.01f64..10_000.0,
        len in 1usize..700,
        windows in prop::collection::vec(1usize..600, 8),
    ) {
        let pair = |i: usize| WindowPair::new(windows[i], windows[i + 1]);
        let config = BacktestConfig {
            rules: SignalRules {
                buy: pair(0),
                sell: pair(2),
                close_buy: pair(4),
                close_sell: pair(6),
            },
            ledger: LedgerConfig::default(),
            jobs: 0,
        };
        let bt = run_symbol(make_series("C", &vec![close; len]), &config).unwrap();

        prop_assert!(bt.signals.iter().all(|r| !r.any()));
        prop_assert!(bt.ledger.events.is_empty());
        prop_assert_eq!(bt.ledger.total_pnl, 0.0);
    }

    #[test]
    fn constant_prices_never_signal_with_default_windows(close in 0.01f64..10_000.0) {
        let bt = run_symbol(make_series("C", &vec![close; 1200]), &BacktestConfig::default()).unwrap();
        prop_assert!(bt.signals.iter().all(|r| !r.any()));
        prop_assert!(bt.ledger.events.is_empty());
    }
}
