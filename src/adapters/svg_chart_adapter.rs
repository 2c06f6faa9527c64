//! SVG price charts with buy/sell markers.
//!
//! Close prices as a black polyline, green up-triangles on rows whose buy
//! flag is set, red down-triangles on rows whose sell flag is set.

use crate::domain::backtest::SymbolBacktest;
use crate::domain::error::MacrossError;
use crate::domain::signal::SignalRow;
use crate::ports::report_port::ChartPort;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 50.0;
const MARKER: f64 = 4.0;

struct Scale {
    min: f64,
    scale_x: f64,
    scale_y: f64,
}

impl Scale {
    fn new(rows: &[SignalRow]) -> Self {
        let min = rows.iter().map(|r| r.close).fold(f64::INFINITY, f64::min);
        let max = rows
            .iter()
            .map(|r| r.close)
            .fold(f64::NEG_INFINITY, f64::max);

        let plot_width = WIDTH - 2.0 * PADDING;
        let plot_height = HEIGHT - 2.0 * PADDING;
        let range = max - min;

        Scale {
            min,
            scale_x: if rows.len() > 1 {
                plot_width / (rows.len() - 1) as f64
            } else {
                0.0
            },
            scale_y: if range > 0.0 { plot_height / range } else { 1.0 },
        }
    }

    fn x(&self, index: usize) -> f64 {
        PADDING + index as f64 * self.scale_x
    }

    fn y(&self, close: f64) -> f64 {
        HEIGHT - PADDING - (close - self.min) * self.scale_y
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn format_price_chart(symbol: &str, rows: &[SignalRow]) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">"#
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="100%" height="100%" fill="white"/>"#
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.0}" y="{:.0}" text-anchor="middle" font-size="16">Stock {} - Buying and Selling Details</text>"#,
        WIDTH / 2.0,
        PADDING / 2.0,
        escape_xml(symbol)
    );
    let _ = writeln!(
        svg,
        r#"  <line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{b:.0}" stroke="gray"/>"#,
        p = PADDING,
        b = HEIGHT - PADDING
    );
    let _ = writeln!(
        svg,
        r#"  <line x1="{p:.0}" y1="{b:.0}" x2="{r:.0}" y2="{b:.0}" stroke="gray"/>"#,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING
    );

    if rows.is_empty() {
        let _ = writeln!(
            svg,
            r#"  <text x="{:.0}" y="{:.0}" text-anchor="middle">No price data available.</text>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    let scale = Scale::new(rows);

    let points: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{:.1},{:.1}", scale.x(i), scale.y(r.close)))
        .collect();
    let _ = writeln!(
        svg,
        r#"  <polyline class="close" fill="none" stroke="black" stroke-width="1" points="{}"/>"#,
        points.join(" ")
    );

    for (i, row) in rows.iter().enumerate() {
        let (x, y) = (scale.x(i), scale.y(row.close));
        if row.buy_signal {
            let _ = writeln!(
                svg,
                r#"  <polygon class="buy" fill="green" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}"/>"#,
                x,
                y - MARKER,
                x - MARKER,
                y + MARKER,
                x + MARKER,
                y + MARKER
            );
        }
        if row.sell_signal {
            let _ = writeln!(
                svg,
                r#"  <polygon class="sell" fill="red" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}"/>"#,
                x,
                y + MARKER,
                x - MARKER,
                y - MARKER,
                x + MARKER,
                y - MARKER
            );
        }
    }

    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        let _ = writeln!(
            svg,
            r#"  <text x="{:.0}" y="{:.0}" font-size="10">{}</text>"#,
            PADDING,
            HEIGHT - PADDING / 2.0,
            first.date
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.0}" y="{:.0}" font-size="10" text-anchor="end">{}</text>"#,
            WIDTH - PADDING,
            HEIGHT - PADDING / 2.0,
            last.date
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[derive(Debug, Default)]
pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ChartPort for SvgChartAdapter {
    fn render(&self, backtest: &SymbolBacktest, output_dir: &Path) -> Result<(), MacrossError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("{}.svg", backtest.symbol()));
        let svg = format_price_chart(backtest.symbol(), &backtest.signals);
        fs::write(&path, svg).map_err(|e| MacrossError::Report {
            reason: format!("failed to write {}: {}", path.display(), e),
        })?;
        tracing::debug!(path = %path.display(), "chart written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, close: f64, buy: bool, sell: bool) -> SignalRow {
        SignalRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            buy_signal: buy,
            sell_signal: sell,
            close_buy: false,
            close_sell: false,
        }
    }

    #[test]
    fn empty_rows_render_placeholder() {
        let svg = format_price_chart("EMPTY", &[]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("No price data available."));
        assert!(!svg.contains("polyline"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn title_names_symbol() {
        let svg = format_price_chart("AAPL", &[row(1, 10.0, false, false)]);
        assert!(svg.contains("Stock AAPL - Buying and Selling Details"));
        assert!(svg.contains(r#"width="800""#));
    }

    #[test]
    fn title_escapes_markup() {
        let svg = format_price_chart("AT&T<B>", &[row(1, 10.0, false, false)]);
        assert!(svg.contains("Stock AT&amp;T&lt;B&gt; - Buying and Selling Details"));
        assert!(!svg.contains("AT&T"));
    }

    #[test]
    fn markers_follow_flags() {
        let rows = vec![
            row(1, 10.0, true, false),
            row(2, 11.0, false, false),
            row(3, 12.0, true, true),
            row(4, 9.0, false, true),
        ];
        let svg = format_price_chart("AAPL", &rows);

        assert_eq!(svg.matches(r#"class="buy""#).count(), 2);
        assert_eq!(svg.matches(r#"class="sell""#).count(), 2);
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("2024-01-04"));
    }

    #[test]
    fn flat_prices_stay_on_baseline() {
        let rows = vec![row(1, 5.0, false, false), row(2, 5.0, false, false)];
        let svg = format_price_chart("FLAT", &rows);
        assert!(svg.contains("50.0,350.0 750.0,350.0"));
    }
}
