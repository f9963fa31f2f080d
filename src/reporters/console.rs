//! # reporters::console — terminal tables and horizontal bar charts
//!
//! ```text
//! Open Interest Metrics
//!   Open Interest              |██████████████████████████████ 6500.00 (100.00%)
//!   Total UPL Short        ████|                               -35.50
//! ```
//! Negative values grow leftwards from the axis. Undefined values print
//! `n/a` with no bar.

use std::fmt::Write as _;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::Reporter;
use crate::models::{MetricKind, MetricValue, MetricsTable, PortfolioReport};

/// Longest bar, in characters.
const DEFAULT_BAR_WIDTH: usize = 30;

pub struct ConsoleReporter {
    bar_width: usize,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self { bar_width: DEFAULT_BAR_WIDTH }
    }
}

impl ConsoleReporter {
    fn bar_len(&self, value: Decimal, max_abs: Decimal) -> usize {
        value
            .abs()
            .checked_mul(Decimal::from(self.bar_width))
            .and_then(|n| n.checked_div(max_abs))
            .and_then(|n| n.round().to_usize())
            .unwrap_or(0)
    }

    fn chart_title(kind: MetricKind) -> &'static str {
        match kind {
            MetricKind::OpenInterest    => "Open Interest Metrics",
            MetricKind::UnrealizedPnl   => "Total UPL Metrics",
            MetricKind::AverageLeverage => "Leverage Average Metrics",
        }
    }

    /// One table as a bar chart.
    pub fn render_chart(&self, table: &MetricsTable) -> String {
        let values: Vec<Decimal> = table.rows.iter().filter_map(|r| r.value.as_decimal()).collect();
        let max_abs = values.iter().map(|v| v.abs()).max().unwrap_or(Decimal::ZERO);
        let has_negative = values.iter().any(|v| v.is_sign_negative() && !v.is_zero());
        let label_width = table.rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "{}", Self::chart_title(table.kind));

        for row in &table.rows {
            let (left, right) = match row.value {
                MetricValue::Value(v) => {
                    let n = self.bar_len(v, max_abs);
                    if v.is_sign_negative() {
                        ("█".repeat(n), String::new())
                    } else {
                        (String::new(), "█".repeat(n))
                    }
                }
                MetricValue::Undefined => (String::new(), String::new()),
            };

            let left = if has_negative {
                format!("{left:>width$}", width = self.bar_width)
            } else {
                String::new()
            };
            let share = row
                .share_pct
                .map(|s| format!(" ({s:.2}%)"))
                .unwrap_or_default();

            let _ = writeln!(
                out,
                "  {label:<label_width$} {left}|{right:<bar$} {value}{share}",
                label = row.label,
                bar = self.bar_width,
                value = row.value,
            );
        }
        out
    }

    /// The normalized positions table.
    pub fn render_positions(&self, report: &PortfolioReport) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<14} {:<6} {:<6} {:>12} {:>14} {:>14} {:>12} {:>8} {:>12} {:>12} {:>12}",
            "Product", "Pos", "Asset", "Price", "Size", "Net Size", "Margin", "Lev", "UPL", "Net UPL", "Liq. Price"
        );
        for p in &report.positions {
            let _ = writeln!(
                out,
                "{:<14} {:<6} {:<6} {:>12.2} {:>14.4} {:>14.2} {:>12.2} {:>8.2} {:>12.4} {:>12.2} {:>12.2}",
                p.symbol,
                p.direction.to_string(),
                report.assets.name(p.asset),
                p.price,
                p.size_native,
                p.size_value,
                p.margin,
                p.leverage,
                p.upl_native,
                p.upl_value,
                p.liq_price,
            );
        }
        out
    }

    pub fn render(&self, report: &PortfolioReport) -> String {
        let mut out = self.render_positions(report);
        if let Some(price) = report.reference_price {
            let _ = writeln!(out, "\n{} price: {price:.2}", report.assets.native);
        }
        if report.unmarked_rows > 0 {
            let _ = writeln!(out, "warning: {} row(s) had no recognized sigil", report.unmarked_rows);
        }
        for table in report.tables() {
            out.push('\n');
            out.push_str(&self.render_chart(table));
        }
        out
    }
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn report(&self, report: &PortfolioReport) -> anyhow::Result<()> {
        println!("{}", self.render(report));
        Ok(())
    }
}
