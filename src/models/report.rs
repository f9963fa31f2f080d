//! # models::report
//!
//! Defines [`PortfolioReport`], everything one pipeline run hands to the
//! reporters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::metrics::{AssetNames, MetricsTable};
use crate::models::position::PositionRecord;

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub run_id:          Uuid,
    pub captured_at:     DateTime<Utc>,
    pub assets:          AssetNames,
    /// Native asset price used for every conversion in this run, if one was
    /// needed.
    pub reference_price: Option<Decimal>,
    pub positions:       Vec<PositionRecord>,
    pub open_interest:   MetricsTable,
    pub unrealized_pnl:  MetricsTable,
    pub avg_leverage:    MetricsTable,
    /// How many rows fell into a default classification branch.
    pub unmarked_rows:   usize,
}

impl PortfolioReport {
    /// The three tables in reporting order.
    pub fn tables(&self) -> [&MetricsTable; 3] {
        [&self.open_interest, &self.unrealized_pnl, &self.avg_leverage]
    }
}
