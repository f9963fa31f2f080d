//! Domain models shared across the position monitor.

pub mod metrics;
pub mod position;
pub mod report;

pub use metrics::{AssetNames, MetricKind, MetricRow, MetricValue, MetricsTable, Scope};
pub use position::{AssetKind, Direction, ParsedPosition, PositionRecord};
pub use report::PortfolioReport;
