//! # reporters
//!
//! Output side of a run. Every [`Reporter`] gets the same finished
//! [`PortfolioReport`]; column order and formatting live here and nowhere
//! else.

pub mod console;
pub mod csv;
pub mod json;

use rust_decimal::Decimal;

use crate::config::Config;
use crate::models::PortfolioReport;

pub use self::console::ConsoleReporter;
pub use self::csv::CsvReporter;
pub use self::json::JsonReporter;

pub trait Reporter {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn report(&self, report: &PortfolioReport) -> anyhow::Result<()>;
}

/// Reporters enabled by the config, in the order they run.
pub fn from_config(config: &Config) -> Vec<Box<dyn Reporter>> {
    let mut reporters: Vec<Box<dyn Reporter>> = vec![
        Box::new(ConsoleReporter::default()),
        Box::new(CsvReporter::new(
            config.output_dir.join(&config.positions_csv),
            config.output_dir.join(&config.metrics_csv),
        )),
    ];
    if let Some(name) = &config.report_json {
        reporters.push(Box::new(JsonReporter::new(config.output_dir.join(name))));
    }
    reporters
}

/// Decimal text for exports: at most 8 places, no trailing zeros.
pub(crate) fn export_decimal(value: Decimal) -> String {
    value.round_dp(8).normalize().to_string()
}
