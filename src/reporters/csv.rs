//! # reporters::csv — positions table + metrics table on disk
//!
//! Positions: `Product, Position, Underlying Asset, Price, Size, Net Size,
//! Margin, Leverage, UPL, Net UPL, Est. Liq. Price`
//!
//! Metrics: `Table, Description, Value, Percentage (of Open Interest)`

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::Writer;
use tracing::info;

use super::{export_decimal, Reporter};
use crate::models::{MetricValue, PortfolioReport};

pub const POSITION_COLUMNS: [&str; 11] = [
    "Product",
    "Position",
    "Underlying Asset",
    "Price",
    "Size",
    "Net Size",
    "Margin",
    "Leverage",
    "UPL",
    "Net UPL",
    "Est. Liq. Price",
];

pub const METRIC_COLUMNS: [&str; 4] = ["Table", "Description", "Value", "Percentage (of Open Interest)"];

pub struct CsvReporter {
    positions_path: PathBuf,
    metrics_path:   PathBuf,
}

impl CsvReporter {
    pub fn new(positions_path: PathBuf, metrics_path: PathBuf) -> Self {
        Self { positions_path, metrics_path }
    }

    fn writer(path: &Path) -> anyhow::Result<Writer<File>> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        Ok(Writer::from_writer(file))
    }

    fn write_positions(&self, report: &PortfolioReport) -> anyhow::Result<()> {
        let mut writer = Self::writer(&self.positions_path)?;
        writer.write_record(POSITION_COLUMNS)?;

        for p in &report.positions {
            writer.write_record(&[
                p.symbol.clone(),
                p.direction.to_string(),
                report.assets.name(p.asset).to_string(),
                export_decimal(p.price),
                export_decimal(p.size_native),
                export_decimal(p.size_value),
                export_decimal(p.margin),
                export_decimal(p.leverage),
                export_decimal(p.upl_native),
                export_decimal(p.upl_value),
                export_decimal(p.liq_price),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_metrics(&self, report: &PortfolioReport) -> anyhow::Result<()> {
        let mut writer = Self::writer(&self.metrics_path)?;
        writer.write_record(METRIC_COLUMNS)?;

        for table in report.tables() {
            for row in &table.rows {
                let value = match row.value {
                    MetricValue::Value(v) => export_decimal(v),
                    MetricValue::Undefined => String::new(),
                };
                let share = row.share_pct.map(export_decimal).unwrap_or_default();
                writer.write_record(&[table.kind.title().to_string(), row.label.clone(), value, share])?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

impl Reporter for CsvReporter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn report(&self, report: &PortfolioReport) -> anyhow::Result<()> {
        self.write_positions(report)?;
        self.write_metrics(report)?;
        info!(
            positions = %self.positions_path.display(),
            metrics   = %self.metrics_path.display(),
            "💾 CSV exported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::converter::ReferencePrice;
    use crate::engine::normalizer::NormalizeOptions;
    use crate::models::AssetNames;
    use crate::pipeline;
    use rust_decimal_macros::dec;

    fn sample_report() -> PortfolioReport {
        let text = "↑ETH-PERP\n3,000\n1.5Ξ\n5x\n0.05Ξ\n$2,520\n↓ETH-PERP\n3,000\n2,000$\n2x\n-35.5$\n$4,450\n";
        let price = ReferencePrice::new(dec!(3000)).ok();
        pipeline::run(text, price, NormalizeOptions::default(), &AssetNames::default()).unwrap()
    }

    #[test]
    fn test_writes_positions_in_fixed_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = CsvReporter::new(dir.path().join("p.csv"), dir.path().join("m.csv"));
        reporter.report(&sample_report()).unwrap();

        let positions = std::fs::read_to_string(dir.path().join("p.csv")).unwrap();
        let lines: Vec<&str> = positions.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Product,Position,Underlying Asset,Price,Size,Net Size,Margin,Leverage,UPL,Net UPL,Est. Liq. Price");
        assert_eq!(lines[1], "ETH-PERP,LONG,ETH,3000,1.5,4500,900,5,0.05,150,2520");
        assert_eq!(lines[2], "ETH-PERP,SHORT,USDC,3000,2000,2000,1000,2,-35.5,-35.5,4450");
    }

    #[test]
    fn test_writes_three_metric_tables() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = CsvReporter::new(dir.path().join("p.csv"), dir.path().join("m.csv"));
        reporter.report(&sample_report()).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("m.csv")).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 27);

        assert_eq!(&rows[0][1], "Open Interest");
        assert_eq!(&rows[0][2], "6500");
        assert_eq!(&rows[0][3], "100");
        assert_eq!(&rows[9][0], "Total UPL");
        assert_eq!(&rows[9][2], "114.5");
        // Short ETH has no positions → undefined leverage exported as empty
        assert_eq!(&rows[23][1], "Average Leverage Short ETH");
        assert_eq!(&rows[23][2], "");
    }
}
