//! # reporters::json — full report as pretty JSON

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use super::Reporter;
use crate::models::PortfolioReport;

pub struct JsonReporter {
    path: PathBuf,
}

impl JsonReporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn report(&self, report: &PortfolioReport) -> anyhow::Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create JSON report: {}", self.path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)
            .context("Failed to serialize report")?;

        info!(path = %self.path.display(), run_id = %report.run_id, "💾 JSON report written");
        Ok(())
    }
}
