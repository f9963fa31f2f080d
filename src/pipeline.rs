//! # pipeline
//!
//! Runs one snapshot end-to-end:
//!
//! ```text
//! text ──▶ [grouper] ──▶ [normalizer] ──▶ Extraction
//!                                            │   needs_price()?  ──▶ caller fetches quote
//!                                            ▼
//!                       [converter] ──▶ [aggregator] ──▶ PortfolioReport
//! ```
//!
//! The run is split in two so the caller only hits the price API when some
//! row is actually native-denominated. Both halves are synchronous and do no
//! I/O. The first error aborts the run; there is no partial report.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{
    aggregator,
    converter::{self, ReferencePrice},
    grouper,
    normalizer::{self, NormalizeOptions},
};
use crate::error::PipelineError;
use crate::models::{AssetKind, AssetNames, ParsedPosition, PortfolioReport, PositionRecord};

// ─── Extraction ───────────────────────────────────────────────────────────────

/// Normalized rows of one snapshot, amounts still in collateral units.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub positions: Vec<ParsedPosition>,
}

impl Extraction {
    /// `true` if at least one row must be converted with the reference price.
    pub fn needs_price(&self) -> bool {
        self.positions.iter().any(|p| p.asset == AssetKind::Native)
    }

    pub fn unmarked_rows(&self) -> usize {
        self.positions.iter().filter(|p| p.unmarked).count()
    }
}

/// Group and normalize the scraped text.
pub fn extract(text: &str, opts: NormalizeOptions) -> Result<Extraction, PipelineError> {
    let lines = grouper::split_lines(text);
    debug!(lines = lines.len(), "Snapshot split into lines");

    let groups = grouper::group_lines(&lines)?;
    let positions = normalizer::normalize_all(&groups, opts)?;

    let extraction = Extraction { positions };
    info!(
        positions   = extraction.positions.len(),
        needs_price = extraction.needs_price(),
        unmarked    = extraction.unmarked_rows(),
        "📄 Snapshot extracted"
    );
    Ok(extraction)
}

// ─── Evaluation ───────────────────────────────────────────────────────────────

/// Convert every row with the run's single reference price and build the
/// three metrics tables.
pub fn evaluate(
    extraction: Extraction,
    price: Option<ReferencePrice>,
    names: &AssetNames,
) -> Result<PortfolioReport, PipelineError> {
    // Fail before touching any row if a native conversion is impossible.
    let price = converter::require_price(&extraction.positions, price)?;

    let positions = extraction
        .positions
        .iter()
        .map(|p| converter::finalize(p, price))
        .collect::<Result<Vec<PositionRecord>, _>>()?;

    let open_interest  = aggregator::open_interest(&positions, names)?;
    let unrealized_pnl = aggregator::unrealized_pnl(&positions, names)?;
    let avg_leverage   = aggregator::average_leverage(&positions, names)?;

    let unmarked_rows = extraction.unmarked_rows();
    if unmarked_rows > 0 {
        warn!(unmarked_rows, "Some rows were classified by default branch — check the dashboard layout");
    }

    let report = PortfolioReport {
        run_id: Uuid::new_v4(),
        captured_at: Utc::now(),
        assets: names.clone(),
        reference_price: price.map(ReferencePrice::get),
        positions,
        open_interest,
        unrealized_pnl,
        avg_leverage,
        unmarked_rows,
    };

    info!(
        run_id    = %report.run_id,
        positions = report.positions.len(),
        price     = ?report.reference_price,
        "📊 Metrics computed"
    );
    Ok(report)
}

/// [`extract`] then [`evaluate`], for callers that already hold the price.
#[cfg(test)]
pub fn run(
    text: &str,
    price: Option<ReferencePrice>,
    opts: NormalizeOptions,
    names: &AssetNames,
) -> Result<PortfolioReport, PipelineError> {
    evaluate(extract(text, opts)?, price, names)
}
