//! # Position Monitor — open interest, UPL and leverage from a dashboard dump
//!
//! One-shot batch over a single snapshot.
//!
//! ## Flow
//! ```text
//!   1. Fetch snapshot text (file / URL / stdin)
//!   2. Group + normalize into positions
//!   3. Fetch native price (only if some position is native-denominated)
//!   4. Convert + aggregate → PortfolioReport
//!   5. Fan out to reporters (console, CSV, JSON)
//! ```
//!
//! ## Environment Variables
//!
//! | Variable            | Default                  | Description                         |
//! |---------------------|--------------------------|-------------------------------------|
//! | `SNAPSHOT_PATH`     | —                        | Text dump file                      |
//! | `SNAPSHOT_URL`      | —                        | Endpoint serving the text dump      |
//! | `NATIVE_PRICE`      | —                        | Fixed quote, skips the price API    |
//! | `PRICE_API_URL`     | CoinGecko simple price   | Price endpoint                      |
//! | `PRICE_ASSET_ID`    | `ethereum`               | Asset id in the price query         |
//! | `PRICE_VS_CURRENCY` | `usd`                    | Quote currency in the price query   |
//! | `HTTP_TIMEOUT_SECS` | `10`                     | Snapshot / price request timeout    |
//! | `NATIVE_ASSET`      | `ETH`                    | Native asset name in labels         |
//! | `STABLE_ASSET`      | `USDC`                   | Stable asset name in labels         |
//! | `STRICT_SIGILS`     | `false`                  | Reject rows with no sigil           |
//! | `OUTPUT_DIR`        | `.`                      | Where CSV / JSON are written        |
//! | `POSITIONS_CSV`     | `DataPositions.csv`      | Positions CSV file name             |
//! | `METRICS_CSV`       | `DataMetrics.csv`        | Metrics CSV file name               |
//! | `REPORT_JSON`       | —                        | JSON report file name (off if unset)|
//! | `RUST_LOG`          | `position_monitor=debug` | Tracing filter                      |

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod models;
mod pipeline;
mod reporters;
mod sources;

use config::Config;
use engine::normalizer::NormalizeOptions;
use models::PortfolioReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional — CI/prod can use real env vars) ──────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("position_monitor=debug".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    let config = Config::from_env().context("Failed to load config")?;
    let client = reqwest::Client::new();

    info!(
        snapshot = ?config.snapshot,
        price    = ?config.price,
        output   = %config.output_dir.display(),
        strict   = config.strict_sigils,
        "Position monitor started"
    );

    // ── 3. Snapshot → metrics ─────────────────────────────────────────────────
    let report = match run_once(&config, &client).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %format!("{e:#}"), "❌ Run failed — no report produced");
            return Err(e);
        }
    };

    // ── 4. Reporters ──────────────────────────────────────────────────────────
    let mut failures = 0usize;
    for reporter in reporters::from_config(&config) {
        if let Err(e) = reporter.report(&report) {
            failures += 1;
            error!(reporter = reporter.name(), error = %format!("{e:#}"), "Reporter failed");
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} reporter(s) failed");
    }

    info!(run_id = %report.run_id, "✅ Run complete");
    Ok(())
}

/// fetch snapshot → extract → (price) → evaluate
async fn run_once(config: &Config, client: &reqwest::Client) -> anyhow::Result<PortfolioReport> {
    let text = sources::fetch_snapshot(client, config)
        .await
        .context("Failed to fetch snapshot")?;

    let opts = NormalizeOptions { strict_sigils: config.strict_sigils };
    let extraction = pipeline::extract(&text, opts).map_err(|e| {
        warn!(kind = e.kind(), "Snapshot rejected");
        e
    })?;

    let price = if extraction.needs_price() {
        let fetched = sources::fetch_native_price(client, config).await;
        let price = sources::into_reference_price(fetched).map_err(|e| {
            error!(error = %e, "Price fetch failed");
            e
        })?;
        Some(price)
    } else {
        info!("All positions are stable-denominated — price fetch skipped");
        None
    };

    let report = pipeline::evaluate(extraction, price, &config.assets).map_err(|e| {
        warn!(kind = e.kind(), "Evaluation aborted");
        e
    })?;

    Ok(report)
}
