//! # config — read Config from environment variables
//!
//! `.env` is loaded by `main` before this runs, so every variable can come
//! from either place.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use rust_decimal::Decimal;

use crate::models::AssetNames;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Where the dashboard text dump comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSetting {
    File(PathBuf),
    Url(String),
    Stdin,
}

/// Where the native asset quote comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceSetting {
    /// Operator-supplied quote, no network call.
    Fixed(Decimal),
    /// Simple-price endpoint, e.g. CoinGecko.
    Api {
        url:         String,
        asset_id:    String,
        vs_currency: String,
    },
}

/// Everything the monitor needs for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot:      SnapshotSetting,
    pub price:         PriceSetting,
    /// Display names of the collateral assets, e.g. ETH / USDC.
    pub assets:        AssetNames,
    /// Directory the CSV / JSON exports are written to.
    pub output_dir:    PathBuf,
    pub positions_csv: String,
    pub metrics_csv:   String,
    /// Optional pretty-JSON report file name.
    pub report_json:   Option<String>,
    /// Reject rows whose sigils are missing instead of defaulting them.
    pub strict_sigils: bool,
    /// Timeout for both collaborator HTTP calls.
    pub http_timeout:  Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let snapshot = match (get("SNAPSHOT_PATH"), get("SNAPSHOT_URL")) {
            (Some(_), Some(_)) => bail!("Set only one of SNAPSHOT_PATH or SNAPSHOT_URL"),
            (Some(path), None) => SnapshotSetting::File(PathBuf::from(path)),
            (None, Some(url))  => SnapshotSetting::Url(url),
            (None, None)       => SnapshotSetting::Stdin,
        };

        let price = match get("NATIVE_PRICE") {
            Some(raw) => {
                let quote = Decimal::from_str(&raw)
                    .with_context(|| format!("NATIVE_PRICE must be a decimal number, got '{raw}'"))?;
                PriceSetting::Fixed(quote)
            }
            None => PriceSetting::Api {
                url:         get_or("PRICE_API_URL", DEFAULT_PRICE_API_URL),
                asset_id:    get_or("PRICE_ASSET_ID", "ethereum"),
                vs_currency: get_or("PRICE_VS_CURRENCY", "usd"),
            },
        };

        let strict_sigils = match get_or("STRICT_SIGILS", "false").to_lowercase().as_str() {
            "true" | "1" | "yes"  => true,
            "false" | "0" | "no"  => false,
            other => bail!("STRICT_SIGILS must be true or false, got '{other}'"),
        };

        let timeout_secs: u64 = get_or("HTTP_TIMEOUT_SECS", "10")
            .parse()
            .context("HTTP_TIMEOUT_SECS must be a number")?;

        Ok(Self {
            snapshot,
            price,
            assets: AssetNames {
                native: get_or("NATIVE_ASSET", "ETH"),
                stable: get_or("STABLE_ASSET", "USDC"),
            },
            output_dir:    PathBuf::from(get_or("OUTPUT_DIR", ".")),
            positions_csv: get_or("POSITIONS_CSV", "DataPositions.csv"),
            metrics_csv:   get_or("METRICS_CSV", "DataMetrics.csv"),
            report_json:   get("REPORT_JSON"),
            strict_sigils,
            http_timeout:  Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.snapshot, SnapshotSetting::Stdin);
        assert_eq!(
            cfg.price,
            PriceSetting::Api {
                url:         DEFAULT_PRICE_API_URL.to_string(),
                asset_id:    "ethereum".to_string(),
                vs_currency: "usd".to_string(),
            }
        );
        assert_eq!(cfg.assets, AssetNames::default());
        assert_eq!(cfg.positions_csv, "DataPositions.csv");
        assert_eq!(cfg.report_json, None);
        assert!(!cfg.strict_sigils);
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_fixed_price_and_file_snapshot() {
        let cfg = config(&[
            ("SNAPSHOT_PATH", "dump.txt"),
            ("NATIVE_PRICE", "3120.55"),
            ("STRICT_SIGILS", "TRUE"),
            ("REPORT_JSON", "report.json"),
        ])
        .unwrap();
        assert_eq!(cfg.snapshot, SnapshotSetting::File(PathBuf::from("dump.txt")));
        assert_eq!(cfg.price, PriceSetting::Fixed(dec!(3120.55)));
        assert!(cfg.strict_sigils);
        assert_eq!(cfg.report_json.as_deref(), Some("report.json"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let cfg = config(&[("SNAPSHOT_URL", "  "), ("NATIVE_PRICE", "")]).unwrap();
        assert_eq!(cfg.snapshot, SnapshotSetting::Stdin);
        assert!(matches!(cfg.price, PriceSetting::Api { .. }));
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(config(&[("NATIVE_PRICE", "three thousand")]).is_err());
        assert!(config(&[("HTTP_TIMEOUT_SECS", "ten")]).is_err());
        assert!(config(&[("STRICT_SIGILS", "maybe")]).is_err());
        assert!(config(&[("SNAPSHOT_PATH", "a.txt"), ("SNAPSHOT_URL", "http://x")]).is_err());
    }
}
