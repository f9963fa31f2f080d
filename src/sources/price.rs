//! # sources::price — native asset quote
//!
//! ## Data Sources
//! 1. `NATIVE_PRICE` in .env — fixed quote, no network
//! 2. Simple-price API (CoinGecko format) — one GET per run
//!
//! Response format: `{"ethereum": {"usd": 3120.55}}`

use std::str::FromStr;

use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Config, PriceSetting};
use crate::engine::converter::ReferencePrice;
use crate::error::PipelineError;

/// Fetch the quote the run will convert native amounts with.
pub async fn fetch_native_price(client: &reqwest::Client, config: &Config) -> anyhow::Result<Decimal> {
    match &config.price {
        PriceSetting::Fixed(quote) => {
            info!(price = %quote, "Using fixed NATIVE_PRICE");
            Ok(*quote)
        }
        PriceSetting::Api { url, asset_id, vs_currency } => {
            fetch_from_api(client, url, asset_id, vs_currency, config).await
        }
    }
}

/// Turn a fetch outcome into the run's reference price. A failed fetch keeps
/// its cause in the conversion error.
pub fn into_reference_price(fetched: anyhow::Result<Decimal>) -> Result<ReferencePrice, PipelineError> {
    match fetched {
        Ok(quote) => ReferencePrice::new(quote),
        Err(e) => Err(PipelineError::Conversion(format!("price fetch failed: {e:#}"))),
    }
}

async fn fetch_from_api(
    client: &reqwest::Client,
    url: &str,
    asset_id: &str,
    vs_currency: &str,
    config: &Config,
) -> anyhow::Result<Decimal> {
    debug!(url, asset_id, vs_currency, "Requesting price quote...");

    let resp = client
        .get(url)
        .query(&[("ids", asset_id), ("vs_currencies", vs_currency)])
        .timeout(config.http_timeout)
        .send()
        .await
        .context("Price API unreachable")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        bail!("Price API error {status}: {text}");
    }

    let body: Value = resp.json().await.context("Failed to parse price response")?;
    let quote = parse_simple_price(&body, asset_id, vs_currency)?;

    info!(asset_id, vs_currency, price = %quote, "💱 Price quote fetched");
    Ok(quote)
}

/// Pull `body[asset_id][vs_currency]` out of a simple-price response.
pub fn parse_simple_price(body: &Value, asset_id: &str, vs_currency: &str) -> anyhow::Result<Decimal> {
    let raw = body
        .get(asset_id)
        .and_then(|quotes| quotes.get(vs_currency))
        .with_context(|| format!("Price response has no {asset_id}/{vs_currency} quote: {body}"))?;

    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => bail!("Price quote is not a number: {other}"),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .with_context(|| format!("Price quote is not a decimal: {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_fetch_failure_reason_is_kept() {
        let fetched = Err(anyhow::anyhow!("HTTP 429").context("Price API request failed"));
        let err = into_reference_price(fetched).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Conversion("price fetch failed: Price API request failed: HTTP 429".into())
        );
        assert_eq!(err.kind(), "conversion");

        assert_eq!(into_reference_price(Ok(dec!(3000))).unwrap().get(), dec!(3000));
        assert!(matches!(into_reference_price(Ok(dec!(0))), Err(PipelineError::Conversion(_))));
    }

    #[test]
    fn test_parses_number_quote_exactly() {
        let body = json!({ "ethereum": { "usd": 3120.55 } });
        assert_eq!(parse_simple_price(&body, "ethereum", "usd").unwrap(), dec!(3120.55));
    }

    #[test]
    fn test_parses_string_and_integer_quotes() {
        let body = json!({ "ethereum": { "usd": "2999.1", "eur": 2800 } });
        assert_eq!(parse_simple_price(&body, "ethereum", "usd").unwrap(), dec!(2999.1));
        assert_eq!(parse_simple_price(&body, "ethereum", "eur").unwrap(), dec!(2800));
    }

    #[test]
    fn test_missing_quote_is_an_error() {
        let body = json!({ "bitcoin": { "usd": 60000 } });
        assert!(parse_simple_price(&body, "ethereum", "usd").is_err());
        assert!(parse_simple_price(&json!({}), "ethereum", "usd").is_err());
        assert!(parse_simple_price(&json!({ "ethereum": { "usd": null } }), "ethereum", "usd").is_err());
    }
}
