//! # sources::snapshot — dashboard text dump
//!
//! The rendered position list arrives as one newline-separated blob, read
//! from a file, an HTTP endpoint, or stdin. Cadence is not checked here; the
//! grouper owns that.

use anyhow::{bail, Context};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::config::{Config, SnapshotSetting};

/// Read the snapshot text from wherever the config points.
pub async fn fetch_snapshot(client: &reqwest::Client, config: &Config) -> anyhow::Result<String> {
    let text = match &config.snapshot {
        SnapshotSetting::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot file {}", path.display()))?,
        SnapshotSetting::Url(url) => fetch_from_url(client, url, config).await?,
        SnapshotSetting::Stdin => {
            debug!("No SNAPSHOT_PATH / SNAPSHOT_URL — reading snapshot from stdin");
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read snapshot from stdin")?;
            buf
        }
    };

    info!(
        source = ?config.snapshot,
        bytes  = text.len(),
        "Snapshot fetched"
    );
    Ok(text)
}

async fn fetch_from_url(client: &reqwest::Client, url: &str, config: &Config) -> anyhow::Result<String> {
    let resp = client
        .get(url)
        .timeout(config.http_timeout)
        .send()
        .await
        .context("Snapshot endpoint unreachable")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("Snapshot endpoint error {status}: {body}");
    }

    resp.text().await.context("Failed to read snapshot body")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn file_config(path: &std::path::Path) -> Config {
        let vars: HashMap<&str, String> = HashMap::from([("SNAPSHOT_PATH", path.display().to_string())]);
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_reads_snapshot_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "↑ETH-PERP\n3,000\n1Ξ\n2x\n0Ξ\n$1,500\n").unwrap();

        let text = fetch_snapshot(&reqwest::Client::new(), &file_config(file.path())).await.unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.starts_with("↑ETH-PERP"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = fetch_snapshot(&reqwest::Client::new(), &file_config(&missing)).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot file"));
    }
}
