//! # models::metrics
//!
//! Scopes and the three metrics tables produced per run.
//!
//! Every table lists the same nine scopes in the same order, so consumers can
//! rely on positional correspondence between Open Interest, UPL and Leverage.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::position::{AssetKind, Direction, PositionRecord};

// ─── Scope ────────────────────────────────────────────────────────────────────

/// A partition of the record set: unconditioned, by direction, by asset, or
/// by direction and asset together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    All,
    Short,
    Long,
    Stable,
    Native,
    ShortNative,
    LongNative,
    ShortStable,
    LongStable,
}

impl Scope {
    /// Canonical reporting order.
    pub const ORDER: [Scope; 9] = [
        Scope::All,
        Scope::Short,
        Scope::Long,
        Scope::Stable,
        Scope::Native,
        Scope::ShortNative,
        Scope::LongNative,
        Scope::ShortStable,
        Scope::LongStable,
    ];

    /// Direction constraint of this scope, `None` = any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Scope::Short | Scope::ShortNative | Scope::ShortStable => Some(Direction::Short),
            Scope::Long | Scope::LongNative | Scope::LongStable => Some(Direction::Long),
            Scope::All | Scope::Stable | Scope::Native => None,
        }
    }

    /// Asset constraint of this scope, `None` = any.
    pub fn asset(self) -> Option<AssetKind> {
        match self {
            Scope::Stable | Scope::ShortStable | Scope::LongStable => Some(AssetKind::Stable),
            Scope::Native | Scope::ShortNative | Scope::LongNative => Some(AssetKind::Native),
            Scope::All | Scope::Short | Scope::Long => None,
        }
    }

    pub fn matches(self, record: &PositionRecord) -> bool {
        self.direction().map_or(true, |d| d == record.direction)
            && self.asset().map_or(true, |a| a == record.asset)
    }

    /// Human label suffix with the configured asset names, e.g. `"Short ETH"`.
    /// Empty for [`Scope::All`].
    pub fn suffix(self, names: &AssetNames) -> String {
        let side = match self.direction() {
            Some(Direction::Short) => Some("Short"),
            Some(Direction::Long)  => Some("Long"),
            None                   => None,
        };
        let asset = match self.asset() {
            Some(AssetKind::Native) => Some(names.native.as_str()),
            Some(AssetKind::Stable) => Some(names.stable.as_str()),
            None                    => None,
        };
        match (side, asset) {
            (Some(s), Some(a)) => format!("{s} {a}"),
            (Some(s), None)    => s.to_string(),
            (None, Some(a))    => a.to_string(),
            (None, None)       => String::new(),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generic = AssetNames { native: "Native".into(), stable: "Stable".into() };
        match self {
            Scope::All => write!(f, "All"),
            other      => write!(f, "{}", other.suffix(&generic)),
        }
    }
}

/// Display names of the two collateral assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetNames {
    pub native: String,
    pub stable: String,
}

impl AssetNames {
    pub fn name(&self, asset: AssetKind) -> &str {
        match asset {
            AssetKind::Native => &self.native,
            AssetKind::Stable => &self.stable,
        }
    }
}

impl Default for AssetNames {
    fn default() -> Self {
        Self { native: "ETH".into(), stable: "USDC".into() }
    }
}

// ─── MetricKind / MetricValue ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricKind {
    OpenInterest,
    UnrealizedPnl,
    AverageLeverage,
}

impl MetricKind {
    /// Label prefix used for each row, and the table title.
    pub fn title(self) -> &'static str {
        match self {
            MetricKind::OpenInterest    => "Open Interest",
            MetricKind::UnrealizedPnl   => "Total UPL",
            MetricKind::AverageLeverage => "Average Leverage",
        }
    }
}

/// A metric value or the explicit marker for a scope with no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricValue {
    Value(Decimal),
    Undefined,
}

impl MetricValue {
    pub fn as_decimal(self) -> Option<Decimal> {
        match self {
            MetricValue::Value(v) => Some(v),
            MetricValue::Undefined => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{:.2}", v),
            MetricValue::Undefined => write!(f, "n/a"),
        }
    }
}

// ─── MetricsTable ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub scope: Scope,
    /// e.g. `"Open Interest Short ETH"`.
    pub label: String,
    pub value: MetricValue,
    /// Percentage of the ALL scope. Only filled for Open Interest.
    pub share_pct: Option<Decimal>,
}

/// Immutable once built. Rows follow [`Scope::ORDER`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsTable {
    pub kind: MetricKind,
    pub rows: Vec<MetricRow>,
}

impl MetricsTable {
    pub fn get(&self, scope: Scope) -> MetricValue {
        self.rows
            .iter()
            .find(|r| r.scope == scope)
            .map(|r| r.value)
            .unwrap_or(MetricValue::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(direction: Direction, asset: AssetKind) -> PositionRecord {
        PositionRecord {
            symbol:      "ETH-PERP".into(),
            direction,
            asset,
            price:       dec!(2000),
            size_native: dec!(1),
            size_value:  dec!(2000),
            leverage:    dec!(2),
            upl_native:  dec!(0),
            upl_value:   dec!(0),
            margin:      dec!(1000),
            liq_price:   dec!(1500),
        }
    }

    #[test]
    fn test_every_record_matches_exactly_one_intersection_scope() {
        let intersections = [Scope::ShortNative, Scope::LongNative, Scope::ShortStable, Scope::LongStable];
        for d in [Direction::Long, Direction::Short] {
            for a in [AssetKind::Native, AssetKind::Stable] {
                let r = record(d, a);
                let hits = intersections.iter().filter(|s| s.matches(&r)).count();
                assert_eq!(hits, 1);
                assert!(Scope::All.matches(&r));
            }
        }
    }

    #[test]
    fn test_labels_use_configured_asset_names() {
        let names = AssetNames::default();
        assert_eq!(Scope::All.suffix(&names), "");
        assert_eq!(Scope::Short.suffix(&names), "Short");
        assert_eq!(Scope::Stable.suffix(&names), "USDC");
        assert_eq!(Scope::LongNative.suffix(&names), "Long ETH");
        assert_eq!(Scope::ShortStable.to_string(), "Short Stable");
    }

    #[test]
    fn test_undefined_renders_as_marker() {
        assert_eq!(MetricValue::Undefined.to_string(), "n/a");
        assert_eq!(MetricValue::Value(dec!(2.4)).to_string(), "2.40");
    }
}
