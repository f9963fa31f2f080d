//! # models::position
//!
//! Defines the per-position records that flow through the pipeline.
//!
//! ## Two shapes of the same position
//! `ParsedPosition` = what the dashboard text says, amounts still in the
//!                    collateral asset (ETH or USDC).
//! `PositionRecord` = the finalized row, amounts converted to the value unit
//!                    and margin derived. This is what the aggregator and the
//!                    reporters see.

use rust_decimal::Decimal;
use serde::Serialize;

// ─── Direction ────────────────────────────────────────────────────────────────

/// Side of the position, read from the leading sigil of the product label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long  => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

// ─── AssetKind ────────────────────────────────────────────────────────────────

/// Collateral the position is denominated in, read from the trailing sigil of
/// the size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    /// Venue settlement asset (ETH). Needs the reference price.
    Native,
    /// Pegged stablecoin (USDC). Taken 1:1.
    Stable,
}

// ─── ParsedPosition ───────────────────────────────────────────────────────────

/// One dashboard row after sigil classification and numeric coercion, before
/// any conversion into the value unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPosition {
    /// 1-based position of the row in the snapshot.
    pub index:       usize,
    /// Product label, direction sigil removed.
    pub symbol:      String,
    pub direction:   Direction,
    pub asset:       AssetKind,
    pub price:       Decimal,
    /// Position size in collateral units, always non-negative.
    pub size_native: Decimal,
    pub leverage:    Decimal,
    /// Unrealized P&L in collateral units. Sign is meaningful.
    pub upl_native:  Decimal,
    pub liq_price:   Decimal,
    /// `true` when either sigil was missing and a default branch was taken.
    pub unmarked:    bool,
}

// ─── PositionRecord ───────────────────────────────────────────────────────────

/// The normalized unit of work handed to the aggregator and the reporters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRecord {
    pub symbol:      String,
    pub direction:   Direction,
    pub asset:       AssetKind,
    pub price:       Decimal,
    pub size_native: Decimal,
    pub size_value:  Decimal,
    pub leverage:    Decimal,
    pub upl_native:  Decimal,
    pub upl_value:   Decimal,
    /// `size_value / leverage`.
    pub margin:      Decimal,
    pub liq_price:   Decimal,
}

impl PositionRecord {
    /// Numerator term of the margin-weighted leverage average, `None` on
    /// overflow.
    #[inline]
    pub fn weighted_leverage(&self) -> Option<Decimal> {
        self.leverage.checked_mul(self.margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(leverage: Decimal, margin: Decimal) -> PositionRecord {
        PositionRecord {
            symbol:      "ETH-PERP".into(),
            direction:   Direction::Long,
            asset:       AssetKind::Stable,
            price:       dec!(3000),
            size_native: dec!(0),
            size_value:  dec!(0),
            leverage,
            upl_native:  dec!(0),
            upl_value:   dec!(0),
            margin,
            liq_price:   dec!(0),
        }
    }

    #[test]
    fn test_weighted_leverage_term() {
        assert_eq!(record(dec!(4), dec!(12.5)).weighted_leverage(), Some(dec!(50)));
    }

    #[test]
    fn test_weighted_leverage_overflow_is_none() {
        assert_eq!(record(dec!(10), Decimal::MAX).weighted_leverage(), None);
    }
}
