//! # engine::converter
//!
//! **Value Converter** — brings collateral-denominated amounts into the common
//! value unit (USD).
//!
//! One [`ReferencePrice`] is taken per run and passed in explicitly, so every
//! native-asset row in a snapshot converts at the same rate.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::PipelineError;
use crate::models::{AssetKind, ParsedPosition, PositionRecord};

// ─── ReferencePrice ───────────────────────────────────────────────────────────

/// Native asset price in the value unit. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferencePrice(Decimal);

impl ReferencePrice {
    pub fn new(price: Decimal) -> Result<Self, PipelineError> {
        if price <= Decimal::ZERO {
            return Err(PipelineError::Conversion(format!(
                "reference price must be positive, got {price}"
            )));
        }
        Ok(Self(price))
    }

    #[inline]
    pub fn get(self) -> Decimal {
        self.0
    }
}

// ─── Conversion ───────────────────────────────────────────────────────────────

/// Stable amounts pass through 1:1; native amounts are multiplied by `price`.
/// `None` when the product does not fit in a `Decimal`.
#[inline]
pub fn convert(amount: Decimal, asset: AssetKind, price: ReferencePrice) -> Option<Decimal> {
    match asset {
        AssetKind::Stable => Some(amount),
        AssetKind::Native => amount.checked_mul(price.get()),
    }
}

/// Resolve the price a run will use.
///
/// Fails only when some row is native and no usable quote exists; a snapshot
/// made of stable rows alone converts without a price.
pub fn require_price(
    positions: &[ParsedPosition],
    price: Option<ReferencePrice>,
) -> Result<Option<ReferencePrice>, PipelineError> {
    let first_native = positions.iter().find(|p| p.asset == AssetKind::Native);
    match (first_native, price) {
        (Some(p), None) => Err(PipelineError::Conversion(format!(
            "record #{} is native-asset denominated but no reference price is available",
            p.index
        ))),
        (_, price) => Ok(price),
    }
}

/// Finalize one row: convert size and UPL, derive margin.
pub fn finalize(position: &ParsedPosition, price: Option<ReferencePrice>) -> Result<PositionRecord, PipelineError> {
    let to_value = |amount: Decimal, field: &str| -> Result<Decimal, PipelineError> {
        match (position.asset, price) {
            (AssetKind::Stable, _) => Ok(amount),
            (AssetKind::Native, Some(p)) => convert(amount, AssetKind::Native, p).ok_or_else(|| {
                PipelineError::InvalidRecord {
                    record: position.index,
                    reason: format!("{field} {amount} overflows at price {}", p.get()),
                }
            }),
            (AssetKind::Native, None) => Err(PipelineError::Conversion(format!(
                "record #{} needs a reference price",
                position.index
            ))),
        }
    };

    let size_value = to_value(position.size_native, "size")?;
    let upl_value = to_value(position.upl_native, "upl")?;

    let margin = size_value
        .checked_div(position.leverage)
        .filter(|_| position.leverage > Decimal::ZERO)
        .ok_or_else(|| PipelineError::InvalidRecord {
            record: position.index,
            reason: format!("cannot derive margin with leverage {}", position.leverage),
        })?;

    Ok(PositionRecord {
        symbol:      position.symbol.clone(),
        direction:   position.direction,
        asset:       position.asset,
        price:       position.price,
        size_native: position.size_native,
        size_value,
        leverage:    position.leverage,
        upl_native:  position.upl_native,
        upl_value,
        margin,
        liq_price:   position.liq_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use rust_decimal_macros::dec;

    fn parsed(asset: AssetKind, size: Decimal, leverage: Decimal, upl: Decimal) -> ParsedPosition {
        ParsedPosition {
            index: 1,
            symbol: "ETH-PERP".into(),
            direction: Direction::Long,
            asset,
            price: dec!(3000),
            size_native: size,
            leverage,
            upl_native: upl,
            liq_price: dec!(2500),
            unmarked: false,
        }
    }

    #[test]
    fn test_stable_is_identity_for_any_price() {
        for p in [dec!(0.01), dec!(1), dec!(3120.55), dec!(100000)] {
            let price = ReferencePrice::new(p).unwrap();
            assert_eq!(convert(dec!(1234.5678), AssetKind::Stable, price), Some(dec!(1234.5678)));
            assert_eq!(convert(dec!(-42), AssetKind::Stable, price), Some(dec!(-42)));
        }
    }

    #[test]
    fn test_native_multiplies_and_divides_back() {
        for (x, p) in [(dec!(1.25), dec!(3000)), (dec!(-0.0412), dec!(3120.5)), (dec!(7), dec!(0.3))] {
            let price = ReferencePrice::new(p).unwrap();
            let v = convert(x, AssetKind::Native, price).unwrap();
            assert_eq!(v, x * p);
            assert_eq!(v / p, x);
        }
    }

    #[test]
    fn test_non_positive_price_is_rejected() {
        assert!(matches!(ReferencePrice::new(dec!(0)), Err(PipelineError::Conversion(_))));
        assert!(matches!(ReferencePrice::new(dec!(-1)), Err(PipelineError::Conversion(_))));
    }

    #[test]
    fn test_missing_price_only_matters_for_native_rows() {
        let stable = vec![parsed(AssetKind::Stable, dec!(100), dec!(2), dec!(1))];
        assert_eq!(require_price(&stable, None).unwrap(), None);

        let mixed = vec![
            parsed(AssetKind::Stable, dec!(100), dec!(2), dec!(1)),
            parsed(AssetKind::Native, dec!(1), dec!(2), dec!(0)),
        ];
        assert!(matches!(require_price(&mixed, None), Err(PipelineError::Conversion(_))));
    }

    #[test]
    fn test_finalize_derives_margin_in_value_unit() {
        let price = ReferencePrice::new(dec!(3000)).unwrap();
        let r = finalize(&parsed(AssetKind::Native, dec!(2), dec!(4), dec!(-0.1)), Some(price)).unwrap();
        assert_eq!(r.size_value, dec!(6000));
        assert_eq!(r.upl_value, dec!(-300));
        assert_eq!(r.margin, dec!(1500));

        let r = finalize(&parsed(AssetKind::Stable, dec!(100), dec!(2), dec!(5)), None).unwrap();
        assert_eq!(r.size_value, dec!(100));
        assert_eq!(r.margin, dec!(50));
    }

    #[test]
    fn test_finalize_guards_zero_leverage() {
        let err = finalize(&parsed(AssetKind::Stable, dec!(100), dec!(0), dec!(0)), None).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRecord { record: 1, .. }));
    }

    #[test]
    fn test_native_overflow_is_an_invalid_record() {
        let price = ReferencePrice::new(dec!(3000)).unwrap();
        let huge = Decimal::MAX / dec!(2);
        assert_eq!(convert(huge, AssetKind::Native, price), None);

        let err = finalize(&parsed(AssetKind::Native, huge, dec!(2), dec!(0)), Some(price)).unwrap_err();
        match err {
            PipelineError::InvalidRecord { record, reason } => {
                assert_eq!(record, 1);
                assert!(reason.starts_with("size"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
