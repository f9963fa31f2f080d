//! # engine::normalizer
//!
//! **Record Normalizer** — turns one [`RawGroup`] into a [`ParsedPosition`].
//!
//! ## Sigils
//! ```text
//! product  "↑ETH-PERP"  → LONG      (anything else → SHORT)
//! size     "1,250.00$"  → STABLE    (anything else → NATIVE)
//! ```
//! Both classifiers are binary with a default branch. `↓` and `Ξ` are the
//! sigils that select the default branch *knowingly*; a row carrying neither
//! expected sigil is still classified, but flagged as unmarked so the run can
//! warn about it (or reject it in strict mode).

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

use crate::engine::grouper::RawGroup;
use crate::error::PipelineError;
use crate::models::{AssetKind, Direction, ParsedPosition};

pub const LONG_SIGIL: char = '↑';
pub const SHORT_SIGIL: char = '↓';
pub const STABLE_SIGIL: char = '$';
pub const NATIVE_SIGIL: char = 'Ξ';

/// Unit sigils allowed at either end of an amount.
const UNIT_SIGILS: [char; 2] = [STABLE_SIGIL, NATIVE_SIGIL];

// ─── Options ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Reject rows whose sigils are missing instead of defaulting them.
    pub strict_sigils: bool,
}

// ─── Classification ───────────────────────────────────────────────────────────

/// Result of a sigil classifier: the chosen variant, and whether an expected
/// sigil was actually present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<T> {
    pub value:      T,
    pub recognized: bool,
}

/// `↑` → Long. Every other label is Short; only `↓` counts as recognized.
pub fn classify_direction(product: &str) -> Classified<Direction> {
    match product.trim_start().chars().next() {
        Some(LONG_SIGIL)  => Classified { value: Direction::Long,  recognized: true },
        Some(SHORT_SIGIL) => Classified { value: Direction::Short, recognized: true },
        _                 => Classified { value: Direction::Short, recognized: false },
    }
}

/// Trailing `$` → Stable. Every other size is Native; only `Ξ` counts as
/// recognized.
pub fn classify_asset(size: &str) -> Classified<AssetKind> {
    match size.trim_end().chars().last() {
        Some(STABLE_SIGIL) => Classified { value: AssetKind::Stable, recognized: true },
        Some(NATIVE_SIGIL) => Classified { value: AssetKind::Native, recognized: true },
        _                  => Classified { value: AssetKind::Native, recognized: false },
    }
}

/// Product label without its direction sigil.
pub fn strip_direction(product: &str) -> String {
    let trimmed = product.trim();
    trimmed
        .strip_prefix(LONG_SIGIL)
        .or_else(|| trimmed.strip_prefix(SHORT_SIGIL))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

// ─── Numeric coercion ─────────────────────────────────────────────────────────

/// Parse dashboard number text such as `"$2,640.10"`, `"-0.0412Ξ"` or
/// `"+12.5$"`.
///
/// A leading sign, unit sigils at either end and thousands separators are
/// removed, and the Unicode minus is accepted. A sigil inside the digits
/// (`"1$5"`) or any other leftover is a [`PipelineError::Parse`].
pub fn parse_amount(text: &str, record: usize, field: &'static str) -> Result<Decimal, PipelineError> {
    parse_number(text, text, record, field)
}

/// Parse a leverage cell such as `"5.00x"`. The trailing `x` is only
/// accepted here.
pub fn parse_leverage(text: &str, record: usize) -> Result<Decimal, PipelineError> {
    let trimmed = text.trim();
    let body = trimmed.strip_suffix(['x', 'X']).unwrap_or(trimmed);
    parse_number(body, text, record, "leverage")
}

fn parse_number(body: &str, text: &str, record: usize, field: &'static str) -> Result<Decimal, PipelineError> {
    let fail = || PipelineError::Parse { record, field, text: text.to_string() };

    let body = body.trim().replace('\u{2212}', "-");
    let (negative, unsigned) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body.strip_prefix('+').unwrap_or(&body)),
    };
    let signed = unsigned.len() != body.len();

    let digits: String = unsigned
        .trim_start_matches(UNIT_SIGILS)
        .trim_end_matches(UNIT_SIGILS)
        .trim()
        .chars()
        .filter(|&c| c != ',')
        .collect();

    if digits.is_empty() || (signed && digits.starts_with(['+', '-'])) {
        return Err(fail());
    }
    let value = Decimal::from_str(&digits).map_err(|_| fail())?;
    Ok(if negative { -value } else { value })
}

// ─── Normalize ────────────────────────────────────────────────────────────────

/// Interpret one dashboard row.
pub fn normalize(group: &RawGroup, opts: NormalizeOptions) -> Result<ParsedPosition, PipelineError> {
    let record = group.index;

    let direction = classify_direction(&group.product);
    let asset = classify_asset(&group.size);
    let unmarked = !direction.recognized || !asset.recognized;

    if unmarked {
        if opts.strict_sigils {
            return Err(PipelineError::InvalidRecord {
                record,
                reason: format!(
                    "missing sigil (product {:?}, size {:?})",
                    group.product, group.size
                ),
            });
        }
        warn!(
            record,
            product   = %group.product,
            size      = %group.size,
            direction = %direction.value,
            asset     = ?asset.value,
            "⚠️ Row has no recognized sigil — default classification applied"
        );
    }

    let price       = parse_amount(&group.price, record, "price")?;
    let size_native = parse_amount(&group.size, record, "size")?.abs();
    let leverage    = parse_leverage(&group.leverage, record)?;
    let upl_native  = parse_amount(&group.upl, record, "upl")?;
    let liq_price   = parse_amount(&group.liq_price, record, "liq_price")?;

    if leverage <= Decimal::ZERO {
        return Err(PipelineError::InvalidRecord {
            record,
            reason: format!("leverage must be positive, got {leverage}"),
        });
    }

    Ok(ParsedPosition {
        index: record,
        symbol: strip_direction(&group.product),
        direction: direction.value,
        asset: asset.value,
        price,
        size_native,
        leverage,
        upl_native,
        liq_price,
        unmarked,
    })
}

/// Normalize every group, stopping at the first failure.
pub fn normalize_all(groups: &[RawGroup], opts: NormalizeOptions) -> Result<Vec<ParsedPosition>, PipelineError> {
    groups.iter().map(|g| normalize(g, opts)).collect()
}
