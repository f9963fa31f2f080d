//! # engine::aggregator
//!
//! **Metrics Aggregator** — three passes over the finalized records, each
//! reported over the nine scopes of [`Scope::ORDER`].
//!
//! ```text
//! Open Interest     Σ size_value                     per scope
//! Total UPL         Σ upl_value                      per scope (signed)
//! Average Leverage  Σ(leverage·margin) / Σ margin    per scope
//! ```
//!
//! Sums over an empty scope are a defined zero. The weighted average over an
//! empty scope is [`MetricValue::Undefined`]; a non-empty scope whose margins
//! sum to zero is a [`PipelineError::DegenerateScope`]. All arithmetic is
//! checked; leaving the `Decimal` range is a [`PipelineError::Overflow`].

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::PipelineError;
use crate::models::{AssetNames, MetricKind, MetricRow, MetricValue, MetricsTable, PositionRecord, Scope};

fn in_scope(records: &[PositionRecord], scope: Scope) -> impl Iterator<Item = &PositionRecord> {
    records.iter().filter(move |r| scope.matches(r))
}

fn label(kind: MetricKind, scope: Scope, names: &AssetNames) -> String {
    match scope {
        Scope::All => kind.title().to_string(),
        other => format!("{} {}", kind.title(), other.suffix(names)),
    }
}

/// Checked Σ of `field` over `scope`.
fn scope_sum<F>(records: &[PositionRecord], scope: Scope, kind: MetricKind, field: F) -> Result<Decimal, PipelineError>
where
    F: Fn(&PositionRecord) -> Decimal,
{
    in_scope(records, scope)
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(field(r)))
        .ok_or(PipelineError::Overflow { scope, metric: kind.title() })
}

fn sum_table<F>(
    records: &[PositionRecord],
    kind: MetricKind,
    names: &AssetNames,
    field: F,
) -> Result<MetricsTable, PipelineError>
where
    F: Fn(&PositionRecord) -> Decimal,
{
    let rows = Scope::ORDER
        .iter()
        .map(|&scope| {
            Ok(MetricRow {
                scope,
                label: label(kind, scope, names),
                value: MetricValue::Value(scope_sum(records, scope, kind, &field)?),
                share_pct: None,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(MetricsTable { kind, rows })
}

// ─── Open Interest ────────────────────────────────────────────────────────────

/// Σ `size_value` per scope, with each row's share of the total.
pub fn open_interest(records: &[PositionRecord], names: &AssetNames) -> Result<MetricsTable, PipelineError> {
    let mut table = sum_table(records, MetricKind::OpenInterest, names, |r| r.size_value)?;

    let total = table.get(Scope::All).as_decimal().unwrap_or(Decimal::ZERO);
    for row in &mut table.rows {
        row.share_pct = row
            .value
            .as_decimal()
            .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|v| v.checked_div(total));
    }
    Ok(table)
}

// ─── Unrealized P&L ───────────────────────────────────────────────────────────

/// Σ `upl_value` per scope. Losses stay negative.
pub fn unrealized_pnl(records: &[PositionRecord], names: &AssetNames) -> Result<MetricsTable, PipelineError> {
    sum_table(records, MetricKind::UnrealizedPnl, names, |r| r.upl_value)
}

// ─── Average Leverage ─────────────────────────────────────────────────────────

/// Margin-weighted mean leverage of the records in `scope`.
pub fn weighted_leverage(records: &[PositionRecord], scope: Scope) -> Result<MetricValue, PipelineError> {
    let (count, weighted, margin) = in_scope(records, scope)
        .try_fold((0usize, Decimal::ZERO, Decimal::ZERO), |(n, w, m), r| {
            Some((n + 1, w.checked_add(r.weighted_leverage()?)?, m.checked_add(r.margin)?))
        })
        .ok_or(PipelineError::Overflow { scope, metric: MetricKind::AverageLeverage.title() })?;

    if count == 0 {
        debug!(%scope, "Empty scope — average leverage undefined");
        return Ok(MetricValue::Undefined);
    }

    weighted
        .checked_div(margin)
        .filter(|_| !margin.is_zero())
        .map(MetricValue::Value)
        .ok_or(PipelineError::DegenerateScope { scope })
}

/// `Σ(leverage·margin) / Σ margin` per scope.
pub fn average_leverage(records: &[PositionRecord], names: &AssetNames) -> Result<MetricsTable, PipelineError> {
    let kind = MetricKind::AverageLeverage;
    let rows = Scope::ORDER
        .iter()
        .map(|&scope| {
            Ok(MetricRow {
                scope,
                label: label(kind, scope, names),
                value: weighted_leverage(records, scope)?,
                share_pct: None,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(MetricsTable { kind, rows })
}
