//! # error
//!
//! Centralised pipeline error type.
//!
//! Every stage of the extraction-to-metrics pipeline returns
//! `Result<_, PipelineError>`.  All variants are terminal for the current run:
//! the pipeline never retries, skips or pads, and no report is produced once
//! one of these has been raised.

use thiserror::Error;

use crate::models::Scope;

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// A text field could not be coerced into a number.
    #[error("record #{record}: cannot parse {field} from {text:?}")]
    Parse {
        /// 1-based position of the record in the snapshot.
        record: usize,
        field:  &'static str,
        text:   String,
    },

    /// A record is structurally invalid (e.g. leverage <= 0).
    #[error("record #{record}: {reason}")]
    InvalidRecord { record: usize, reason: String },

    /// An aggregation scope has records but their margins sum to zero.
    #[error("scope {scope}: margin sum is zero, weighted leverage is undefined")]
    DegenerateScope { scope: Scope },

    /// A sum or product left the range a `Decimal` can hold.
    #[error("scope {scope}: {metric} overflows")]
    Overflow { scope: Scope, metric: &'static str },

    /// No usable reference price while native-asset records need converting.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Line count is not a multiple of the record width.
    #[error("grouping defect: {lines} lines is not a multiple of {width} (trailing group has {remainder} lines)")]
    GroupingDefect {
        lines:     usize,
        width:     usize,
        remainder: usize,
    },
}

impl PipelineError {
    /// Short machine-friendly kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Parse { .. } => "parse",
            PipelineError::InvalidRecord { .. }
            | PipelineError::DegenerateScope { .. }
            | PipelineError::Overflow { .. } => "data",
            PipelineError::Conversion(_) => "conversion",
            PipelineError::GroupingDefect { .. } => "grouping",
        }
    }
}
