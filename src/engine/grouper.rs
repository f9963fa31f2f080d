//! # engine::grouper
//!
//! **Record Grouper** — cuts the scraped line stream into one group per
//! position.
//!
//! The dashboard renders each position as six consecutive lines:
//!
//! ```text
//! ↑ETH-PERP        ← product + direction sigil
//! 3,120.50         ← price
//! 1.25Ξ            ← size + asset sigil
//! 5.00x            ← leverage
//! -0.0412Ξ         ← unrealized P&L
//! $2,640.10        ← est. liquidation price
//! ```

use crate::error::PipelineError;

/// Number of text lines per position on the dashboard.
pub const RECORD_WIDTH: usize = 6;

/// Six positional text fields of one dashboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGroup {
    /// 1-based position of the group in the snapshot.
    pub index:     usize,
    pub product:   String,
    pub price:     String,
    pub size:      String,
    pub leverage:  String,
    pub upl:       String,
    pub liq_price: String,
}

/// Split the snapshot text into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Partition `lines` into [`RawGroup`]s, preserving order.
///
/// A line count that is not a multiple of [`RECORD_WIDTH`] is reported as a
/// [`PipelineError::GroupingDefect`]; the trailing partial group is never
/// dropped or padded.
pub fn group_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<RawGroup>, PipelineError> {
    let remainder = lines.len() % RECORD_WIDTH;
    if remainder != 0 {
        return Err(PipelineError::GroupingDefect {
            lines: lines.len(),
            width: RECORD_WIDTH,
            remainder,
        });
    }

    let groups = lines
        .chunks_exact(RECORD_WIDTH)
        .enumerate()
        .map(|(i, chunk)| RawGroup {
            index:     i + 1,
            product:   chunk[0].as_ref().to_string(),
            price:     chunk[1].as_ref().to_string(),
            size:      chunk[2].as_ref().to_string(),
            leverage:  chunk[3].as_ref().to_string(),
            upl:       chunk[4].as_ref().to_string(),
            liq_price: chunk[5].as_ref().to_string(),
        })
        .collect();

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line{i}")).collect()
    }

    #[test]
    fn test_multiple_of_six_yields_k_groups() {
        for k in 0..5 {
            let groups = group_lines(&lines(6 * k)).unwrap();
            assert_eq!(groups.len(), k);
        }
    }

    #[test]
    fn test_groups_preserve_order_and_positions() {
        let groups = group_lines(&lines(12)).unwrap();
        assert_eq!(groups[0].index, 1);
        assert_eq!(groups[0].product, "line0");
        assert_eq!(groups[0].liq_price, "line5");
        assert_eq!(groups[1].index, 2);
        assert_eq!(groups[1].product, "line6");
        assert_eq!(groups[1].size, "line8");
    }

    #[test]
    fn test_partial_trailing_group_is_a_defect() {
        for n in [1, 5, 7, 13, 17] {
            let err = group_lines(&lines(n)).unwrap_err();
            assert_eq!(
                err,
                PipelineError::GroupingDefect { lines: n, width: 6, remainder: n % 6 }
            );
        }
    }

    #[test]
    fn test_split_lines_drops_blank_lines_and_padding() {
        let text = "\n  ↑ETH-PERP \n3,000\n\n1Ξ\r\n2x\n0Ξ\n$1,500\n\n";
        assert_eq!(split_lines(text), vec!["↑ETH-PERP", "3,000", "1Ξ", "2x", "0Ξ", "$1,500"]);
    }
}
