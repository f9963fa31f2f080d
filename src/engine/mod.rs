//! Extraction-to-metrics stages, leaf-first:
//! grouper → normalizer → converter → aggregator.

pub mod aggregator;
pub mod converter;
pub mod grouper;
pub mod normalizer;
