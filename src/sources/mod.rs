//! External collaborators: the scraped dashboard text and the price quote.

pub mod price;
pub mod snapshot;

pub use price::{fetch_native_price, into_reference_price};
pub use snapshot::fetch_snapshot;
