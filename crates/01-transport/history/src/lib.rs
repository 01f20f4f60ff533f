//! Bounded circular history buffer retaining the most recent samples.
//!
//! * [`HistoryRing`] – fixed-capacity, overwrite-oldest store with logical
//!   indexing and an independent scrub cursor.
//! * [`HistoryError`] – lightweight error surface for construction failures.

mod error;
mod ring;


pub use error::{HistoryError, HistoryResult};
pub use ring::HistoryRing;
