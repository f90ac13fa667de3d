//! Figure aggregation.
//!
//! Turns cleaned record sets into the chart descriptions shown on the
//! dashboard.

pub mod aggregator;

pub use aggregator::*;
