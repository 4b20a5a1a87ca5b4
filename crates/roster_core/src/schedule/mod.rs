//! Scheduling engine: conflict detection and range queries.
//!
//! # Responsibility
//! - Own the "no two stored periods overlap" check (`IntervalIndex`).
//! - Own filter composition for period reads (`RangeQuery`).
//!
//! # Invariants
//! - Engine code is pure: no storage access and no logging.

pub mod interval_index;
pub mod range_query;
