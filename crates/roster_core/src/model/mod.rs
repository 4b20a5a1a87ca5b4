//! Domain model for the duty roster.
//!
//! # Responsibility
//! - Define priests and duty periods as used by the scheduling engine.
//! - Validate write inputs before they reach storage or the interval index.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - A duty period covers a closed, non-inverted date range.

pub mod period;
pub mod priest;
