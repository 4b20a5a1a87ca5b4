//! Core domain logic for the clergy duty roster.
//! This crate is the single source of truth for the no-overlap invariant.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::period::{
    DateRange, DutyPeriod, DutyRole, PeriodId, PeriodInput, PeriodValidationError, PriestRef,
};
pub use model::priest::{Priest, PriestId, PriestValidationError};
pub use repo::period_repo::{PeriodRepository, PeriodWriter, SqlitePeriodRepository};
pub use repo::priest_repo::{PriestRepository, SqlitePriestRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::interval_index::{IntervalIndex, PeriodSpan};
pub use schedule::range_query::{PeriodFilter, RangeQuery};
pub use service::priest_service::{PriestService, PriestServiceError};
pub use service::schedule_service::{PeriodConflict, ScheduleError, ScheduleService};

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
