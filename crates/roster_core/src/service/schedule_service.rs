//! Duty schedule use-case service.
//!
//! # Responsibility
//! - Gate period writes on the no-overlap invariant.
//! - Answer range queries over stored periods.
//!
//! # Invariants
//! - Input validation runs before any conflict check.
//! - Check-then-write happens inside one repository write scope.
//! - Updates exclude the target period from its own conflict check.
//! - Query results are non-decreasing by start date.

use crate::model::period::{
    DateRange, DutyPeriod, DutyRole, PeriodId, PeriodInput, PeriodValidationError,
};
use crate::repo::period_repo::{PeriodRepository, PeriodWriter};
use crate::repo::RepoError;
use crate::schedule::interval_index::IntervalIndex;
use crate::schedule::range_query::RangeQuery;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Existing period that blocks a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodConflict {
    pub period_id: PeriodId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Service error for schedule use-cases.
#[derive(Debug)]
pub enum ScheduleError {
    /// Malformed input; nothing was checked against storage ranges.
    Validation(PeriodValidationError),
    /// Write would overlap the reported period.
    Conflict(PeriodConflict),
    /// Target period does not exist.
    PeriodNotFound(PeriodId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write committed but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid period: {err}"),
            Self::Conflict(conflict) => write!(
                f,
                "schedule already exists for period {} - {}",
                conflict.start_date, conflict.end_date
            ),
            Self::PeriodNotFound(id) => write!(f, "schedule entry not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent schedule state: {details}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ScheduleError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::PeriodNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PeriodValidationError> for ScheduleError {
    fn from(value: PeriodValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Schedule service facade over a period repository.
pub struct ScheduleService<R: PeriodRepository> {
    repo: R,
}

impl<R: PeriodRepository> ScheduleService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the first stored period overlapping `candidate`, skipping
    /// `exclude`.
    pub fn check_conflict(
        &mut self,
        candidate: &DateRange,
        exclude: Option<PeriodId>,
    ) -> Result<Option<PeriodConflict>, ScheduleError> {
        self.repo
            .write_atomically(|writer| -> Result<_, ScheduleError> {
                find_conflict(writer, candidate, exclude)
            })
    }

    /// Creates a period unless it overlaps an existing one.
    ///
    /// # Errors
    /// - `Validation` for inverted ranges or missing/unknown priests.
    /// - `Conflict` naming the first overlapping period.
    pub fn create_period(&mut self, input: &PeriodInput) -> Result<DutyPeriod, ScheduleError> {
        let range = input.validate()?;
        let id = Uuid::new_v4();

        self.repo
            .write_atomically(|writer| -> Result<(), ScheduleError> {
                ensure_priests_exist(writer, input)?;
                if let Some(conflict) = find_conflict(writer, &range, None)? {
                    return Err(ScheduleError::Conflict(conflict));
                }
                writer.insert_period(id, input)?;
                Ok(())
            })?;

        self.read_back(id, "created period not found in read-back")
    }

    /// Replaces dates and all priest assignments of an existing period.
    ///
    /// # Errors
    /// - `Validation` before anything else.
    /// - `PeriodNotFound` when `id` is absent.
    /// - `Conflict` when the new range overlaps another period.
    pub fn update_period(
        &mut self,
        id: PeriodId,
        input: &PeriodInput,
    ) -> Result<DutyPeriod, ScheduleError> {
        let range = input.validate()?;

        self.repo
            .write_atomically(|writer| -> Result<(), ScheduleError> {
                if !writer.period_exists(id)? {
                    return Err(ScheduleError::PeriodNotFound(id));
                }
                ensure_priests_exist(writer, input)?;
                if let Some(conflict) = find_conflict(writer, &range, Some(id))? {
                    return Err(ScheduleError::Conflict(conflict));
                }
                writer.update_period(id, input)?;
                Ok(())
            })?;

        self.read_back(id, "updated period not found in read-back")
    }

    /// Removes a period. Removal cannot create overlap, so no check runs.
    pub fn delete_period(&mut self, id: PeriodId) -> Result<(), ScheduleError> {
        self.repo
            .write_atomically(|writer| -> Result<(), ScheduleError> {
                writer.delete_period(id)?;
                Ok(())
            })
    }

    /// Gets one period with priest names resolved.
    pub fn get_period(&self, id: PeriodId) -> Result<Option<DutyPeriod>, ScheduleError> {
        Ok(self.repo.get_period(id)?)
    }

    /// Lists periods matching `query`, ordered by ascending start date.
    ///
    /// # Errors
    /// - `Validation` when both bounds are present and inverted.
    pub fn query_periods(&self, query: &RangeQuery) -> Result<Vec<DutyPeriod>, ScheduleError> {
        query.validate()?;
        Ok(self.repo.query_periods(query)?)
    }

    fn read_back(&self, id: PeriodId, details: &'static str) -> Result<DutyPeriod, ScheduleError> {
        self.repo
            .get_period(id)?
            .ok_or(ScheduleError::InconsistentState(details))
    }
}

fn find_conflict(
    writer: &dyn PeriodWriter,
    candidate: &DateRange,
    exclude: Option<PeriodId>,
) -> Result<Option<PeriodConflict>, ScheduleError> {
    let index = IntervalIndex::from_spans(writer.load_spans()?);
    Ok(index
        .check_conflict(candidate, exclude)
        .map(|span| PeriodConflict {
            period_id: span.id,
            start_date: span.range.start(),
            end_date: span.range.end(),
        }))
}

fn ensure_priests_exist(writer: &dyn PeriodWriter, input: &PeriodInput) -> Result<(), ScheduleError> {
    for role in DutyRole::ALL {
        let priest_id = input.priest(role);
        if !writer.priest_exists(priest_id)? {
            return Err(ScheduleError::Validation(
                PeriodValidationError::UnknownPriest { role, priest_id },
            ));
        }
    }
    Ok(())
}
