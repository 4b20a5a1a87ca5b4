//! Duty period model.
//!
//! # Responsibility
//! - Define the closed date range used by conflict detection and queries.
//! - Define the stored duty period record and its write input.
//!
//! # Invariants
//! - `DateRange` is never inverted (`start <= end`).
//! - Two ranges overlap iff neither ends before the other begins.
//! - Dates fall in years `0..=9999`, where ISO text order equals date order.
//! - Each period names exactly three priests, one per `DutyRole`.

use crate::model::priest::PriestId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a duty period.
pub type PeriodId = Uuid;

/// Earliest and latest years whose `YYYY-MM-DD` form is four digits.
const MIN_STORABLE_YEAR: i32 = 0;
const MAX_STORABLE_YEAR: i32 = 9999;

/// Rejects dates whose ISO text would not sort in date order.
pub fn ensure_storable_date(date: NaiveDate) -> Result<NaiveDate, PeriodValidationError> {
    if (MIN_STORABLE_YEAR..=MAX_STORABLE_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(PeriodValidationError::DateOutOfRange(date))
    }
}

/// Closed whole-date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `start > end` and unstorable years.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodValidationError> {
        ensure_storable_date(start)?;
        ensure_storable_date(end)?;
        if start > end {
            return Err(PeriodValidationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Closed-interval intersection test. Touching endpoints overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// The three duty roles filled for every period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DutyRole {
    Serving,
    ChurchDuty,
    CityDuty,
}

impl DutyRole {
    pub const ALL: [DutyRole; 3] = [Self::Serving, Self::ChurchDuty, Self::CityDuty];

    /// External field name used by callers and serialized records.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Serving => "servingPriest",
            Self::ChurchDuty => "churchDutyPriest",
            Self::CityDuty => "cityDutyPriest",
        }
    }
}

/// Priest reference attached to a period for output.
///
/// `name` is `None` when the referenced priest no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriestRef {
    pub id: PriestId,
    pub name: Option<String>,
}

impl PriestRef {
    pub fn is_dangling(&self) -> bool {
        self.name.is_none()
    }
}

/// Stored duty period with priest names resolved.
///
/// Output-only: records are built from validated storage rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyPeriod {
    pub id: PeriodId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub serving_priest: PriestRef,
    pub church_duty_priest: PriestRef,
    pub city_duty_priest: PriestRef,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl DutyPeriod {
    /// Date range covered by this period.
    ///
    /// Records loaded from storage are validated on read, so the range is
    /// never inverted here.
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn priest(&self, role: DutyRole) -> &PriestRef {
        match role {
            DutyRole::Serving => &self.serving_priest,
            DutyRole::ChurchDuty => &self.church_duty_priest,
            DutyRole::CityDuty => &self.city_duty_priest,
        }
    }

    /// Returns whether `priest_id` fills any of the three roles.
    pub fn involves(&self, priest_id: PriestId) -> bool {
        DutyRole::ALL
            .iter()
            .any(|role| self.priest(*role).id == priest_id)
    }
}

/// Write input for creating or fully replacing a duty period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub serving_priest: PriestId,
    pub church_duty_priest: PriestId,
    pub city_duty_priest: PriestId,
}

impl PeriodInput {
    /// Convenience constructor for the common "same priest fills every role"
    /// case.
    pub fn single_priest(start_date: NaiveDate, end_date: NaiveDate, priest: PriestId) -> Self {
        Self {
            start_date,
            end_date,
            serving_priest: priest,
            church_duty_priest: priest,
            city_duty_priest: priest,
        }
    }

    pub fn priest(&self, role: DutyRole) -> PriestId {
        match role {
            DutyRole::Serving => self.serving_priest,
            DutyRole::ChurchDuty => self.church_duty_priest,
            DutyRole::CityDuty => self.city_duty_priest,
        }
    }

    /// Checks shape-level rules and returns the validated range.
    ///
    /// # Errors
    /// - `DateOutOfRange` when a date lies outside years `0..=9999`.
    /// - `InvertedRange` when `start_date > end_date`.
    /// - `MissingPriest` when a role holds the nil UUID.
    pub fn validate(&self) -> Result<DateRange, PeriodValidationError> {
        let range = DateRange::new(self.start_date, self.end_date)?;
        for role in DutyRole::ALL {
            if self.priest(role).is_nil() {
                return Err(PeriodValidationError::MissingPriest(role));
            }
        }
        Ok(range)
    }
}

/// Rejection reasons for period input and range queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodValidationError {
    DateOutOfRange(NaiveDate),
    InvertedRange { start: NaiveDate, end: NaiveDate },
    MissingPriest(DutyRole),
    UnknownPriest { role: DutyRole, priest_id: PriestId },
}

impl Display for PeriodValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateOutOfRange(date) => {
                write!(f, "date {date} is outside the supported years 0000-9999")
            }
            Self::InvertedRange { start, end } => {
                write!(f, "startDate {start} is after endDate {end}")
            }
            Self::MissingPriest(role) => write!(f, "{} is required", role.field_name()),
            Self::UnknownPriest { role, priest_id } => {
                write!(f, "{} references unknown priest {priest_id}", role.field_name())
            }
        }
    }
}

impl Error for PeriodValidationError {}
