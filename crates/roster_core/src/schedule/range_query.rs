//! Range query model for duty-period reads.
//!
//! # Responsibility
//! - Describe "which periods are relevant" under three optional filters.
//! - Decompose a query into independent filters that storage can push down
//!   and that can be evaluated in memory.
//!
//! # Invariants
//! - All present filters AND together; an empty query matches everything.
//! - Results are ordered by ascending start date, ties in storage order.

use crate::model::period::{ensure_storable_date, DutyPeriod, PeriodValidationError};
use crate::model::priest::PriestId;
use chrono::NaiveDate;

/// Optional bounds plus optional priest filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeQuery {
    /// Keep periods not entirely finished before this date.
    pub start_date: Option<NaiveDate>,
    /// Keep periods not entirely starting after this date.
    pub end_date: Option<NaiveDate>,
    /// Keep periods where this priest fills any role.
    pub priest_id: Option<PriestId>,
}

/// One atomic predicate of a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFilter {
    /// `period.end_date >= date`
    EndsOnOrAfter(NaiveDate),
    /// `period.start_date <= date`
    StartsOnOrBefore(NaiveDate),
    /// Priest is serving, church-duty or city-duty.
    InvolvesPriest(PriestId),
}

impl PeriodFilter {
    pub fn matches(&self, period: &DutyPeriod) -> bool {
        match *self {
            Self::EndsOnOrAfter(date) => period.end_date >= date,
            Self::StartsOnOrBefore(date) => period.start_date <= date,
            Self::InvolvesPriest(priest_id) => period.involves(priest_id),
        }
    }
}

impl RangeQuery {
    /// Query window `[start_date, end_date]` with no priest filter.
    pub fn window(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            priest_id: None,
        }
    }

    /// Query for every period a priest takes part in.
    pub fn for_priest(priest_id: PriestId) -> Self {
        Self {
            priest_id: Some(priest_id),
            ..Self::default()
        }
    }

    /// Rejects unstorable bounds and a window whose start lies after its end.
    pub fn validate(&self) -> Result<(), PeriodValidationError> {
        for bound in [self.start_date, self.end_date].into_iter().flatten() {
            ensure_storable_date(bound)?;
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => {
                Err(PeriodValidationError::InvertedRange { start, end })
            }
            _ => Ok(()),
        }
    }

    /// Breaks the query into its filters.
    ///
    /// Both bounds together produce the closed-interval intersection test
    /// `start_date <= end AND end_date >= start`.
    pub fn filters(&self) -> Vec<PeriodFilter> {
        let mut filters = Vec::with_capacity(3);
        if let Some(start) = self.start_date {
            filters.push(PeriodFilter::EndsOnOrAfter(start));
        }
        if let Some(end) = self.end_date {
            filters.push(PeriodFilter::StartsOnOrBefore(end));
        }
        if let Some(priest_id) = self.priest_id {
            filters.push(PeriodFilter::InvolvesPriest(priest_id));
        }
        filters
    }

    pub fn matches(&self, period: &DutyPeriod) -> bool {
        self.filters().iter().all(|filter| filter.matches(period))
    }

    /// Applies the query to periods given in storage order.
    pub fn select(&self, periods: impl IntoIterator<Item = DutyPeriod>) -> Vec<DutyPeriod> {
        let filters = self.filters();
        let mut selected: Vec<DutyPeriod> = periods
            .into_iter()
            .filter(|period| filters.iter().all(|filter| filter.matches(period)))
            .collect();
        selected.sort_by_key(|period| period.start_date);
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::{PeriodFilter, RangeQuery};
    use crate::model::period::{DutyPeriod, PriestRef};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
    }

    fn priest_ref(id: Uuid) -> PriestRef {
        PriestRef {
            id,
            name: Some("test".to_string()),
        }
    }

    fn period(start: &str, end: &str, serving: Uuid, church: Uuid, city: Uuid) -> DutyPeriod {
        DutyPeriod {
            id: Uuid::new_v4(),
            start_date: date(start),
            end_date: date(end),
            serving_priest: priest_ref(serving),
            church_duty_priest: priest_ref(church),
            city_duty_priest: priest_ref(city),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn filters_follow_present_bounds() {
        let start = date("2025-08-01");
        let end = date("2025-08-31");
        let priest = Uuid::new_v4();

        assert!(RangeQuery::default().filters().is_empty());
        assert_eq!(
            RangeQuery::window(start, end).filters(),
            vec![
                PeriodFilter::EndsOnOrAfter(start),
                PeriodFilter::StartsOnOrBefore(end)
            ]
        );
        assert_eq!(
            RangeQuery::for_priest(priest).filters(),
            vec![PeriodFilter::InvolvesPriest(priest)]
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let query = RangeQuery::window(date("2025-08-10"), date("2025-08-01"));
        assert!(query.validate().is_err());
        assert!(RangeQuery::window(date("2025-08-01"), date("2025-08-01"))
            .validate()
            .is_ok());
    }

    #[test]
    fn single_bounds_use_half_open_semantics() {
        let a = Uuid::new_v4();
        let july = period("2025-07-01", "2025-07-10", a, a, a);

        let only_start = RangeQuery {
            start_date: Some(date("2025-07-10")),
            ..RangeQuery::default()
        };
        assert!(only_start.matches(&july));
        let only_start_after = RangeQuery {
            start_date: Some(date("2025-07-11")),
            ..RangeQuery::default()
        };
        assert!(!only_start_after.matches(&july));

        let only_end = RangeQuery {
            end_date: Some(date("2025-07-01")),
            ..RangeQuery::default()
        };
        assert!(only_end.matches(&july));
        let only_end_before = RangeQuery {
            end_date: Some(date("2025-06-30")),
            ..RangeQuery::default()
        };
        assert!(!only_end_before.matches(&july));
    }

    #[test]
    fn priest_filter_checks_every_role() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let entry = period("2025-08-01", "2025-08-07", a, b, c);

        assert!(RangeQuery::for_priest(a).matches(&entry));
        assert!(RangeQuery::for_priest(b).matches(&entry));
        assert!(RangeQuery::for_priest(c).matches(&entry));
        assert!(!RangeQuery::for_priest(d).matches(&entry));
    }

    #[test]
    fn select_orders_by_start_and_keeps_gap_empty() {
        let a = Uuid::new_v4();
        let august = period("2025-08-01", "2025-08-10", a, a, a);
        let july = period("2025-07-01", "2025-07-10", a, a, a);

        let all = RangeQuery::default().select([august.clone(), july.clone()]);
        assert_eq!(all, vec![july.clone(), august.clone()]);

        let gap = RangeQuery::window(date("2025-07-15"), date("2025-07-20"));
        assert!(gap.select([august, july]).is_empty());
    }

    #[test]
    fn widening_window_never_drops_results() {
        let a = Uuid::new_v4();
        let periods = vec![
            period("2025-06-25", "2025-07-02", a, a, a),
            period("2025-07-05", "2025-07-06", a, a, a),
            period("2025-07-20", "2025-08-02", a, a, a),
            period("2025-09-01", "2025-09-03", a, a, a),
        ];
        let narrow = RangeQuery::window(date("2025-07-01"), date("2025-07-21"));
        let wide = RangeQuery::window(date("2025-06-01"), date("2025-08-31"));

        let narrow_ids: Vec<Uuid> = narrow.select(periods.clone()).iter().map(|p| p.id).collect();
        let wide_ids: Vec<Uuid> = wide.select(periods).iter().map(|p| p.id).collect();
        assert_eq!(narrow_ids.len(), 3);
        assert!(narrow_ids.iter().all(|id| wide_ids.contains(id)));
    }
}
