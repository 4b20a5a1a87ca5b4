//! Sorted interval index for duty-period conflict detection.
//!
//! # Responsibility
//! - Answer "which stored period does this candidate range collide with".
//! - Stay independent from storage: built from a snapshot of spans.
//!
//! # Invariants
//! - Spans are ordered by start date; equal starts keep snapshot order.
//! - `max_end[i]` is the latest end date among `spans[..=i]`, so it is
//!   non-decreasing and can be binary searched.
//! - Lookups stay correct when the snapshot itself contains overlapping
//!   spans (rows written before the invariant was enforced).

use crate::model::period::{DateRange, PeriodId};
use chrono::NaiveDate;

/// Identity and date range of one stored period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSpan {
    pub id: PeriodId,
    pub range: DateRange,
}

impl PeriodSpan {
    pub fn new(id: PeriodId, range: DateRange) -> Self {
        Self { id, range }
    }
}

/// Read-only conflict index over a set of period spans.
#[derive(Debug, Clone, Default)]
pub struct IntervalIndex {
    spans: Vec<PeriodSpan>,
    max_end: Vec<NaiveDate>,
}

impl IntervalIndex {
    /// Builds the index from spans in storage iteration order.
    pub fn from_spans(spans: impl IntoIterator<Item = PeriodSpan>) -> Self {
        let mut spans: Vec<PeriodSpan> = spans.into_iter().collect();
        // Stable sort keeps storage order for equal start dates.
        spans.sort_by_key(|span| span.range.start());

        let mut max_end = Vec::with_capacity(spans.len());
        let mut running: Option<NaiveDate> = None;
        for span in &spans {
            let end = running.map_or(span.range.end(), |max| max.max(span.range.end()));
            running = Some(end);
            max_end.push(end);
        }

        Self { spans, max_end }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Spans in index order (ascending start).
    pub fn spans(&self) -> &[PeriodSpan] {
        &self.spans
    }

    /// Returns the first stored span overlapping `candidate`, skipping
    /// `exclude`.
    ///
    /// "First" means earliest start date, then earliest in snapshot order.
    /// The overlap test is the closed-interval one:
    /// `stored.start <= candidate.end && stored.end >= candidate.start`.
    pub fn check_conflict(
        &self,
        candidate: &DateRange,
        exclude: Option<PeriodId>,
    ) -> Option<&PeriodSpan> {
        // Spans at or past `upper` start after the candidate ends.
        let upper = self
            .spans
            .partition_point(|span| span.range.start() <= candidate.end());
        // Every span before `first` ended before the candidate starts.
        let first = self.max_end[..upper].partition_point(|end| *end < candidate.start());

        self.spans[first..upper]
            .iter()
            .filter(|span| Some(span.id) != exclude)
            .find(|span| span.range.end() >= candidate.start())
    }
}

#[cfg(test)]
mod tests {
    use super::{IntervalIndex, PeriodSpan};
    use crate::model::period::DateRange;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).expect("valid test range")
    }

    fn span(start: &str, end: &str) -> PeriodSpan {
        PeriodSpan::new(Uuid::new_v4(), range(start, end))
    }

    fn linear_conflict(
        spans: &[PeriodSpan],
        candidate: &DateRange,
        exclude: Option<Uuid>,
    ) -> Option<Uuid> {
        let mut ordered = spans.to_vec();
        ordered.sort_by_key(|span| span.range.start());
        ordered
            .into_iter()
            .find(|span| Some(span.id) != exclude && span.range.overlaps(candidate))
            .map(|span| span.id)
    }

    #[test]
    fn empty_index_never_conflicts() {
        let index = IntervalIndex::from_spans(Vec::new());
        assert!(index.is_empty());
        assert!(index
            .check_conflict(&range("2025-08-01", "2025-08-07"), None)
            .is_none());
    }

    #[test]
    fn overlapping_candidate_reports_stored_span() {
        let week = span("2025-08-01", "2025-08-07");
        let index = IntervalIndex::from_spans([week]);

        let hit = index
            .check_conflict(&range("2025-08-05", "2025-08-10"), None)
            .expect("overlap should be detected");
        assert_eq!(hit.id, week.id);
    }

    #[test]
    fn adjacent_candidate_does_not_conflict() {
        let index = IntervalIndex::from_spans([span("2025-08-01", "2025-08-07")]);
        assert!(index
            .check_conflict(&range("2025-08-08", "2025-08-14"), None)
            .is_none());
        assert!(index
            .check_conflict(&range("2025-07-20", "2025-07-31"), None)
            .is_none());
    }

    #[test]
    fn shared_endpoint_is_a_conflict() {
        let index = IntervalIndex::from_spans([span("2025-08-01", "2025-08-07")]);
        assert!(index
            .check_conflict(&range("2025-08-07", "2025-08-14"), None)
            .is_some());
    }

    #[test]
    fn excluded_span_does_not_conflict_with_itself() {
        let week = span("2025-08-01", "2025-08-07");
        let index = IntervalIndex::from_spans([week]);

        assert!(index.check_conflict(&week.range, Some(week.id)).is_none());
        assert!(index
            .check_conflict(&range("2025-08-02", "2025-08-08"), Some(week.id))
            .is_none());
    }

    #[test]
    fn exclusion_still_reports_other_overlaps() {
        let first = span("2025-08-01", "2025-08-07");
        let second = span("2025-08-08", "2025-08-14");
        let index = IntervalIndex::from_spans([second, first]);

        let hit = index
            .check_conflict(&range("2025-08-03", "2025-08-09"), Some(first.id))
            .expect("second span still overlaps");
        assert_eq!(hit.id, second.id);
    }

    #[test]
    fn first_conflict_is_earliest_start() {
        let later = span("2025-08-10", "2025-08-12");
        let earlier = span("2025-08-01", "2025-08-03");
        let index = IntervalIndex::from_spans([later, earlier]);

        let hit = index
            .check_conflict(&range("2025-07-01", "2025-09-01"), None)
            .expect("both spans overlap");
        assert_eq!(hit.id, earlier.id);
        assert_eq!(index.spans()[0].id, earlier.id);
    }

    #[test]
    fn legacy_overlapping_spans_are_still_found() {
        // A long span followed by a short one that ends earlier: max_end must
        // keep the long span visible to candidates after the short one.
        let long = span("2025-01-01", "2025-12-31");
        let short = span("2025-02-01", "2025-02-03");
        let index = IntervalIndex::from_spans([long, short]);

        let hit = index
            .check_conflict(&range("2025-06-01", "2025-06-02"), None)
            .expect("long span covers June");
        assert_eq!(hit.id, long.id);
    }

    #[test]
    fn matches_linear_scan_over_mixed_spans() {
        let spans = vec![
            span("2025-01-01", "2025-03-31"),
            span("2025-02-10", "2025-02-12"),
            span("2025-04-01", "2025-04-07"),
            span("2025-04-01", "2025-04-02"),
            span("2025-05-15", "2025-06-15"),
            span("2025-07-01", "2025-07-01"),
        ];
        let index = IntervalIndex::from_spans(spans.clone());

        let candidates = [
            range("2024-12-01", "2024-12-31"),
            range("2025-02-11", "2025-02-11"),
            range("2025-03-31", "2025-04-01"),
            range("2025-04-03", "2025-05-14"),
            range("2025-06-15", "2025-07-01"),
            range("2025-07-02", "2025-08-01"),
        ];
        for candidate in &candidates {
            for exclude in [None, Some(spans[0].id), Some(spans[2].id)] {
                assert_eq!(
                    index.check_conflict(candidate, exclude).map(|s| s.id),
                    linear_conflict(&spans, candidate, exclude),
                    "candidate {candidate} exclude {exclude:?}"
                );
            }
        }
    }

    #[test]
    fn conflict_detection_is_symmetric() {
        let ranges = [
            range("2025-08-01", "2025-08-07"),
            range("2025-08-07", "2025-08-10"),
            range("2025-08-11", "2025-08-11"),
            range("2025-07-01", "2025-08-01"),
        ];
        for a in &ranges {
            for b in &ranges {
                let with_a = IntervalIndex::from_spans([PeriodSpan::new(Uuid::new_v4(), *a)]);
                let with_b = IntervalIndex::from_spans([PeriodSpan::new(Uuid::new_v4(), *b)]);
                assert_eq!(
                    with_a.check_conflict(b, None).is_some(),
                    with_b.check_conflict(a, None).is_some(),
                    "{a} vs {b}"
                );
            }
        }
    }
}
