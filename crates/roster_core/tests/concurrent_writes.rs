use chrono::NaiveDate;
use roster_core::db::open_db;
use roster_core::{
    PeriodInput, PriestService, RangeQuery, ScheduleError, ScheduleService,
    SqlitePeriodRepository, SqlitePriestRepository,
};
use std::sync::{Arc, Barrier};
use std::thread;

const WRITERS: usize = 8;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

#[test]
fn concurrent_overlapping_creates_commit_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.sqlite3");

    let setup = open_db(&path).unwrap();
    let priest = PriestService::new(SqlitePriestRepository::try_new(&setup).unwrap())
        .register("Fr. Ivan")
        .unwrap()
        .id;
    drop(setup);

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|offset| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut conn = open_db(&path).unwrap();
                let mut service =
                    ScheduleService::new(SqlitePeriodRepository::try_new(&mut conn).unwrap());
                // Every candidate contains 2025-08-08, so any two intersect.
                let start = date("2025-08-01") + chrono::Days::new(offset as u64);
                let input = PeriodInput::single_priest(start, date("2025-08-10"), priest);
                service.create_period(&input).map(|period| period.id)
            })
        })
        .collect();

    let outcomes: Vec<Result<_, ScheduleError>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let committed: Vec<_> = outcomes.iter().filter_map(|outcome| outcome.as_ref().ok()).collect();
    assert_eq!(committed.len(), 1);
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert!(matches!(err, ScheduleError::Conflict(_)), "unexpected error: {err}");
        }
    }

    let mut conn = open_db(&path).unwrap();
    let stored = ScheduleService::new(SqlitePeriodRepository::try_new(&mut conn).unwrap())
        .query_periods(&RangeQuery::default())
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(&stored[0].id, committed[0]);
}
