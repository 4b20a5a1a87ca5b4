//! Duty period repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist duty periods and resolve priest names for output.
//! - Push range-query filters down into SQL.
//! - Provide an atomic write scope so "check conflict, then commit" is a
//!   single logical step.
//!
//! # Invariants
//! - Every write scope runs in one `BEGIN IMMEDIATE` transaction; the write
//!   lock is held before the first read, so two scopes never interleave.
//! - A scope whose operation fails is rolled back.
//! - Priest references are resolved with `LEFT JOIN`; a deleted priest
//!   yields a dangling reference rather than a missing row.

use super::{date_to_db, ensure_table, parse_date, parse_uuid, RepoError, RepoResult};
use crate::model::period::{DateRange, DutyPeriod, PeriodId, PeriodInput, PriestRef};
use crate::model::priest::PriestId;
use crate::schedule::interval_index::PeriodSpan;
use crate::schedule::range_query::{PeriodFilter, RangeQuery};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

const PERIOD_SELECT_SQL: &str = "SELECT
    p.uuid AS uuid,
    p.start_date AS start_date,
    p.end_date AS end_date,
    p.serving_priest AS serving_priest,
    sp.name AS serving_priest_name,
    p.church_duty_priest AS church_duty_priest,
    cp.name AS church_duty_priest_name,
    p.city_duty_priest AS city_duty_priest,
    yp.name AS city_duty_priest_name,
    p.created_at AS created_at,
    p.updated_at AS updated_at
FROM duty_periods p
LEFT JOIN priests sp ON sp.uuid = p.serving_priest
LEFT JOIN priests cp ON cp.uuid = p.church_duty_priest
LEFT JOIN priests yp ON yp.uuid = p.city_duty_priest";

/// Storage operations available inside an atomic write scope.
pub trait PeriodWriter {
    /// Loads every stored span in storage iteration order.
    fn load_spans(&self) -> RepoResult<Vec<PeriodSpan>>;
    fn period_exists(&self, id: PeriodId) -> RepoResult<bool>;
    fn priest_exists(&self, id: PriestId) -> RepoResult<bool>;
    fn insert_period(&self, id: PeriodId, input: &PeriodInput) -> RepoResult<()>;
    /// Overwrites dates and all three priest references.
    fn update_period(&self, id: PeriodId, input: &PeriodInput) -> RepoResult<()>;
    fn delete_period(&self, id: PeriodId) -> RepoResult<()>;
}

/// Repository interface for duty periods.
pub trait PeriodRepository {
    fn get_period(&self, id: PeriodId) -> RepoResult<Option<DutyPeriod>>;
    /// Returns matching periods ordered by start date, ties in storage order.
    fn query_periods(&self, query: &RangeQuery) -> RepoResult<Vec<DutyPeriod>>;
    /// Runs `op` atomically; commits only when it returns `Ok`.
    fn write_atomically<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&dyn PeriodWriter) -> Result<T, E>;
}

/// SQLite-backed duty period repository.
pub struct SqlitePeriodRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePeriodRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_table(conn, "priests")?;
        ensure_table(conn, "duty_periods")?;
        Ok(Self { conn })
    }
}

impl PeriodRepository for SqlitePeriodRepository<'_> {
    fn get_period(&self, id: PeriodId) -> RepoResult<Option<DutyPeriod>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERIOD_SELECT_SQL} WHERE p.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_period_row(row)?)),
            None => Ok(None),
        }
    }

    fn query_periods(&self, query: &RangeQuery) -> RepoResult<Vec<DutyPeriod>> {
        let mut sql = format!("{PERIOD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        for filter in query.filters() {
            match filter {
                PeriodFilter::EndsOnOrAfter(date) => {
                    sql.push_str(" AND p.end_date >= ?");
                    bind_values.push(Value::Text(date_to_db(date)));
                }
                PeriodFilter::StartsOnOrBefore(date) => {
                    sql.push_str(" AND p.start_date <= ?");
                    bind_values.push(Value::Text(date_to_db(date)));
                }
                PeriodFilter::InvolvesPriest(priest_id) => {
                    sql.push_str(
                        " AND (p.serving_priest = ? OR p.church_duty_priest = ? OR p.city_duty_priest = ?)",
                    );
                    let id_text = priest_id.to_string();
                    for _ in 0..3 {
                        bind_values.push(Value::Text(id_text.clone()));
                    }
                }
            }
        }

        sql.push_str(" ORDER BY p.start_date ASC, p.rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut periods = Vec::new();
        while let Some(row) = rows.next()? {
            periods.push(parse_period_row(row)?);
        }
        Ok(periods)
    }

    fn write_atomically<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&dyn PeriodWriter) -> Result<T, E>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let output = op(&SqlitePeriodWriter { conn: &*tx })?;
        tx.commit().map_err(RepoError::from)?;
        Ok(output)
    }
}

struct SqlitePeriodWriter<'tx> {
    conn: &'tx Connection,
}

impl PeriodWriter for SqlitePeriodWriter<'_> {
    fn load_spans(&self) -> RepoResult<Vec<PeriodSpan>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, start_date, end_date FROM duty_periods ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut spans = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let id = parse_uuid(&uuid_text, "duty_periods.uuid")?;
            spans.push(PeriodSpan::new(id, parse_row_range(row, &uuid_text)?));
        }
        Ok(spans)
    }

    fn period_exists(&self, id: PeriodId) -> RepoResult<bool> {
        row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM duty_periods WHERE uuid = ?1);",
            id,
        )
    }

    fn priest_exists(&self, id: PriestId) -> RepoResult<bool> {
        row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM priests WHERE uuid = ?1);",
            id,
        )
    }

    fn insert_period(&self, id: PeriodId, input: &PeriodInput) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO duty_periods (
                uuid,
                start_date,
                end_date,
                serving_priest,
                church_duty_priest,
                city_duty_priest
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                date_to_db(input.start_date),
                date_to_db(input.end_date),
                input.serving_priest.to_string(),
                input.church_duty_priest.to_string(),
                input.city_duty_priest.to_string(),
            ],
        )?;
        Ok(())
    }

    fn update_period(&self, id: PeriodId, input: &PeriodInput) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE duty_periods
             SET
                start_date = ?2,
                end_date = ?3,
                serving_priest = ?4,
                church_duty_priest = ?5,
                city_duty_priest = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                date_to_db(input.start_date),
                date_to_db(input.end_date),
                input.serving_priest.to_string(),
                input.church_duty_priest.to_string(),
                input.city_duty_priest.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_period(&self, id: PeriodId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM duty_periods WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn row_exists(conn: &Connection, sql: &str, id: uuid::Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id.to_string()], |row| row.get(0))?;
    Ok(exists == 1)
}

fn parse_row_range(row: &Row<'_>, uuid_text: &str) -> RepoResult<DateRange> {
    let start: String = row.get("start_date")?;
    let end: String = row.get("end_date")?;
    let start = parse_date(&start, "duty_periods.start_date")?;
    let end = parse_date(&end, "duty_periods.end_date")?;
    DateRange::new(start, end).map_err(|_| {
        RepoError::InvalidData(format!(
            "inverted date range {start} - {end} for period `{uuid_text}`"
        ))
    })
}

fn parse_priest_ref(row: &Row<'_>, column: &'static str) -> RepoResult<PriestRef> {
    let id_text: String = row.get(column)?;
    let name: Option<String> = row.get(format!("{column}_name").as_str())?;
    Ok(PriestRef {
        id: parse_uuid(&id_text, column)?,
        name,
    })
}

fn parse_period_row(row: &Row<'_>) -> RepoResult<DutyPeriod> {
    let uuid_text: String = row.get("uuid")?;
    let range = parse_row_range(row, &uuid_text)?;

    Ok(DutyPeriod {
        id: parse_uuid(&uuid_text, "duty_periods.uuid")?,
        start_date: range.start(),
        end_date: range.end(),
        serving_priest: parse_priest_ref(row, "serving_priest")?,
        church_duty_priest: parse_priest_ref(row, "church_duty_priest")?,
        city_duty_priest: parse_priest_ref(row, "city_duty_priest")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
