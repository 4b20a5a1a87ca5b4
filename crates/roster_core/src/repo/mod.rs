//! Repository layer: roster persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the data access contracts used by roster services.
//! - Keep SQL details out of the scheduling engine and services.
//!
//! # Invariants
//! - Read paths reject malformed persisted rows instead of masking them.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateName`)
//!   alongside store transport errors.

use crate::db::DbError;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod period_repo;
pub mod priest_repo;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by priest and period storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Update/delete target row does not exist.
    NotFound(Uuid),
    /// Unique priest name constraint rejected the write.
    DuplicateName(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateName(name) => write!(f, "priest name already exists: `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn ensure_table(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table))
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date value `{value}` in {column}")))
}

#[cfg(test)]
mod tests {
    use super::{date_to_db, parse_date, RepoError};
    use chrono::NaiveDate;

    #[test]
    fn dates_are_stored_as_sortable_iso_text() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
        assert_eq!(date_to_db(date), "2025-08-01");
        assert!(date_to_db(date) < "2025-08-10".to_string());
    }

    #[test]
    fn parse_date_rejects_non_iso_values() {
        let err = parse_date("01.08.2025", "duty_periods.start_date").unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("start_date")));
    }
}
