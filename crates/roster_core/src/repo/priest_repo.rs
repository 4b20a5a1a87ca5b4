//! Priest directory repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `priests` table.
//! - Translate the unique-name constraint into `RepoError::DuplicateName`.
//!
//! # Invariants
//! - Name uniqueness is enforced atomically by the `UNIQUE` column
//!   constraint, so concurrent registrations cannot both succeed.
//! - Deleting a priest never touches `duty_periods`.

use super::{ensure_table, parse_uuid, RepoError, RepoResult};
use crate::model::priest::{Priest, PriestId};
use rusqlite::{ffi, params, Connection, Row};

const PRIEST_SELECT_SQL: &str = "SELECT uuid, name, created_at, updated_at FROM priests";

/// Repository interface for the priest directory.
pub trait PriestRepository {
    /// Inserts a priest with an already normalized name.
    fn insert_priest(&self, id: PriestId, name: &str) -> RepoResult<()>;
    /// Replaces the name of an existing priest.
    fn rename_priest(&self, id: PriestId, name: &str) -> RepoResult<()>;
    /// Hard-deletes a priest row.
    fn delete_priest(&self, id: PriestId) -> RepoResult<()>;
    fn get_priest(&self, id: PriestId) -> RepoResult<Option<Priest>>;
    /// Lists priests ordered by name, then id.
    fn list_priests(&self) -> RepoResult<Vec<Priest>>;
}

/// SQLite-backed priest repository.
pub struct SqlitePriestRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePriestRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "priests")?;
        Ok(Self { conn })
    }
}

impl PriestRepository for SqlitePriestRepository<'_> {
    fn insert_priest(&self, id: PriestId, name: &str) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO priests (uuid, name) VALUES (?1, ?2);",
                params![id.to_string(), name],
            )
            .map_err(|err| map_name_conflict(err, name))?;
        Ok(())
    }

    fn rename_priest(&self, id: PriestId, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE priests
                 SET
                    name = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![id.to_string(), name],
            )
            .map_err(|err| map_name_conflict(err, name))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_priest(&self, id: PriestId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM priests WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_priest(&self, id: PriestId) -> RepoResult<Option<Priest>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRIEST_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_priest_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_priests(&self) -> RepoResult<Vec<Priest>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRIEST_SELECT_SQL} ORDER BY name ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut priests = Vec::new();
        while let Some(row) = rows.next()? {
            priests.push(parse_priest_row(row)?);
        }
        Ok(priests)
    }
}

fn parse_priest_row(row: &Row<'_>) -> RepoResult<Priest> {
    let uuid_text: String = row.get("uuid")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name for priest `{uuid_text}` in priests.name"
        )));
    }

    Ok(Priest {
        id: parse_uuid(&uuid_text, "priests.uuid")?,
        name,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_name_conflict(err: rusqlite::Error, name: &str) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
            && message.contains("priests.name")
        {
            return RepoError::DuplicateName(name.to_string());
        }
    }
    err.into()
}
