//! Priest directory use-case service.
//!
//! # Responsibility
//! - Register, rename, delete and list priests.
//! - Normalize names before they reach storage.
//!
//! # Invariants
//! - Names are trimmed and non-empty; uniqueness is reported as
//!   `DuplicateName`.
//! - Deleting a priest leaves duty periods untouched; their references to
//!   the priest become dangling.

use crate::model::priest::{normalize_priest_name, Priest, PriestId, PriestValidationError};
use crate::repo::priest_repo::PriestRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for priest directory use-cases.
#[derive(Debug)]
pub enum PriestServiceError {
    Validation(PriestValidationError),
    /// Another priest already uses this name.
    DuplicateName(String),
    PriestNotFound(PriestId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for PriestServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "priest with name `{name}` already exists"),
            Self::PriestNotFound(id) => write!(f, "priest not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent priest state: {details}"),
        }
    }
}

impl Error for PriestServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PriestServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::PriestNotFound(id),
            RepoError::DuplicateName(name) => Self::DuplicateName(name),
            other => Self::Repo(other),
        }
    }
}

impl From<PriestValidationError> for PriestServiceError {
    fn from(value: PriestValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Priest directory facade over repository implementations.
pub struct PriestService<R: PriestRepository> {
    repo: R,
}

impl<R: PriestRepository> PriestService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new priest under a unique name.
    pub fn register(&self, name: &str) -> Result<Priest, PriestServiceError> {
        let name = normalize_priest_name(name)?;
        let id = Uuid::new_v4();
        self.repo.insert_priest(id, &name)?;
        self.read_back(id, "registered priest not found in read-back")
    }

    /// Renames an existing priest. Renaming to the current name succeeds.
    pub fn rename(&self, id: PriestId, name: &str) -> Result<Priest, PriestServiceError> {
        let name = normalize_priest_name(name)?;
        self.repo.rename_priest(id, &name)?;
        self.read_back(id, "renamed priest not found in read-back")
    }

    /// Deletes a priest without touching duty periods.
    pub fn delete(&self, id: PriestId) -> Result<(), PriestServiceError> {
        Ok(self.repo.delete_priest(id)?)
    }

    pub fn get(&self, id: PriestId) -> Result<Option<Priest>, PriestServiceError> {
        Ok(self.repo.get_priest(id)?)
    }

    /// Lists every priest ordered by name.
    pub fn list(&self) -> Result<Vec<Priest>, PriestServiceError> {
        Ok(self.repo.list_priests()?)
    }

    fn read_back(&self, id: PriestId, details: &'static str) -> Result<Priest, PriestServiceError> {
        self.repo
            .get_priest(id)?
            .ok_or(PriestServiceError::InconsistentState(details))
    }
}
