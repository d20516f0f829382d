use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The three kinds of rows the store holds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    FamilyMember,
    Category,
    Task,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FamilyMember => "family member",
            Self::Category => "category",
            Self::Task => "task",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Self::FamilyMember => "family_members",
            Self::Category => "categories",
            Self::Task => "tasks",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input rejected before any row is written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} cannot be null")]
    NotNullable { field: &'static str },
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),
    #[error("{entity} with id {id} does not exist")]
    MissingReference { entity: EntityKind, id: i64 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} with id {id} not found")]
    NotFound { entity: EntityKind, id: i64 },
    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    #[error("no data directory available for the default database")]
    NoDataDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database connection lock poisoned")]
    LockPoisoned,
}

impl Error {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// True for failures of the storage layer itself, as opposed to bad input
    /// or a missing update target.
    pub fn is_store(&self) -> bool {
        !matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }
}
