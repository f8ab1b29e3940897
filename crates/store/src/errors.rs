use std::fmt;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Entity kinds handled by the storage layer, used to tag typed failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Service,
    Endpoint,
    Policy,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Service => write!(f, "service"),
            EntityKind::Endpoint => write!(f, "endpoint"),
            EntityKind::Policy => write!(f, "policy"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("conflict on {kind}: {details}")]
    Conflict { kind: EntityKind, details: String },
    #[error("template error: {0}")]
    Template(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound { kind, id: id.to_owned() }
    }

    pub fn conflict(kind: EntityKind, details: impl Into<String>) -> Self {
        Self::Conflict { kind, details: details.into() }
    }
}

/// Map a read-path database error.
pub(crate) fn db_err(e: DbErr) -> StoreError {
    StoreError::Db(e.to_string())
}

/// Map a write-path database error, translating a uniqueness violation into a
/// typed conflict. Invoked at each mutating call site; every other low-level
/// failure propagates as an opaque database error.
pub(crate) fn write_err(kind: EntityKind, e: DbErr) -> StoreError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(details)) => StoreError::Conflict { kind, details },
        _ => StoreError::Db(e.to_string()),
    }
}
