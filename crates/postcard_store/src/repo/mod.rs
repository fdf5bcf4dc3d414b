//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the source image / postcard access contracts.
//! - Keep SQL and transaction handling inside the persistence boundary.
//!
//! # Invariants
//! - Every mutation validates its input and checks references inside the same
//!   IMMEDIATE transaction that performs the write.
//! - Repository APIs return semantic errors (`NotFound`, `ReferentialConflict`)
//!   in addition to DB transport errors.

pub mod postcard_repo;
mod schema;
pub mod source_image_repo;

use crate::config::ConfigError;
use crate::db::DbError;
use crate::model::source_image::SourceImageId;
use crate::model::ValidationError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity kinds addressed by store identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    SourceImage,
    Postcard,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceImage => write!(f, "source image"),
            Self::Postcard => write!(f, "postcard"),
        }
    }
}

/// Reason a write was refused to keep postcard references valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// A postcard write named a source image that does not exist.
    MissingSourceImage(SourceImageId),
    /// A source image delete would orphan this many postcards.
    SourceImageReferenced {
        source_image_id: SourceImageId,
        postcards: u64,
    },
}

/// Error for source image and postcard repository operations.
#[derive(Debug)]
pub enum StoreError {
    /// Malformed alignment code or empty/oversized payload.
    InvalidInput(ValidationError),
    /// No record with this id.
    NotFound { entity: Entity, id: i64 },
    /// Write would break the postcard -> source image reference invariant.
    ReferentialConflict(Conflict),
    /// Repository was handed a config that breaks its invariants.
    Config(ConfigError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted row cannot be converted to a valid model value.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl StoreError {
    /// Short stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::ReferentialConflict(_) => "referential_conflict",
            Self::Config(_) => "invalid_config",
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ReferentialConflict(Conflict::MissingSourceImage(id)) => {
                write!(f, "referential conflict: source image {id} does not exist")
            }
            Self::ReferentialConflict(Conflict::SourceImageReferenced {
                source_image_id,
                postcards,
            }) => write!(
                f,
                "referential conflict: source image {source_image_id} is referenced by {postcards} postcard(s)"
            ),
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "store requires table `{table}`"),
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Logs the failure of a mutating operation, then hands the result back.
pub(crate) fn log_write_failure<T>(event: &'static str, result: StoreResult<T>) -> StoreResult<T> {
    if let Err(err) = &result {
        warn!(
            "event={} module=repo status=error error_code={} error={}",
            event,
            err.code(),
            err
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{log_write_failure, Conflict, Entity, StoreError};
    use crate::config::ConfigError;

    #[test]
    fn failure_logging_passes_results_through() {
        assert_eq!(log_write_failure("source_image_put", Ok(3)).unwrap(), 3);

        let err = log_write_failure::<()>(
            "postcard_create",
            Err(StoreError::ReferentialConflict(Conflict::MissingSourceImage(9))),
        )
        .unwrap_err();
        assert_eq!(err.code(), "referential_conflict");
    }

    #[test]
    fn codes_are_stable_per_variant() {
        let not_found = StoreError::NotFound {
            entity: Entity::Postcard,
            id: 1,
        };
        assert_eq!(not_found.code(), "not_found");
        assert_eq!(
            StoreError::from(ConfigError::Invalid("bad".to_string())).code(),
            "invalid_config"
        );
    }
}
