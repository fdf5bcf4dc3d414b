//! Source image repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store original uploads and hand out store-assigned ids.
//! - Refuse deletes that would orphan postcards, unless cascade is requested.
//!
//! # Invariants
//! - Payloads are immutable; there is no update path.
//! - `AUTOINCREMENT` keeps ids monotonic and never reused after deletes.
//! - Reference counting and the delete run in one IMMEDIATE transaction.

use super::postcard_repo::count_postcards_for_source;
use super::schema::ensure_connection_ready;
use super::{log_write_failure, Conflict, Entity, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::model::source_image::{SourceImage, SourceImageId};
use crate::model::validate_image;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// What to do with postcards still referencing a source image being deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Refuse with `ReferentialConflict` while any postcard references it.
    #[default]
    Block,
    /// Delete the referencing postcards in the same transaction.
    Cascade,
}

/// Pagination for source image id listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceImageListQuery {
    /// Defaults to `StoreConfig::default_list_limit`, clamps to the max.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for source images.
pub trait SourceImageRepository {
    /// Persists a non-empty payload and returns its fresh id.
    fn put(&self, image: &[u8]) -> StoreResult<SourceImageId>;
    /// Loads the payload stored under `id`.
    fn get(&self, id: SourceImageId) -> StoreResult<Vec<u8>>;
    /// Loads the full record stored under `id`.
    fn get_record(&self, id: SourceImageId) -> StoreResult<SourceImage>;
    fn exists(&self, id: SourceImageId) -> StoreResult<bool>;
    /// Deletes `id` unless a postcard still references it.
    fn delete(&self, id: SourceImageId) -> StoreResult<()>;
    /// Deletes `id` under `policy`; returns how many postcards went with it.
    fn delete_with_policy(&self, id: SourceImageId, policy: DeletePolicy) -> StoreResult<usize>;
    /// Lists ids in ascending order.
    fn list_ids(&self, query: &SourceImageListQuery) -> StoreResult<Vec<SourceImageId>>;
}

/// SQLite-backed source image repository.
pub struct SqliteSourceImageRepository<'conn> {
    conn: &'conn Connection,
    config: StoreConfig,
}

impl<'conn> SqliteSourceImageRepository<'conn> {
    /// Creates a repository with default limits from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        Self::with_config(conn, StoreConfig::default())
    }

    /// Creates a repository using `config` limits from a migrated connection.
    ///
    /// # Errors
    /// - `Config` when `config` fails validation.
    pub fn with_config(conn: &'conn Connection, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        ensure_connection_ready(conn)?;
        Ok(Self { conn, config })
    }

    fn insert_image(&self, image: &[u8]) -> StoreResult<SourceImageId> {
        validate_image(image, self.config.max_image_bytes)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("INSERT INTO source_images (image) VALUES (?1);", [image])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            "event=source_image_put module=repo status=ok id={} bytes={}",
            id,
            image.len()
        );
        Ok(id)
    }

    fn remove(&self, id: SourceImageId, policy: DeletePolicy) -> StoreResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !source_image_exists(&tx, id)? {
            return Err(StoreError::NotFound {
                entity: Entity::SourceImage,
                id,
            });
        }

        let referencing = count_postcards_for_source(&tx, id)?;
        let removed_postcards = match policy {
            DeletePolicy::Block if referencing > 0 => {
                return Err(StoreError::ReferentialConflict(
                    Conflict::SourceImageReferenced {
                        source_image_id: id,
                        postcards: referencing,
                    },
                ));
            }
            DeletePolicy::Block => 0,
            DeletePolicy::Cascade => {
                tx.execute("DELETE FROM postcards WHERE source_image_id = ?1;", [id])?
            }
        };

        tx.execute("DELETE FROM source_images WHERE id = ?1;", [id])?;
        tx.commit()?;

        info!(
            "event=source_image_delete module=repo status=ok id={} policy={:?} postcards_removed={}",
            id, policy, removed_postcards
        );
        Ok(removed_postcards)
    }
}

impl SourceImageRepository for SqliteSourceImageRepository<'_> {
    fn put(&self, image: &[u8]) -> StoreResult<SourceImageId> {
        log_write_failure("source_image_put", self.insert_image(image))
    }

    fn get(&self, id: SourceImageId) -> StoreResult<Vec<u8>> {
        self.get_record(id).map(|record| record.image)
    }

    fn get_record(&self, id: SourceImageId) -> StoreResult<SourceImage> {
        let image: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT image FROM source_images WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        let image = image.ok_or(StoreError::NotFound {
            entity: Entity::SourceImage,
            id,
        })?;
        if image.is_empty() {
            return Err(StoreError::InvalidData(format!(
                "empty payload in source_images.image for id {id}"
            )));
        }

        Ok(SourceImage { id, image })
    }

    fn exists(&self, id: SourceImageId) -> StoreResult<bool> {
        source_image_exists(self.conn, id)
    }

    fn delete(&self, id: SourceImageId) -> StoreResult<()> {
        self.delete_with_policy(id, DeletePolicy::Block).map(|_| ())
    }

    fn delete_with_policy(&self, id: SourceImageId, policy: DeletePolicy) -> StoreResult<usize> {
        log_write_failure("source_image_delete", self.remove(id, policy))
    }

    fn list_ids(&self, query: &SourceImageListQuery) -> StoreResult<Vec<SourceImageId>> {
        let limit = self.config.normalize_list_limit(query.limit);
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM source_images ORDER BY id ASC LIMIT ? OFFSET ?;")?;
        let mut rows = stmt.query(params![i64::from(limit), i64::from(query.offset)])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

pub(crate) fn source_image_exists(conn: &Connection, id: SourceImageId) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM source_images WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
