//! Postcard repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist postcards derived from stored source images.
//! - Enforce alignment/payload validation and source image existence on write.
//!
//! # Invariants
//! - `create` checks the source image and inserts inside one IMMEDIATE
//!   transaction, so a concurrent source delete cannot slip in between.
//! - `replace` never touches `source_image_id`.
//! - Listings are in creation order (`id ASC`).

use super::schema::ensure_connection_ready;
use super::source_image_repo::source_image_exists;
use super::{log_write_failure, Conflict, Entity, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::model::alignment::TextAlignment;
use crate::model::postcard::{validate_fields, Postcard, PostcardId};
use crate::model::source_image::SourceImageId;
use log::info;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, Row, Transaction, TransactionBehavior,
};

const POSTCARD_SELECT_SQL: &str = "SELECT
    id,
    name,
    text_alignment,
    source_image_id,
    image
FROM postcards";

/// Filter and pagination for postcard listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostcardListQuery {
    /// Exact match on the numeric name.
    pub name: Option<i64>,
    /// Defaults to `StoreConfig::default_list_limit`, clamps to the max.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for postcards.
pub trait PostcardRepository {
    /// Validates and inserts a postcard, returning its fresh id.
    fn create(
        &self,
        name: i64,
        text_alignment: &str,
        source_image_id: SourceImageId,
        image: &[u8],
    ) -> StoreResult<PostcardId>;
    fn get(&self, id: PostcardId) -> StoreResult<Postcard>;
    /// All postcards referencing `source_image_id`, oldest first.
    fn list_by_source_image(&self, source_image_id: SourceImageId) -> StoreResult<Vec<Postcard>>;
    fn count_by_source_image(&self, source_image_id: SourceImageId) -> StoreResult<u64>;
    fn list(&self, query: &PostcardListQuery) -> StoreResult<Vec<Postcard>>;
    /// Replaces name, alignment and image as one unit.
    fn replace(
        &self,
        id: PostcardId,
        name: i64,
        text_alignment: &str,
        image: &[u8],
    ) -> StoreResult<()>;
    fn delete(&self, id: PostcardId) -> StoreResult<()>;
}

/// SQLite-backed postcard repository.
pub struct SqlitePostcardRepository<'conn> {
    conn: &'conn Connection,
    config: StoreConfig,
}

impl<'conn> SqlitePostcardRepository<'conn> {
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

    fn validate_write(&self, text_alignment: &str, image: &[u8]) -> StoreResult<TextAlignment> {
        Ok(validate_fields(
            text_alignment,
            image,
            self.config.max_image_bytes,
        )?)
    }

    fn insert_postcard(
        &self,
        name: i64,
        text_alignment: &str,
        source_image_id: SourceImageId,
        image: &[u8],
    ) -> StoreResult<PostcardId> {
        let alignment = self.validate_write(text_alignment, image)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !source_image_exists(&tx, source_image_id)? {
            return Err(StoreError::ReferentialConflict(
                Conflict::MissingSourceImage(source_image_id),
            ));
        }

        tx.execute(
            "INSERT INTO postcards (
                name,
                text_alignment,
                source_image_id,
                image
            ) VALUES (?1, ?2, ?3, ?4);",
            params![name, alignment.code(), source_image_id, image],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            "event=postcard_create module=repo status=ok id={} source_image_id={} bytes={}",
            id,
            source_image_id,
            image.len()
        );
        Ok(id)
    }

    fn update_postcard(
        &self,
        id: PostcardId,
        name: i64,
        text_alignment: &str,
        image: &[u8],
    ) -> StoreResult<()> {
        let alignment = self.validate_write(text_alignment, image)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE postcards
             SET
                name = ?2,
                text_alignment = ?3,
                image = ?4
             WHERE id = ?1;",
            params![id, name, alignment.code(), image],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: Entity::Postcard,
                id,
            });
        }
        tx.commit()?;

        info!(
            "event=postcard_replace module=repo status=ok id={} bytes={}",
            id,
            image.len()
        );
        Ok(())
    }

    fn remove(&self, id: PostcardId) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM postcards WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: Entity::Postcard,
                id,
            });
        }
        tx.commit()?;

        info!("event=postcard_delete module=repo status=ok id={}", id);
        Ok(())
    }
}

impl PostcardRepository for SqlitePostcardRepository<'_> {
    fn create(
        &self,
        name: i64,
        text_alignment: &str,
        source_image_id: SourceImageId,
        image: &[u8],
    ) -> StoreResult<PostcardId> {
        log_write_failure(
            "postcard_create",
            self.insert_postcard(name, text_alignment, source_image_id, image),
        )
    }

    fn get(&self, id: PostcardId) -> StoreResult<Postcard> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POSTCARD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return parse_postcard_row(row);
        }

        Err(StoreError::NotFound {
            entity: Entity::Postcard,
            id,
        })
    }

    fn list_by_source_image(&self, source_image_id: SourceImageId) -> StoreResult<Vec<Postcard>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POSTCARD_SELECT_SQL}
             WHERE source_image_id = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([source_image_id])?;
        let mut postcards = Vec::new();
        while let Some(row) = rows.next()? {
            postcards.push(parse_postcard_row(row)?);
        }
        Ok(postcards)
    }

    fn count_by_source_image(&self, source_image_id: SourceImageId) -> StoreResult<u64> {
        count_postcards_for_source(self.conn, source_image_id)
    }

    fn list(&self, query: &PostcardListQuery) -> StoreResult<Vec<Postcard>> {
        let mut sql = format!("{POSTCARD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = query.name {
            sql.push_str(" AND name = ?");
            bind_values.push(Value::Integer(name));
        }

        sql.push_str(" ORDER BY id ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(
            self.config.normalize_list_limit(query.limit),
        )));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut postcards = Vec::new();
        while let Some(row) = rows.next()? {
            postcards.push(parse_postcard_row(row)?);
        }
        Ok(postcards)
    }

    fn replace(
        &self,
        id: PostcardId,
        name: i64,
        text_alignment: &str,
        image: &[u8],
    ) -> StoreResult<()> {
        log_write_failure(
            "postcard_replace",
            self.update_postcard(id, name, text_alignment, image),
        )
    }

    fn delete(&self, id: PostcardId) -> StoreResult<()> {
        log_write_failure("postcard_delete", self.remove(id))
    }
}

pub(crate) fn count_postcards_for_source(
    conn: &Connection,
    source_image_id: SourceImageId,
) -> StoreResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM postcards WHERE source_image_id = ?1;",
        [source_image_id],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| StoreError::InvalidData(format!("negative postcard count {count}")))
}

fn parse_postcard_row(row: &Row<'_>) -> StoreResult<Postcard> {
    let id: PostcardId = row.get("id")?;

    let alignment_text: String = row.get("text_alignment")?;
    let text_alignment = TextAlignment::parse(&alignment_text).map_err(|err| {
        StoreError::InvalidData(format!(
            "{err} in postcards.text_alignment for id {id}"
        ))
    })?;

    let image: Vec<u8> = row.get("image")?;
    if image.is_empty() {
        return Err(StoreError::InvalidData(format!(
            "empty payload in postcards.image for id {id}"
        )));
    }

    Ok(Postcard {
        id,
        name: row.get("name")?,
        text_alignment,
        source_image_id: row.get("source_image_id")?,
        image,
    })
}
