use postcard_store::db::open_db_in_memory;
use postcard_store::{
    Conflict, DeletePolicy, Entity, NewPostcard, Postcard, PostcardId, PostcardListQuery,
    PostcardRepository, PostcardService, PostcardUpdate, ServiceError, SqlitePostcardRepository,
    SqliteSourceImageRepository, StoreError, StoreResult,
};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> PostcardService<SqliteSourceImageRepository<'_>, SqlitePostcardRepository<'_>> {
    PostcardService::new(
        SqliteSourceImageRepository::try_new(conn).unwrap(),
        SqlitePostcardRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn upload_and_create_return_persisted_records() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let source = service.upload_source_image(b"original").unwrap();
    assert_eq!(source.id, 1);
    assert_eq!(source.image, b"original");

    let postcard = service
        .create_postcard(&NewPostcard::new(42, "LT", source.id, b"rendered".to_vec()))
        .unwrap();
    assert_eq!(postcard.name, 42);
    assert_eq!(postcard.text_alignment.code(), "LT");
    assert_eq!(postcard.source_image_id, source.id);
}

#[test]
fn get_postcard_with_source_resolves_reference() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let source = service.upload_source_image(b"original").unwrap();
    let postcard = service
        .create_postcard(&NewPostcard::new(1, "CM", source.id, b"card".to_vec()))
        .unwrap();

    let resolved = service.get_postcard_with_source(postcard.id).unwrap();
    assert_eq!(resolved.postcard, postcard);
    assert_eq!(resolved.source_image, source);
}

#[test]
fn replace_postcard_returns_updated_record() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let source = service.upload_source_image(b"original").unwrap();
    let postcard = service
        .create_postcard(&NewPostcard::new(1, "LT", source.id, b"v1".to_vec()))
        .unwrap();

    let replaced = service
        .replace_postcard(postcard.id, &PostcardUpdate::new(2, "RB", b"v2".to_vec()))
        .unwrap();
    assert_eq!(replaced.id, postcard.id);
    assert_eq!(replaced.name, 2);
    assert_eq!(replaced.text_alignment.code(), "RB");
    assert_eq!(replaced.image, b"v2");
    assert_eq!(replaced.source_image_id, source.id);
}

#[test]
fn create_postcard_surfaces_store_errors_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .create_postcard(&NewPostcard::new(1, "LT", 5, b"card".to_vec()))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::ReferentialConflict(
            Conflict::MissingSourceImage(5)
        ))
    ));
}

#[test]
fn delete_source_image_honours_policy() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let source = service.upload_source_image(b"original").unwrap();
    for name in 0..3 {
        service
            .create_postcard(&NewPostcard::new(name, "LT", source.id, b"card".to_vec()))
            .unwrap();
    }

    let blocked = service
        .delete_source_image(source.id, DeletePolicy::Block)
        .unwrap_err();
    assert!(matches!(blocked, StoreError::ReferentialConflict(_)));
    assert_eq!(service.postcards_for_source(source.id).unwrap().len(), 3);

    let removed = service
        .delete_source_image(source.id, DeletePolicy::Cascade)
        .unwrap();
    assert_eq!(removed, 3);
    assert!(service.postcards_for_source(source.id).unwrap().is_empty());
    let err = service.get_postcard_with_source(1).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::NotFound { id: 1, .. })
    ));
}

#[test]
fn missing_postcard_reports_not_found_through_service() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.get_postcard_with_source(12).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::NotFound { id: 12, .. })
    ));
}

#[test]
fn dangling_source_reference_is_reported_as_inconsistent_state() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let source = service.upload_source_image(b"original").unwrap();
    let postcard = service
        .create_postcard(&NewPostcard::new(1, "LT", source.id, b"card".to_vec()))
        .unwrap();

    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    conn.execute("DELETE FROM source_images WHERE id = ?1;", [source.id])
        .unwrap();

    let err = service.get_postcard_with_source(postcard.id).unwrap_err();
    assert!(matches!(err, ServiceError::InconsistentState(_)));
}

struct UnreadablePostcards<'conn>(SqlitePostcardRepository<'conn>);

impl PostcardRepository for UnreadablePostcards<'_> {
    fn create(
        &self,
        name: i64,
        text_alignment: &str,
        source_image_id: i64,
        image: &[u8],
    ) -> StoreResult<PostcardId> {
        self.0.create(name, text_alignment, source_image_id, image)
    }

    fn get(&self, id: PostcardId) -> StoreResult<Postcard> {
        Err(StoreError::NotFound {
            entity: Entity::Postcard,
            id,
        })
    }

    fn list_by_source_image(&self, source_image_id: i64) -> StoreResult<Vec<Postcard>> {
        self.0.list_by_source_image(source_image_id)
    }

    fn count_by_source_image(&self, source_image_id: i64) -> StoreResult<u64> {
        self.0.count_by_source_image(source_image_id)
    }

    fn list(&self, query: &PostcardListQuery) -> StoreResult<Vec<Postcard>> {
        self.0.list(query)
    }

    fn replace(
        &self,
        id: PostcardId,
        name: i64,
        text_alignment: &str,
        image: &[u8],
    ) -> StoreResult<()> {
        self.0.replace(id, name, text_alignment, image)
    }

    fn delete(&self, id: PostcardId) -> StoreResult<()> {
        self.0.delete(id)
    }
}

#[test]
fn failed_read_back_after_write_is_reported_as_inconsistent_state() {
    let conn = open_db_in_memory().unwrap();
    let service = PostcardService::new(
        SqliteSourceImageRepository::try_new(&conn).unwrap(),
        UnreadablePostcards(SqlitePostcardRepository::try_new(&conn).unwrap()),
    );

    let source = service.upload_source_image(b"original").unwrap();
    let err = service
        .create_postcard(&NewPostcard::new(1, "LT", source.id, b"card".to_vec()))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InconsistentState(_)));

    let err = service
        .replace_postcard(1, &PostcardUpdate::new(2, "RB", b"v2".to_vec()))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InconsistentState(_)));

    let postcards = SqlitePostcardRepository::try_new(&conn).unwrap();
    let stored = postcards.list_by_source_image(source.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, 2);
}
