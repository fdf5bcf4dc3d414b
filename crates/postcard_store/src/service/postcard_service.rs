//! Postcard use-case service.
//!
//! # Responsibility
//! - Upload source images and create/replace postcards with read-back.
//! - Resolve a postcard together with the source image it was derived from.
//! - Apply an explicit delete policy for source images.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or integrity checks.
//! - A write whose read-back fails is reported as `InconsistentState`.

use crate::model::postcard::{NewPostcard, Postcard, PostcardId, PostcardUpdate};
use crate::model::source_image::{SourceImage, SourceImageId};
use crate::repo::postcard_repo::PostcardRepository;
use crate::repo::source_image_repo::{DeletePolicy, SourceImageRepository};
use crate::repo::{StoreError, StoreResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for postcard use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Repository-level failure, passed through unchanged.
    Store(StoreError),
    /// Write succeeded but the record could not be read back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent postcard state: {details}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// A postcard with its source image resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostcardWithSource {
    pub postcard: Postcard,
    pub source_image: SourceImage,
}

/// Postcard service facade over repository implementations.
pub struct PostcardService<S: SourceImageRepository, P: PostcardRepository> {
    source_images: S,
    postcards: P,
}

impl<S: SourceImageRepository, P: PostcardRepository> PostcardService<S, P> {
    pub fn new(source_images: S, postcards: P) -> Self {
        Self {
            source_images,
            postcards,
        }
    }

    /// Stores an original upload and returns the persisted record.
    pub fn upload_source_image(&self, image: &[u8]) -> Result<SourceImage, ServiceError> {
        let id = self.source_images.put(image)?;
        self.source_images
            .get_record(id)
            .map_err(|err| read_back_error(err, "uploaded source image missing in read-back"))
    }

    /// Creates a postcard from a request and returns the persisted record.
    pub fn create_postcard(&self, request: &NewPostcard) -> Result<Postcard, ServiceError> {
        let id = self.postcards.create(
            request.name,
            &request.text_alignment,
            request.source_image_id,
            &request.image,
        )?;
        self.postcards
            .get(id)
            .map_err(|err| read_back_error(err, "created postcard missing in read-back"))
    }

    /// Replaces name, alignment and image of an existing postcard.
    pub fn replace_postcard(
        &self,
        id: PostcardId,
        update: &PostcardUpdate,
    ) -> Result<Postcard, ServiceError> {
        self.postcards
            .replace(id, update.name, &update.text_alignment, &update.image)?;
        self.postcards
            .get(id)
            .map_err(|err| read_back_error(err, "replaced postcard missing in read-back"))
    }

    pub fn get_postcard(&self, id: PostcardId) -> StoreResult<Postcard> {
        self.postcards.get(id)
    }

    /// Loads a postcard and the source image it references.
    ///
    /// If the source image disappears between the two reads (cascade delete
    /// by another caller), the postcard is re-read so the caller sees the
    /// post-delete state as `NotFound` for the postcard.
    pub fn get_postcard_with_source(
        &self,
        id: PostcardId,
    ) -> Result<PostcardWithSource, ServiceError> {
        let postcard = self.postcards.get(id)?;
        match self.source_images.get_record(postcard.source_image_id) {
            Ok(source_image) => Ok(PostcardWithSource {
                postcard,
                source_image,
            }),
            Err(StoreError::NotFound { .. }) => {
                self.postcards.get(id)?;
                Err(ServiceError::InconsistentState(
                    "postcard references a missing source image",
                ))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All postcards derived from `source_image_id`, oldest first.
    pub fn postcards_for_source(&self, source_image_id: SourceImageId) -> StoreResult<Vec<Postcard>> {
        self.postcards.list_by_source_image(source_image_id)
    }

    pub fn delete_postcard(&self, id: PostcardId) -> StoreResult<()> {
        self.postcards.delete(id)
    }

    /// Deletes a source image under `policy`; returns removed postcard count.
    pub fn delete_source_image(
        &self,
        id: SourceImageId,
        policy: DeletePolicy,
    ) -> StoreResult<usize> {
        self.source_images.delete_with_policy(id, policy)
    }
}

fn read_back_error(err: StoreError, details: &'static str) -> ServiceError {
    match err {
        StoreError::NotFound { .. } => ServiceError::InconsistentState(details),
        other => ServiceError::Store(other),
    }
}
