//! Postcard domain model.
//!
//! # Responsibility
//! - Define the persisted postcard record and its write requests.
//! - Validate write requests before they reach SQL.
//!
//! # Invariants
//! - `source_image_id` is fixed at creation; `PostcardUpdate` cannot carry it.
//! - `name`, `text_alignment` and `image` are replaced as a whole, never patched.

use super::alignment::TextAlignment;
use super::source_image::SourceImageId;
use super::{validate_image, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a postcard.
pub type PostcardId = i64;

/// Persisted postcard derived from one source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postcard {
    pub id: PostcardId,
    /// Numeric label chosen by the caller.
    pub name: i64,
    pub text_alignment: TextAlignment,
    pub source_image_id: SourceImageId,
    /// Rendered postcard payload, produced outside the store.
    pub image: Vec<u8>,
}

/// Creation request; the alignment is still a raw caller-supplied code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPostcard {
    pub name: i64,
    pub text_alignment: String,
    pub source_image_id: SourceImageId,
    pub image: Vec<u8>,
}

impl NewPostcard {
    pub fn new(
        name: i64,
        text_alignment: impl Into<String>,
        source_image_id: SourceImageId,
        image: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name,
            text_alignment: text_alignment.into(),
            source_image_id,
            image: image.into(),
        }
    }

    /// Validates alignment and payload, returning the parsed alignment.
    pub fn validate(&self, max_image_bytes: usize) -> Result<TextAlignment, ValidationError> {
        validate_fields(&self.text_alignment, &self.image, max_image_bytes)
    }
}

/// Wholesale replacement of a postcard's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcardUpdate {
    pub name: i64,
    pub text_alignment: String,
    pub image: Vec<u8>,
}

impl PostcardUpdate {
    pub fn new(name: i64, text_alignment: impl Into<String>, image: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            text_alignment: text_alignment.into(),
            image: image.into(),
        }
    }

    /// Validates alignment and payload, returning the parsed alignment.
    pub fn validate(&self, max_image_bytes: usize) -> Result<TextAlignment, ValidationError> {
        validate_fields(&self.text_alignment, &self.image, max_image_bytes)
    }
}

/// Shared write-time check for postcard alignment and payload.
pub(crate) fn validate_fields(
    text_alignment: &str,
    image: &[u8],
    max_image_bytes: usize,
) -> Result<TextAlignment, ValidationError> {
    let alignment = TextAlignment::parse(text_alignment)?;
    validate_image(image, max_image_bytes)?;
    Ok(alignment)
}
