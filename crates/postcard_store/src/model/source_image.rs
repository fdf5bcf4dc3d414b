//! Source image domain model.
//!
//! # Invariants
//! - `id` is assigned by storage, monotonically increasing, never reused.
//! - `image` is immutable once stored; there is no update path.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a source image.
pub type SourceImageId = i64;

/// Original uploaded image from which postcards are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    pub id: SourceImageId,
    /// Opaque original payload. Never decoded by the store.
    pub image: Vec<u8>,
}
