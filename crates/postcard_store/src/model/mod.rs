//! Domain model for source images and the postcards derived from them.
//!
//! # Responsibility
//! - Define the canonical record shapes persisted by the repositories.
//! - Own write-time validation (alignment codes, payload bounds).
//!
//! # Invariants
//! - Identifiers are assigned by storage, never by callers.
//! - Image payloads are opaque, non-empty byte strings.

pub mod alignment;
pub mod postcard;
pub mod source_image;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Write-time validation failure for model values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Image payload has zero bytes.
    EmptyImage,
    /// Image payload is larger than the configured limit.
    ImageTooLarge { size: usize, max: usize },
    /// Alignment code is not exactly two characters.
    AlignmentLength(String),
    /// First alignment character is outside `L|C|R`.
    UnknownHorizontal(char),
    /// Second alignment character is outside `T|M|B`.
    UnknownVertical(char),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyImage => write!(f, "image payload must not be empty"),
            Self::ImageTooLarge { size, max } => {
                write!(f, "image payload of {size} bytes exceeds limit of {max} bytes")
            }
            Self::AlignmentLength(code) => write!(
                f,
                "alignment code must be exactly two characters, got `{code}`"
            ),
            Self::UnknownHorizontal(value) => write!(
                f,
                "unknown horizontal alignment `{value}`; expected L|C|R"
            ),
            Self::UnknownVertical(value) => {
                write!(f, "unknown vertical alignment `{value}`; expected T|M|B")
            }
        }
    }
}

impl Error for ValidationError {}

/// Checks an image payload against the non-empty and size bounds.
pub fn validate_image(image: &[u8], max_bytes: usize) -> Result<(), ValidationError> {
    if image.is_empty() {
        return Err(ValidationError::EmptyImage);
    }
    if image.len() > max_bytes {
        return Err(ValidationError::ImageTooLarge {
            size: image.len(),
            max: max_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_image, ValidationError};

    #[test]
    fn validate_image_enforces_bounds() {
        assert_eq!(validate_image(&[], 4), Err(ValidationError::EmptyImage));
        assert!(validate_image(&[1, 2, 3, 4], 4).is_ok());
        assert_eq!(
            validate_image(&[0; 5], 4),
            Err(ValidationError::ImageTooLarge { size: 5, max: 4 })
        );
    }
}
