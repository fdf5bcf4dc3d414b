//! Core persistence for postcard generation.
//! This crate owns source image / postcard identity and referential integrity.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::alignment::{HorizontalAlign, TextAlignment, VerticalAlign};
pub use model::postcard::{NewPostcard, Postcard, PostcardId, PostcardUpdate};
pub use model::source_image::{SourceImage, SourceImageId};
pub use model::ValidationError;
pub use repo::postcard_repo::{PostcardListQuery, PostcardRepository, SqlitePostcardRepository};
pub use repo::source_image_repo::{
    DeletePolicy, SourceImageListQuery, SourceImageRepository, SqliteSourceImageRepository,
};
pub use repo::{Conflict, Entity, StoreError, StoreResult};
pub use service::postcard_service::{PostcardService, PostcardWithSource, ServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
