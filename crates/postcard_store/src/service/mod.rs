//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate source image and postcard repositories into use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod postcard_service;
