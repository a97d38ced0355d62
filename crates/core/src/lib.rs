//! Core types for the cass content-addressed file drop.
//!
//! This crate defines the pieces shared by the store and the HTTP front end:
//! - SHA-1 content digests
//! - Object naming (extension extraction, digest-derived filenames)
//! - Process-wide configuration

pub mod config;
pub mod error;
pub mod hash;
pub mod object;

pub use config::{AppConfig, FetchConfig, ServerConfig, StoreConfig};
pub use error::{Error, Result};
pub use hash::{ContentDigest, ContentHasher};
pub use object::{StoredObject, extension};
