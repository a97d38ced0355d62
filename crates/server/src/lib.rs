//! HTTP front end for the cass content-addressed file drop.
//!
//! This crate provides:
//! - `POST /up`: store a multipart upload
//! - `GET|POST /down`: fetch a remote link and store it
//! - Configuration loading for the `cassd` binary

pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, FetchError};
pub use fetch::LinkFetcher;
pub use routes::create_router;
pub use state::AppState;
