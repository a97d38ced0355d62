//! HTTP request handlers.

pub mod link;
pub mod upload;

pub use link::*;
pub use upload::*;
