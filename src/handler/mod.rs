//! Request handler module
//!
//! Dispatches requests to the catalog pages or to static assets.

pub mod router;
pub mod static_files;

pub use router::handle_request;
