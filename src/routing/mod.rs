//! Routing module
//!
//! Provides the request-level routing pieces:
//! - The edge rule choosing request-time vs. statically generated pages
//! - Page route matching on the resulting path

mod edge;
mod matcher;

pub use edge::{decide, EdgeDecision};
pub use matcher::{encode_segment, match_page, page_path, Page, PageRoute};
