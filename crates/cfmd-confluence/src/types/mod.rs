//! Confluence API types.

mod page;

pub use page::{ChildPagesResponse, ChildSummary, Page};
