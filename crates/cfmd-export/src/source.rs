//! Capabilities consumed by the exporter.
//!
//! [`ContentSource`] abstracts the Confluence API (authentication, retries and
//! pagination live behind it) and [`Converter`] abstracts HTML to Markdown
//! conversion.

/// One Confluence page as seen by the export.
///
/// Built transiently when a page is visited; only the Markdown file derived
/// from it persists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageNode {
    /// Stable page identifier.
    pub id: String,
    /// Display title (not unique across siblings).
    pub title: String,
    /// Immediate ancestor, absent for a space root.
    pub parent_id: Option<String>,
    /// Space key.
    pub space_key: Option<String>,
    /// Display name of the page creator.
    pub author: Option<String>,
    /// Creation timestamp as reported by the source.
    pub created_at: Option<String>,
    /// Last modification timestamp as reported by the source.
    pub modified_at: Option<String>,
    /// Absolute web URL of the page.
    pub url: Option<String>,
    /// Raw storage-format body.
    pub body_html: String,
}

/// Entry in a page's child listing.
///
/// The title comes with the listing so resume mode can resolve output paths
/// without fetching the page itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildPage {
    /// Child page identifier.
    pub id: String,
    /// Child page title.
    pub title: String,
}

impl ChildPage {
    /// Create a child listing entry.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Error from a [`ContentSource`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Page id is invalid or not accessible.
    #[error("page {0} not found")]
    PageNotFound(String),

    /// Credentials rejected (401/403).
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Network failure or timeout after retries were exhausted.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Source of page content and hierarchy.
pub trait ContentSource {
    /// Fetch page metadata and body.
    fn get_page(&self, page_id: &str) -> Result<PageNode, SourceError>;

    /// List direct children in display order.
    fn get_children(&self, page_id: &str) -> Result<Vec<ChildPage>, SourceError>;
}

/// HTML to Markdown conversion.
///
/// Conversion is best effort: unsupported constructs degrade to plain text or
/// are dropped, never reported as errors.
pub trait Converter {
    /// Convert a page body to Markdown.
    fn to_markdown(&self, html: &str) -> String;
}
