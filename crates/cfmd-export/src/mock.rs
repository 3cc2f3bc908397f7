//! In-memory content source for testing.
//!
//! Provides [`MockSource`] for exercising the exporter without a Confluence
//! instance, and [`EchoConverter`] which passes bodies through unchanged.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::source::{ChildPage, ContentSource, Converter, PageNode, SourceError};

/// A recorded [`ContentSource`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    /// `get_page(id)`.
    GetPage(String),
    /// `get_children(id)`.
    GetChildren(String),
}

/// Mock content source.
///
/// Use the builder methods to script the page tree and per-page errors.
/// Every call is recorded and can be inspected with [`MockSource::calls`].
///
/// # Example
///
/// ```ignore
/// use cfmd_export::MockSource;
///
/// let source = MockSource::new()
///     .with_page("1", "Home")
///     .with_child("1", "2", "Guide")
///     .with_child("1", "3", "FAQ");
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    pages: HashMap<String, PageNode>,
    children: HashMap<String, Vec<ChildPage>>,
    page_errors: HashMap<String, SourceError>,
    children_errors: HashMap<String, SourceError>,
    calls: RwLock<Vec<SourceCall>>,
}

impl MockSource {
    /// Create an empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page with the given id and title and a `<p>{title}</p>` body.
    #[must_use]
    pub fn with_page(self, id: &str, title: &str) -> Self {
        self.with_page_node(PageNode {
            id: id.to_owned(),
            title: title.to_owned(),
            body_html: format!("<p>{title}</p>"),
            ..Default::default()
        })
    }

    /// Add a fully specified page.
    #[must_use]
    pub fn with_page_node(mut self, page: PageNode) -> Self {
        self.pages.insert(page.id.clone(), page);
        self
    }

    /// Append a child to `parent_id`'s listing and create the child page if
    /// it does not exist yet.
    #[must_use]
    pub fn with_child(self, parent_id: &str, id: &str, title: &str) -> Self {
        let mut this = self.with_child_ref(parent_id, id, title);
        if !this.pages.contains_key(id) {
            this.pages.insert(
                id.to_owned(),
                PageNode {
                    id: id.to_owned(),
                    title: title.to_owned(),
                    parent_id: Some(parent_id.to_owned()),
                    body_html: format!("<p>{title}</p>"),
                    ..Default::default()
                },
            );
        }
        this
    }

    /// Append a child to `parent_id`'s listing without creating the page.
    #[must_use]
    pub fn with_child_ref(mut self, parent_id: &str, id: &str, title: &str) -> Self {
        self.children
            .entry(parent_id.to_owned())
            .or_default()
            .push(ChildPage::new(id, title));
        self
    }

    /// Make `get_page(id)` fail.
    #[must_use]
    pub fn with_page_error(mut self, id: &str, error: SourceError) -> Self {
        self.page_errors.insert(id.to_owned(), error);
        self
    }

    /// Make `get_children(id)` fail.
    #[must_use]
    pub fn with_children_error(mut self, id: &str, error: SourceError) -> Self {
        self.children_errors.insert(id.to_owned(), error);
        self
    }

    /// All calls in the order they were made.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.read().unwrap().clone()
    }

    /// Ids passed to `get_page`, in call order.
    pub fn page_fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SourceCall::GetPage(id) => Some(id),
                SourceCall::GetChildren(_) => None,
            })
            .collect()
    }

    fn record(&self, call: SourceCall) {
        self.calls.write().unwrap().push(call);
    }
}

impl ContentSource for MockSource {
    fn get_page(&self, page_id: &str) -> Result<PageNode, SourceError> {
        self.record(SourceCall::GetPage(page_id.to_owned()));
        if let Some(err) = self.page_errors.get(page_id) {
            return Err(err.clone());
        }
        self.pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| SourceError::PageNotFound(page_id.to_owned()))
    }

    fn get_children(&self, page_id: &str) -> Result<Vec<ChildPage>, SourceError> {
        self.record(SourceCall::GetChildren(page_id.to_owned()));
        if let Some(err) = self.children_errors.get(page_id) {
            return Err(err.clone());
        }
        Ok(self.children.get(page_id).cloned().unwrap_or_default())
    }
}

/// Converter that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoConverter;

impl Converter for EchoConverter {
    fn to_markdown(&self, html: &str) -> String {
        html.to_owned()
    }
}
