//! Confluence page types.

use serde::Deserialize;

/// Confluence page as returned with
/// `expand=body.storage,history,version,space,ancestors`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Containing space.
    #[serde(default)]
    pub space: Option<Space>,
    /// Creation history.
    #[serde(default)]
    pub history: Option<History>,
    /// Version information.
    #[serde(default)]
    pub version: Option<Version>,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Ancestors from the space root down to the direct parent.
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// Storage-format body, empty when not expanded.
    #[must_use]
    pub fn body_html(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map_or("", |s| s.value.as_str())
    }

    /// Direct parent id (last ancestor).
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.ancestors.last().map(|a| a.id.as_str())
    }
}

/// Space reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Space {
    /// Space key.
    pub key: String,
}

/// Page creation history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    /// Page creator.
    #[serde(default)]
    pub created_by: Option<User>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_date: Option<String>,
}

/// Confluence user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Page version.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    /// Version number.
    #[serde(default)]
    pub number: u32,
    /// Modification timestamp of this version.
    #[serde(default)]
    pub when: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    /// HTML content in Confluence storage format.
    pub value: String,
}

/// Ancestor reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Ancestor {
    /// Ancestor page ID.
    pub id: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    /// Web UI link, relative to the base URL.
    #[serde(default)]
    pub webui: Option<String>,
    /// Next result page for paginated listings.
    #[serde(default)]
    pub next: Option<String>,
}

/// One page of a child listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildPagesResponse {
    /// Children in this batch.
    #[serde(default)]
    pub results: Vec<ChildSummary>,
    /// Pagination links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl ChildPagesResponse {
    /// Whether another batch follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.links.as_ref().is_some_and(|l| l.next.is_some())
    }
}

/// Child page as listed (not expanded).
#[derive(Debug, Clone, Deserialize)]
pub struct ChildSummary {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
}
