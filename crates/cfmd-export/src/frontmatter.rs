//! YAML frontmatter generation.

use std::fmt::Write;

use crate::source::PageNode;

/// Build file contents: a frontmatter block, a blank line, then `markdown`.
///
/// Every key is always present. Missing metadata renders as `""` so the
/// schema stays stable for downstream parsers. Values are emitted as
/// double-quoted scalars; the body is written verbatim.
#[must_use]
pub fn build(page: &PageNode, markdown: &str) -> String {
    let fields: [(&str, Option<&str>); 8] = [
        ("title", Some(page.title.as_str())),
        ("page_id", Some(page.id.as_str())),
        ("space_key", page.space_key.as_deref()),
        ("author", page.author.as_deref()),
        ("created", page.created_at.as_deref()),
        ("modified", page.modified_at.as_deref()),
        ("url", page.url.as_deref()),
        ("parent_id", page.parent_id.as_deref()),
    ];

    let mut out = String::with_capacity(256 + markdown.len());
    out.push_str("---\n");
    for (key, value) in fields {
        let _ = writeln!(out, "{key}: {}", quote(value.unwrap_or_default()));
    }
    out.push_str("---\n\n");
    out.push_str(markdown);
    out
}

/// Double-quote a scalar.
///
/// JSON string syntax is a subset of YAML double-quoted scalars.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}
