//! Output path resolution.
//!
//! Page titles become lowercase hyphenated slugs. Children of `foo.md` are
//! written into the sibling directory `foo/`, so the output tree mirrors the
//! page hierarchy.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Slug used when a title has no ASCII alphanumeric characters.
pub const UNTITLED_SLUG: &str = "untitled";

/// Maximum slug length in bytes.
const MAX_SLUG_LEN: usize = 100;

/// Convert a page title to a filesystem-safe slug.
///
/// Keeps ASCII alphanumerics (lowercased) and collapses every other run of
/// characters into a single hyphen. Leading and trailing hyphens are trimmed.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    // ASCII only, so byte truncation is on a char boundary
    if result.len() > MAX_SLUG_LEN {
        result.truncate(MAX_SLUG_LEN);
        let trimmed = result.trim_end_matches('-').len();
        result.truncate(trimmed);
    }

    if result.is_empty() {
        UNTITLED_SLUG.to_owned()
    } else {
        result
    }
}

/// Directory that holds the children of the page written to `file`.
#[must_use]
pub fn child_dir(file: &Path) -> PathBuf {
    file.with_extension("")
}

/// Allocates collision-free `.md` paths within a single run.
///
/// Names already handed out are tracked per parent directory. A repeated slug
/// gets the first free `-N` suffix starting at 2. Files from earlier runs are
/// never inspected, so the result depends only on the order of titles seen at
/// each level during this run.
#[derive(Debug, Default)]
pub struct PathResolver {
    used: HashMap<PathBuf, HashSet<String>>,
}

impl PathResolver {
    /// Create a resolver with no allocated names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the output path for `title` under `parent_dir`.
    pub fn resolve(&mut self, title: &str, parent_dir: &Path) -> PathBuf {
        let slug = slugify(title);
        let used = self.used.entry(parent_dir.to_path_buf()).or_default();

        let mut name = slug.clone();
        let mut counter = 2;
        while used.contains(&name) {
            name = format!("{slug}-{counter}");
            counter += 1;
        }

        let path = parent_dir.join(format!("{name}.md"));
        used.insert(name);
        path
    }
}
