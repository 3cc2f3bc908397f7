//! Depth-first export of a page tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use cfmd_config::ExportConfig;
use tracing::{debug, info, warn};

use crate::frontmatter;
use crate::path::{PathResolver, child_dir};
use crate::rate_limit::RateLimiter;
use crate::report::{ExportReport, FailureKind, PageFailure};
use crate::source::{ChildPage, ContentSource, Converter, PageNode, SourceError};

/// Error that aborts the whole export.
///
/// Per-page problems never surface here; they are recorded in the
/// [`ExportReport`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The root page does not exist or is not accessible.
    #[error("root page {0} not found")]
    RootNotFound(String),

    /// Credentials were rejected; no further call can succeed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The root page could not be fetched for transport reasons.
    #[error("cannot fetch root page {page_id}: {message}")]
    RootUnavailable {
        /// Root page id.
        page_id: String,
        /// Transport error detail.
        message: String,
    },

    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        /// Output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    fn from_root(page_id: &str, err: SourceError) -> Self {
        match err {
            SourceError::PageNotFound(_) => Self::RootNotFound(page_id.to_owned()),
            SourceError::AuthFailure(message) => Self::Auth(message),
            SourceError::Transport(message) => Self::RootUnavailable {
                page_id: page_id.to_owned(),
                message,
            },
        }
    }
}

/// Unit of traversal: a page waiting to be visited.
#[derive(Debug)]
struct ExportTask {
    page_id: String,
    title: String,
    parent_dir: PathBuf,
    depth: usize,
}

/// State owned by a single run.
struct Run {
    limiter: RateLimiter,
    resolver: PathResolver,
    visited: HashSet<String>,
    report: ExportReport,
    frontier: Vec<ExportTask>,
}

/// Exports a page and all of its descendants to Markdown files.
///
/// Traversal is sequential and depth-first pre-order: a page is written
/// before any of its children, and children are visited in the order the
/// source lists them.
pub struct Exporter<'a> {
    source: &'a dyn ContentSource,
    converter: &'a dyn Converter,
    config: ExportConfig,
}

impl<'a> Exporter<'a> {
    /// Create an exporter.
    #[must_use]
    pub fn new(
        source: &'a dyn ContentSource,
        converter: &'a dyn Converter,
        config: ExportConfig,
    ) -> Self {
        Self {
            source,
            converter,
            config,
        }
    }

    /// Export `root_page_id` and its descendants into `output_dir`.
    ///
    /// The root is written to `output_dir/<slug>.md` and its children below
    /// `output_dir/<slug>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created, the root
    /// page cannot be fetched, or authentication fails at any point.
    pub fn export(&self, root_page_id: &str, output_dir: &Path) -> Result<ExportReport, ExportError> {
        std::fs::create_dir_all(output_dir).map_err(|source| ExportError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let mut run = Run {
            limiter: RateLimiter::new(self.config.delay()),
            resolver: PathResolver::new(),
            visited: HashSet::new(),
            report: ExportReport::default(),
            frontier: Vec::new(),
        };

        run.limiter.wait();
        let root = self
            .source
            .get_page(root_page_id)
            .map_err(|e| ExportError::from_root(root_page_id, e))?;
        info!("Exporting \"{}\" ({})", root.title, root_page_id);

        run.frontier.push(ExportTask {
            page_id: root_page_id.to_owned(),
            title: root.title.clone(),
            parent_dir: output_dir.to_path_buf(),
            depth: 0,
        });

        let mut prefetched = Some(root);
        while let Some(task) = run.frontier.pop() {
            self.visit(&mut run, task, prefetched.take())?;
        }

        Ok(run.report)
    }

    fn visit(
        &self,
        run: &mut Run,
        task: ExportTask,
        prefetched: Option<PageNode>,
    ) -> Result<(), ExportError> {
        // Marked before any fetch so a failing page is never retried via
        // another parent.
        if !run.visited.insert(task.page_id.clone()) {
            debug!("Page {} already visited, skipping", task.page_id);
            return Ok(());
        }

        if task.depth > self.config.max_depth {
            warn!(
                "Maximum depth ({}) exceeded for page {}",
                self.config.max_depth, task.page_id
            );
            run.report.record_failure(
                &task.page_id,
                PageFailure::new(
                    FailureKind::DepthExceeded,
                    format!(
                        "depth {} exceeds maximum {}",
                        task.depth, self.config.max_depth
                    ),
                ),
            );
            return Ok(());
        }

        let path = run.resolver.resolve(&task.title, &task.parent_dir);

        if self.config.skip_existing && path.is_file() {
            let children = match self.fetch_children(run, &task.page_id) {
                Ok(children) => children,
                Err(err) => return Self::record_source_failure(run, &task.page_id, err),
            };
            info!("Skipped (exists): {}", path.display());
            run.report.record_skip(&task.page_id);
            Self::enqueue_children(run, children, &path, task.depth);
            return Ok(());
        }

        let page = match prefetched {
            Some(page) => page,
            None => match self.fetch_page(run, &task.page_id) {
                Ok(page) => page,
                Err(err) => return Self::record_source_failure(run, &task.page_id, err),
            },
        };
        // Listed before writing: a file on disk implies its children were
        // reachable, which keeps resume runs complete.
        let children = match self.fetch_children(run, &task.page_id) {
            Ok(children) => children,
            Err(err) => return Self::record_source_failure(run, &task.page_id, err),
        };

        let markdown = self.converter.to_markdown(&page.body_html);
        let contents = frontmatter::build(&page, &markdown);

        match write_page(&path, &contents) {
            Ok(()) => {
                info!("Created: {}", path.display());
                run.report.record_success(&task.page_id, path.clone());
            }
            Err(err) => {
                warn!("Failed to write {}: {err}", path.display());
                run.report.record_failure(
                    &task.page_id,
                    PageFailure::new(
                        FailureKind::Write,
                        format!("{}: {err}", path.display()),
                    ),
                );
            }
        }

        Self::enqueue_children(run, children, &path, task.depth);
        Ok(())
    }

    fn fetch_page(&self, run: &mut Run, page_id: &str) -> Result<PageNode, SourceError> {
        run.limiter.wait();
        debug!("Fetching page {page_id}");
        self.source.get_page(page_id)
    }

    fn fetch_children(&self, run: &mut Run, page_id: &str) -> Result<Vec<ChildPage>, SourceError> {
        run.limiter.wait();
        debug!("Listing children of {page_id}");
        self.source.get_children(page_id)
    }

    /// Record a per-page fetch failure, or abort on authentication failure.
    fn record_source_failure(
        run: &mut Run,
        page_id: &str,
        err: SourceError,
    ) -> Result<(), ExportError> {
        let kind = match &err {
            SourceError::AuthFailure(message) => return Err(ExportError::Auth(message.clone())),
            SourceError::PageNotFound(_) => FailureKind::PageNotFound,
            SourceError::Transport(_) => FailureKind::Transport,
        };
        warn!("Failed to export page {page_id}: {err}");
        run.report
            .record_failure(page_id, PageFailure::new(kind, err.to_string()));
        Ok(())
    }

    /// Push children so that the first listed child is visited next.
    fn enqueue_children(run: &mut Run, children: Vec<ChildPage>, page_path: &Path, depth: usize) {
        let parent_dir = child_dir(page_path);
        for child in children.into_iter().rev() {
            run.frontier.push(ExportTask {
                page_id: child.id,
                title: child.title,
                parent_dir: parent_dir.clone(),
                depth: depth + 1,
            });
        }
    }
}

fn write_page(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}
