//! Recursive export of a Confluence page tree to Markdown files.
//!
//! This crate provides the export pipeline:
//! - [`Exporter`]: depth-first traversal from a root page, with a revisit
//!   guard, depth limit, fixed request pacing and resume support
//! - [`PathResolver`]: collision-free, filesystem-safe output paths
//! - [`frontmatter::build`]: YAML frontmatter header for each file
//! - [`ExportReport`]: per-page success/failure/skip accounting
//!
//! The Confluence API and HTML conversion are consumed through the
//! [`ContentSource`] and [`Converter`] traits.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use cfmd_config::ExportConfig;
//! use cfmd_export::Exporter;
//!
//! let exporter = Exporter::new(&client, &converter, ExportConfig::default());
//! let report = exporter.export("12345", Path::new("docs"))?;
//! println!("{} pages written", report.succeeded().len());
//! ```

mod engine;
pub mod frontmatter;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod path;
mod rate_limit;
mod report;
mod source;

pub use engine::{ExportError, Exporter};
#[cfg(any(test, feature = "mock"))]
pub use mock::{EchoConverter, MockSource, SourceCall};
pub use path::{PathResolver, UNTITLED_SLUG, child_dir, slugify};
pub use report::{ExportReport, ExportStatus, FailureKind, PageFailure};
pub use source::{ChildPage, ContentSource, Converter, PageNode, SourceError};
