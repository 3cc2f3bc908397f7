//! Confluence integration for confluence-md.
//!
//! This crate provides the Confluence side of the export:
//! - [`ConfluenceClient`]: REST API client with basic or bearer
//!   authentication, retry on rate limiting and paginated child listings.
//!   Implements [`ContentSource`](cfmd_export::ContentSource).
//! - [`StorageConverter`]: storage format to Markdown conversion.
//!   Implements [`Converter`](cfmd_export::Converter).
//!
//! # API Client
//!
//! ```ignore
//! use std::time::Duration;
//! use cfmd_confluence::ConfluenceClient;
//!
//! let client = ConfluenceClient::new(&credentials, Duration::from_secs(30));
//! let page = client.fetch_page("123")?;
//! println!("Page title: {}", page.title);
//! ```

// API client
mod client;
pub use client::{AuthScheme, ConfluenceClient};

// Storage format conversion
mod converter;
pub use converter::StorageConverter;

// Retry policy (internal)
mod retry;

// Types
pub mod types;

// Errors
pub mod error;
pub use error::ConfluenceError;
