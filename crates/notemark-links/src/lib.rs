//! # Link Metadata
//!
//! Resolves preview metadata (title, description, image) for URLs found in
//! note documents.
//!
//! ## Flow
//!
//! 1. [`canonicalize`] turns the URL into its cache key.
//! 2. [`LinkResolver`] checks the per-URL cache slot; concurrent callers for
//!    the same key wait on the one fetch in flight.
//! 3. On a miss or expiry the [`Fetcher`] retrieves the resource under a
//!    hard timeout and a body size cap.
//! 4. [`html::scan`] extracts metadata tolerantly. Image responses use their
//!    own URL as the preview image.
//!
//! Failures are returned as [`LinkError`] and cached for a shorter TTL.

pub mod canonical;
pub mod error;
pub mod fetch;
pub mod html;
pub mod resolver;

use serde::{Deserialize, Serialize};

pub use canonical::canonicalize;
pub use error::{FetchError, LinkError};
pub use fetch::{FetchedPage, Fetcher, HttpFetcher, HttpSettings};
pub use resolver::{CacheSettings, LinkResolver};

/// Preview metadata for one URL. Fields the page does not provide stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    /// Canonical URL of the resource that was read.
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
