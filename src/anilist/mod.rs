//! AniList catalog access.
//!
//! [`model`] holds the response contract, [`client`] the HTTP side. Code
//! that only needs "something that can look up manga" depends on the
//! [`CatalogSource`] trait so it can run against a fake in tests.

pub mod client;
pub mod model;

pub use client::AnilistClient;
pub use model::{Media, MediaFormat, MediaStatus, Paginated, PaginatedMedia};

use crate::error::AnilistError;
use async_trait::async_trait;

/// A remote manga catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Returns the human-readable name of this catalog.
    fn name(&self) -> &'static str;

    /// Searches the catalog. `page` is 1-based.
    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Paginated<Media>, AnilistError>;

    /// Fetches a single entry by its catalog id.
    async fn media(&self, id: u64) -> Result<Media, AnilistError>;
}
