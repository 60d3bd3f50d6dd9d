//! Clients for the external search and advertising APIs.
//!
//! The rank scanner and snapshot runner only see the traits below, so tests
//! can drive them with in-process fakes.

pub mod naver;
pub mod searchad;

use crate::error::{Error, Result};
use crate::models::keyword::KeywordRow;
use crate::models::search::{BlogSearchPage, SearchSort};
use async_trait::async_trait;

/// One page of a ranked blog search.
#[async_trait]
pub trait BlogSearch: Send + Sync {
    /// `start` is the 1-based offset of the first result, `display` the page size.
    async fn search_page(
        &self,
        query: &str,
        start: u32,
        display: u32,
        sort: SearchSort,
    ) -> Result<BlogSearchPage>;
}

/// Stands in for a search provider whose credentials are missing: every page
/// fails, so each scan is recorded as a search error.
pub struct UnconfiguredSearch {
    pub service: &'static str,
}

#[async_trait]
impl BlogSearch for UnconfiguredSearch {
    async fn search_page(
        &self,
        _query: &str,
        _start: u32,
        _display: u32,
        _sort: SearchSort,
    ) -> Result<BlogSearchPage> {
        Err(Error::MissingCredentials {
            service: self.service,
        })
    }
}

/// Search volume and competition lookups.
#[async_trait]
pub trait VolumeLookup: Send + Sync {
    /// Related keyword rows for a hint keyword, including the hint itself.
    async fn related_keywords(&self, hint: &str) -> Result<Vec<KeywordRow>>;

    /// The row for `keyword` itself, or the provider's closest row.
    async fn search_volume(&self, keyword: &str) -> Result<Option<KeywordRow>> {
        let rows = self.related_keywords(keyword).await?;
        Ok(searchad::pick_exact(rows, keyword))
    }
}
