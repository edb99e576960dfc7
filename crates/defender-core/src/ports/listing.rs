//! Paginated listing port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Filters forwarded untouched to the listing backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Case-insensitive name match.
    pub keyword: Option<String>,
}

/// One page of a listing plus the size of the whole collection.
#[derive(Debug, Clone)]
pub struct ListingPage<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

/// Fetches page N of the items matching a filter.
///
/// Items are serialized by the governor, so `Item` is the wire
/// representation of one record.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    type Item: Serialize + Send;

    /// `page` is 1-based.
    async fn list_page(
        &self,
        filter: &ListingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<ListingPage<Self::Item>, FetchError>;
}

/// Listing backend failure, passed through to the caller uninterpreted.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FetchError(pub String);

impl From<crate::error::RepoError> for FetchError {
    fn from(err: crate::error::RepoError) -> Self {
        FetchError(err.to_string())
    }
}
