//! Organization listing served through the governor.

use std::sync::Arc;

use async_trait::async_trait;

use defender_core::domain::Organization;
use defender_core::ports::{
    FetchError, ListingFetcher, ListingFilter, ListingPage, OrganizationRepository,
};
use defender_shared::OrganizationResponse;

/// Adapts an `OrganizationRepository` to the fetcher the governor drives.
pub struct OrganizationListing {
    repo: Arc<dyn OrganizationRepository>,
}

impl OrganizationListing {
    pub fn new(repo: Arc<dyn OrganizationRepository>) -> Self {
        Self { repo }
    }
}

fn to_response(org: Organization) -> OrganizationResponse {
    OrganizationResponse {
        id: org.id,
        name: org.name,
        description: org.description,
        website: org.website,
        updated_at: org.updated_at,
    }
}

#[async_trait]
impl ListingFetcher for OrganizationListing {
    type Item = OrganizationResponse;

    async fn list_page(
        &self,
        filter: &ListingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<ListingPage<Self::Item>, FetchError> {
        let (organizations, total_count) = self.repo.find_page(filter, page, per_page).await?;

        Ok(ListingPage {
            items: organizations.into_iter().map(to_response).collect(),
            total_count,
        })
    }
}
