use async_trait::async_trait;

use crate::domain::Organization;
use crate::error::RepoError;
use crate::ports::ListingFilter;

/// Organization storage.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Page `page` (1-based) of organizations matching `filter`, ordered by
    /// name, along with the total number of matches.
    async fn find_page(
        &self,
        filter: &ListingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Organization>, u64), RepoError>;

    /// Save an organization (create or update).
    async fn save(&self, organization: Organization) -> Result<Organization, RepoError>;
}
