//! In-memory organization storage for running without a database.

use async_trait::async_trait;
use tokio::sync::RwLock;

use defender_core::domain::Organization;
use defender_core::error::RepoError;
use defender_core::ports::{ListingFilter, OrganizationRepository};

/// Organizations kept in a vector, ordered by name on read.
pub struct InMemoryOrganizationRepository {
    organizations: RwLock<Vec<Organization>>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self {
            organizations: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryOrganizationRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(organization: &Organization, filter: &ListingFilter) -> bool {
    match filter.keyword.as_deref().map(str::trim) {
        Some(keyword) if !keyword.is_empty() => organization
            .name
            .to_lowercase()
            .contains(&keyword.to_lowercase()),
        _ => true,
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn find_page(
        &self,
        filter: &ListingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Organization>, u64), RepoError> {
        let organizations = self.organizations.read().await;

        let mut matching: Vec<&Organization> = organizations
            .iter()
            .filter(|org| matches(org, filter))
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let skip = page.saturating_sub(1).saturating_mul(per_page) as usize;
        let items = matching
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn save(&self, organization: Organization) -> Result<Organization, RepoError> {
        let mut organizations = self.organizations.write().await;
        match organizations.iter_mut().find(|o| o.id == organization.id) {
            Some(existing) => *existing = organization.clone(),
            None => organizations.push(organization.clone()),
        }
        Ok(organization)
    }
}
