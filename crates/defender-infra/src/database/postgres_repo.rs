//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use defender_core::domain::{ApiApplication, Organization};
use defender_core::error::RepoError;
use defender_core::ports::{ApiTokenResolver, AuthError, ListingFilter, OrganizationRepository};

use super::entity::api_application::{self, Entity as ApiApplicationEntity};
use super::entity::organization::{self, Entity as OrganizationEntity};

fn map_write_error(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL organization repository.
pub struct PostgresOrganizationRepository {
    db: DbConn,
}

impl PostgresOrganizationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn find_page(
        &self,
        filter: &ListingFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Organization>, u64), RepoError> {
        let mut query = OrganizationEntity::find()
            .order_by_asc(organization::Column::Name)
            .order_by_asc(organization::Column::Id);

        let keyword = filter.keyword.as_deref().map(str::trim).unwrap_or_default();
        if !keyword.is_empty() {
            tracing::debug!(keyword, "Filtering organizations by name");
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(organization::Column::Name)))
                    .like(format!("%{}%", keyword.to_lowercase())),
            );
        }

        let per_page = per_page.max(1);
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        // Pages past the end are empty; skipping the query also keeps the
        // offset arithmetic in range for any page number.
        if page.saturating_sub(1).saturating_mul(per_page) >= total {
            return Ok((Vec::new(), total));
        }

        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn save(&self, org: Organization) -> Result<Organization, RepoError> {
        let exists = OrganizationEntity::find_by_id(org.id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?
            .is_some();

        let active_model: organization::ActiveModel = org.into();
        let model = if exists {
            active_model.update(&self.db).await
        } else {
            active_model.insert(&self.db).await
        }
        .map_err(map_write_error)?;

        Ok(model.into())
    }
}

/// PostgreSQL-backed API token lookup.
pub struct PostgresApiApplicationRepository {
    db: DbConn,
}

impl PostgresApiApplicationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ApiTokenResolver for PostgresApiApplicationRepository {
    async fn resolve_token(&self, token: &str) -> Result<Option<ApiApplication>, AuthError> {
        let result = ApiApplicationEntity::find()
            .filter(api_application::Column::ApiToken.eq(token))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}
