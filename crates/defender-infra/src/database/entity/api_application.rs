//! API application entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "api_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub api_token: String,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for defender_core::domain::ApiApplication {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            api_token: model.api_token,
            active: model.active,
            created_at: model.created_at.into(),
        }
    }
}

impl From<defender_core::domain::ApiApplication> for ActiveModel {
    fn from(app: defender_core::domain::ApiApplication) -> Self {
        Self {
            id: Set(app.id),
            name: Set(app.name),
            api_token: Set(app.api_token),
            active: Set(app.active),
            created_at: Set(app.created_at.into()),
        }
    }
}
