//! User entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use quill_core::domain::{NewUser, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(unique)]
    pub name: String,
    /// Argon2 PHC string.
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::blog::Entity")]
    Blog,
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            name: model.name,
            password_hash: model.password,
        }
    }
}

/// The id is left for the database sequence to assign.
impl From<NewUser> for ActiveModel {
    fn from(user: NewUser) -> Self {
        Self {
            user_id: NotSet,
            name: Set(user.name),
            password: Set(user.password_hash),
        }
    }
}
