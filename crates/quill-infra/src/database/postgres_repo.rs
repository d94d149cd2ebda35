//! PostgreSQL repository implementations.
//!
//! Every user-supplied value reaches the database as a bound parameter; the
//! query builder never splices strings into SQL.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use quill_core::domain::{NewPost, NewUser, Post, PostDraft, PostId, User, UserId};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

use super::entity::blog::{self, Entity as BlogEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err, map_write_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<BlogEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        tracing::debug!(name = %new_user.name, "Inserting user");

        let model = user::ActiveModel::from(new_user)
            .insert(&self.db)
            .await
            .map_err(map_write_err)?;

        Ok(model.into())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(name = %name, "Finding user by name");

        let result = UserEntity::find()
            .filter(user::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let result = BlogEntity::find()
            .order_by_desc(blog::Column::DateCreated)
            .order_by_desc(blog::Column::BlogId)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let model = blog::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(map_write_err)?;

        Ok(model.into())
    }

    async fn update_owned(
        &self,
        id: PostId,
        owner: UserId,
        changes: PostDraft,
    ) -> Result<u64, RepoError> {
        // Ownership and mutation in one statement: no window between check and write.
        let result = BlogEntity::update_many()
            .col_expr(blog::Column::Title, Expr::value(changes.title))
            .col_expr(blog::Column::Body, Expr::value(changes.body))
            .filter(blog::Column::BlogId.eq(id))
            .filter(blog::Column::CreatorUserId.eq(owner))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }

    async fn delete_owned(&self, id: PostId, owner: UserId) -> Result<u64, RepoError> {
        let result = BlogEntity::delete_many()
            .filter(blog::Column::BlogId.eq(id))
            .filter(blog::Column::CreatorUserId.eq(owner))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}
