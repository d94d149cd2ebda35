use async_trait::async_trait;

use crate::domain::{NewPost, NewUser, Post, PostDraft, PostId, User, UserId};
use crate::error::RepoError;

/// Generic repository trait shared by every stored entity.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, UserId> {
    /// Insert a new user; a taken name yields `RepoError::Constraint`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    /// Find a user by their login handle.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// `update_owned` and `delete_owned` must check ownership and mutate in one
/// storage operation. They return the number of rows affected, which is zero
/// when the post is missing or owned by someone else.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    /// Every post, newest `date_created` first.
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError>;

    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn update_owned(
        &self,
        id: PostId,
        owner: UserId,
        changes: PostDraft,
    ) -> Result<u64, RepoError>;

    async fn delete_owned(&self, id: PostId, owner: UserId) -> Result<u64, RepoError>;
}
