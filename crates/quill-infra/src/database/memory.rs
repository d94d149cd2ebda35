//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{NewPost, NewUser, Post, PostDraft, PostId, User, UserId};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

#[derive(Default)]
struct UserTable {
    rows: BTreeMap<UserId, User>,
    last_id: UserId,
}

/// In-memory user repository with a unique index on `name`.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, UserId> for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut table = self.table.write().await;

        if table.rows.values().any(|u| u.name == user.name) {
            return Err(RepoError::Constraint(format!(
                "users.name '{}' already exists",
                user.name
            )));
        }

        table.last_id += 1;
        let user = User {
            user_id: table.last_id,
            name: user.name,
            password_hash: user.password_hash,
        };
        table.rows.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.name == name).cloned())
    }
}

#[derive(Default)]
struct PostTable {
    rows: BTreeMap<PostId, Post>,
    last_id: PostId,
}

/// In-memory post repository.
///
/// Ownership-scoped writes hold the write lock across the owner check and the
/// mutation, matching the single-statement semantics of the SQL adapter.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<PostTable>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        let mut posts: Vec<Post> = table.rows.values().cloned().collect();
        posts.sort_by(|a, b| {
            b.date_created
                .cmp(&a.date_created)
                .then_with(|| b.blog_id.cmp(&a.blog_id))
        });
        Ok(posts)
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let post = Post {
            blog_id: table.last_id,
            creator_name: post.creator_name,
            creator_user_id: post.creator_user_id,
            title: post.title,
            body: post.body,
            date_created: post.date_created,
        };
        table.rows.insert(post.blog_id, post.clone());
        Ok(post)
    }

    async fn update_owned(
        &self,
        id: PostId,
        owner: UserId,
        changes: PostDraft,
    ) -> Result<u64, RepoError> {
        let mut table = self.table.write().await;

        match table.rows.get_mut(&id) {
            Some(post) if post.is_owned_by(owner) => {
                post.title = changes.title;
                post.body = changes.body;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_owned(&self, id: PostId, owner: UserId) -> Result<u64, RepoError> {
        let mut table = self.table.write().await;

        let owned = table.rows.get(&id).is_some_and(|p| p.is_owned_by(owner));
        if !owned {
            return Ok(0);
        }
        table.rows.remove(&id);
        Ok(1)
    }
}
