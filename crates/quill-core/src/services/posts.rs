use std::sync::Arc;

use crate::domain::{NewPost, Post, PostDraft, PostId, SessionUser};
use crate::error::DomainError;
use crate::ports::PostRepository;

const ENTITY: &str = "Post";

/// Whether an ownership-scoped mutation touched a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// The post is missing or belongs to someone else. Callers cannot tell which.
    Skipped,
}

impl MutationOutcome {
    fn from_rows(rows: u64) -> Self {
        if rows == 0 { Self::Skipped } else { Self::Applied }
    }
}

/// Post lifecycle: list, view, create, edit, delete.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// All posts, most recent first.
    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_recent().await?)
    }

    pub async fn get(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: ENTITY,
                id,
            })
    }

    pub async fn create(&self, author: &SessionUser, draft: PostDraft) -> Result<Post, DomainError> {
        draft.validate()?;
        let post = self.posts.create(NewPost::by(author, draft)).await?;
        tracing::info!(blog_id = post.blog_id, user_id = author.user_id, "Post created");
        Ok(post)
    }

    /// Fetch a post for its owner's edit form.
    pub async fn get_for_edit(&self, id: PostId, actor: &SessionUser) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        if !post.is_owned_by(actor.user_id) {
            tracing::warn!(blog_id = id, user_id = actor.user_id, "Edit form requested by non-owner");
            return Err(DomainError::NotOwner {
                entity_type: ENTITY,
                id,
            });
        }
        Ok(post)
    }

    /// Overwrite title and body if `actor` owns the post.
    pub async fn update(
        &self,
        id: PostId,
        actor: &SessionUser,
        draft: PostDraft,
    ) -> Result<MutationOutcome, DomainError> {
        draft.validate()?;
        let rows = self.posts.update_owned(id, actor.user_id, draft).await?;
        let outcome = MutationOutcome::from_rows(rows);
        log_outcome("update", id, actor, outcome);
        Ok(outcome)
    }

    /// Delete the post if `actor` owns it.
    pub async fn delete(
        &self,
        id: PostId,
        actor: &SessionUser,
    ) -> Result<MutationOutcome, DomainError> {
        let rows = self.posts.delete_owned(id, actor.user_id).await?;
        let outcome = MutationOutcome::from_rows(rows);
        log_outcome("delete", id, actor, outcome);
        Ok(outcome)
    }
}

fn log_outcome(action: &str, id: PostId, actor: &SessionUser, outcome: MutationOutcome) {
    match outcome {
        MutationOutcome::Applied => {
            tracing::info!(blog_id = id, user_id = actor.user_id, "Post {action} applied");
        }
        MutationOutcome::Skipped => {
            tracing::warn!(
                blog_id = id,
                user_id = actor.user_id,
                "Post {action} matched no owned row"
            );
        }
    }
}
