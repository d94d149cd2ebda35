use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::SessionUser;
use super::user::UserId;
use crate::error::DomainError;

/// Storage-assigned post identifier.
pub type PostId = i32;

/// Post entity - a blog entry owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub blog_id: PostId,
    /// Author name copied from the session at creation time.
    pub creator_name: String,
    pub creator_user_id: UserId,
    pub title: String,
    pub body: String,
    pub date_created: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.creator_user_id == user_id
    }
}

/// A post ready to insert; the owner and timestamp are fixed here and never change.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub creator_name: String,
    pub creator_user_id: UserId,
    pub title: String,
    pub body: String,
    pub date_created: DateTime<Utc>,
}

impl NewPost {
    /// Create a post authored by `author`, stamped with the current server time.
    pub fn by(author: &SessionUser, draft: PostDraft) -> Self {
        Self {
            creator_name: author.name.clone(),
            creator_user_id: author.user_id,
            title: draft.title,
            body: draft.body,
            date_created: Utc::now(),
        }
    }
}

/// Title and body as submitted on the create and edit forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        Ok(())
    }
}
