//! Domain entities - the core business objects.

mod post;
mod session;
mod user;

pub use post::{NewPost, Post, PostDraft, PostId};
pub use session::{Session, SessionToken, SessionUser};
pub use user::{Credentials, NewUser, User, UserId};
