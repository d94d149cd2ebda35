//! Post handlers: public listing and the owner-gated create/edit/delete flow.

use actix_web::{HttpResponse, web};

use quill_core::domain::{PostDraft, PostId};
use quill_shared::PostForm;

use super::auth::see_other;
use crate::middleware::{AppResult, CurrentUser, MaybeUser, OrRespond};
use crate::state::AppState;
use crate::views;

/// GET /
pub async fn index(state: web::Data<AppState>, user: MaybeUser) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .list()
        .await
        .or_respond("Error retrieving blog posts")?;

    Ok(views::page(views::index(&posts, user.0.as_ref())))
}

/// GET /post/{id}
pub async fn show(
    state: web::Data<AppState>,
    user: MaybeUser,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .get(path.into_inner())
        .await
        .or_respond("Error retrieving blog post")?;

    Ok(views::page(views::post(&post, user.0.as_ref())))
}

/// GET /create
pub async fn create_form(user: CurrentUser) -> HttpResponse {
    views::page(views::create(&user.0))
}

/// POST /create
pub async fn create(
    user: CurrentUser,
    state: web::Data<AppState>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    state
        .posts
        .create(&user.0, PostDraft::new(form.title, form.body))
        .await
        .or_respond("Error creating post")?;

    Ok(see_other("/"))
}

/// GET /edit/{id}
pub async fn edit_form(
    user: CurrentUser,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .get_for_edit(path.into_inner(), &user.0)
        .await
        .or_respond("Error loading post for editing")?;

    Ok(views::page(views::edit(&post, &user.0)))
}

/// POST /edit/{id}
///
/// A post the user does not own is left untouched and the redirect is
/// issued anyway.
pub async fn update(
    user: CurrentUser,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    state
        .posts
        .update(path.into_inner(), &user.0, PostDraft::new(form.title, form.body))
        .await
        .or_respond("Error updating post")?;

    Ok(see_other("/"))
}

/// POST /delete/{id}
pub async fn delete(
    user: CurrentUser,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(path.into_inner(), &user.0)
        .await
        .or_respond("Error deleting post")?;

    Ok(see_other("/"))
}
