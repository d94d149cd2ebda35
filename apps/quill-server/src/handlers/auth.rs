//! Signup, signin and signout handlers.

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use quill_core::domain::Credentials;
use quill_shared::CredentialsForm;

use crate::middleware::{AppResult, OrRespond};
use crate::state::AppState;
use crate::views;

/// GET /signup
pub async fn signup_form() -> HttpResponse {
    views::page(views::signup())
}

/// POST /signup
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<CredentialsForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let credentials = Credentials::new(form.name, form.password);

    state
        .credentials
        .register(&credentials)
        .await
        .or_respond("Error signing up")?;

    Ok(see_other("/signin"))
}

/// GET /signin
pub async fn signin_form() -> HttpResponse {
    views::page(views::signin())
}

/// POST /signin
pub async fn signin(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<CredentialsForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let credentials = Credentials::new(form.name, form.password);
    let previous = state.cookies.read(&req);

    let session = state
        .credentials
        .authenticate(&credentials, previous.as_ref())
        .await
        .or_respond("Error signing in")?;

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(state.cookies.issue(&session.token))
        .finish())
}

/// POST /signout
///
/// Succeeds without a session too; the cookie is cleared either way.
pub async fn signout(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    if let Some(token) = state.cookies.read(&req) {
        state
            .credentials
            .sign_out(&token)
            .await
            .or_respond("Error signing out")?;
    }

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/signin"))
        .cookie(state.cookies.removal())
        .finish())
}

pub(super) fn see_other(location: &'static str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
