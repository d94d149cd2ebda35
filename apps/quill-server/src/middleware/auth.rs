//! Session guard extractors.

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode,
    http::header, web,
};
use futures::future::LocalBoxFuture;

use quill_core::domain::SessionUser;

use crate::state::AppState;

/// The signed-in user.
///
/// Extracting it is the auth guard: requests without a live session are
/// redirected to `/signin` before the handler runs.
///
/// ```ignore
/// async fn create_form(user: CurrentUser) -> impl Responder {
///     format!("Hello, {}!", user.0.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

/// The signed-in user, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionUser>);

/// Rejection raised by [`CurrentUser`] for anonymous requests.
#[derive(Debug)]
pub struct SignInRequired;

impl std::fmt::Display for SignInRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sign-in required")
    }
}

impl ResponseError for SignInRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/signin"))
            .finish()
    }
}

impl FromRequest for CurrentUser {
    type Error = SignInRequired;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let lookup = session_user(req);
        Box::pin(async move {
            match lookup.await {
                Some(user) => Ok(CurrentUser(user)),
                None => Err(SignInRequired),
            }
        })
    }
}

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let lookup = session_user(req);
        Box::pin(async move { Ok(MaybeUser(lookup.await)) })
    }
}

/// Resolve the request's session cookie to a live session user.
///
/// Store failures count as "not signed in".
fn session_user(req: &HttpRequest) -> LocalBoxFuture<'static, Option<SessionUser>> {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = state.as_ref().and_then(|s| s.cookies.read(req));

    Box::pin(async move {
        let Some(state) = state else {
            tracing::error!("AppState not found in app data");
            return None;
        };
        let token = token?;

        match state.credentials.current_user(&token).await {
            Ok(user) => {
                if user.is_none() {
                    tracing::debug!(?token, "Session cookie refers to no live session");
                }
                user
            }
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                None
            }
        }
    })
}
