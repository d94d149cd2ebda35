//! Rate limiting middleware for the credential forms.
//!
//! Only state-changing requests count against the budget, so rendering the
//! signin page never locks anyone out. The limiter is taken from
//! [`AppState`]; without one every request passes.
//!
//! Clients are keyed by socket peer address. Forwarding headers are
//! client-controlled and only honoured when the deployment opts in.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{self, ContentType},
    web,
};
use futures::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

use crate::state::AppState;

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = if req.method().is_safe() {
            None
        } else {
            req.app_data::<web::Data<AppState>>().and_then(|state| {
                let limiter = state.limiter.clone()?;
                Some((limiter, state.trust_proxy_headers))
            })
        };

        Box::pin(async move {
            let Some((limiter, trust_proxy_headers)) = policy else {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            };

            let key = client_key(&req, trust_proxy_headers);

            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    let retry_after = result.reset_after.as_secs().max(1);
                    tracing::warn!(client = %key, path = %req.path(), retry_after, "Rate limit exceeded");

                    let response = HttpResponse::TooManyRequests()
                        .insert_header((header::RETRY_AFTER, retry_after.to_string()))
                        .content_type(ContentType::plaintext())
                        .body("Too many attempts. Try again later.");

                    Ok(req.into_response(response).map_into_right_body())
                }
                Ok(_) => service.call(req).await.map(ServiceResponse::map_into_left_body),
                Err(e) => {
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
            }
        })
    }
}

fn client_key(req: &ServiceRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(forwarded) = req.connection_info().realip_remote_addr() {
            return forwarded.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
