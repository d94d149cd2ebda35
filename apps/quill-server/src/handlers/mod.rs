//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        // Credential forms, throttled on submit
        .service(
            web::resource("/signup")
                .wrap(RateLimitMiddleware)
                .route(web::get().to(auth::signup_form))
                .route(web::post().to(auth::signup)),
        )
        .service(
            web::resource("/signin")
                .wrap(RateLimitMiddleware)
                .route(web::get().to(auth::signin_form))
                .route(web::post().to(auth::signin)),
        )
        .route("/signout", web::post().to(auth::signout))
        // Posts
        .service(
            web::resource("/create")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create)),
        )
        .service(
            web::resource("/edit/{id}")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::update)),
        )
        .route("/delete/{id}", web::post().to(posts::delete))
        .route("/post/{id}", web::get().to(posts::show));
}
