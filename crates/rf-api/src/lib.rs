//! # rf-api
//!
//! The web routing and orchestration layer for Rusty-Forum.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
mod views;

pub use error::{ApiError, ApiResult};

use actix_web::{guard, web, Route};

use handlers::{auth, bans, complaints, messages, pages, posts, ratings, sections, topics, users};

/// Largest urlencoded form accepted; comfortably above the content limit.
const FORM_LIMIT: usize = 256 * 1024;

/// PUT, or PATCH for clients that prefer it.
fn update() -> Route {
    web::route().guard(guard::Any(guard::Put()).or(guard::Patch()))
}

/// Configures the routes for the forum.
///
/// # Developer Note
/// Every state-changing route relies on `middleware::csrf_guard` wrapping the
/// App: it turns `_method` overrides into real methods and rejects requests
/// without a valid CSRF token before routing.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(FORM_LIMIT)
            .error_handler(error::form_error),
    )
        .route("/", web::get().to(pages::index))
        // Accounts
        .route("/login", web::get().to(auth::login_page))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::post().to(auth::logout))
        .route("/register", web::get().to(auth::register_page))
        .route("/users", web::post().to(auth::register))
        .service(
            web::resource("/users/{id}")
                .route(web::get().to(users::show))
                .route(update().to(users::update))
                .route(web::delete().to(users::delete)),
        )
        // Sections and topics
        .route("/sections", web::post().to(sections::create))
        .service(
            web::resource("/sections/{id}")
                .route(web::get().to(sections::show))
                .route(update().to(sections::update))
                .route(web::delete().to(sections::delete)),
        )
        .route("/sections/{id}/topics", web::post().to(topics::create))
        .service(
            web::resource("/topics/{id}")
                .route(web::get().to(topics::show))
                .route(update().to(topics::update))
                .route(web::delete().to(topics::delete)),
        )
        .route("/topics/{id}/posts", web::post().to(topics::reply))
        .service(
            web::resource("/posts/{id}")
                .route(update().to(posts::update))
                .route(web::delete().to(posts::delete)),
        )
        // Private messages
        .service(
            web::resource("/messages")
                .route(web::get().to(messages::index))
                .route(web::post().to(messages::create)),
        )
        .service(
            web::resource("/messages/{id}")
                .route(web::get().to(messages::show))
                .route(update().to(messages::update)),
        )
        .route("/messages/{id}/posts", web::post().to(messages::reply))
        // Ratings and complaints
        .route("/ratings", web::post().to(ratings::create))
        .service(
            web::resource("/ratings/{id}")
                .route(update().to(ratings::update))
                .route(web::delete().to(ratings::delete)),
        )
        .route("/rateables/{id}/complaints", web::post().to(complaints::create))
        .route("/complaints", web::get().to(complaints::index))
        .route("/complaints/{id}", web::delete().to(complaints::delete))
        // Moderation
        .service(
            web::resource("/bans")
                .route(web::get().to(bans::index))
                .route(web::post().to(bans::create)),
        )
        .service(
            web::resource("/bans/{id}")
                .route(update().to(bans::update))
                .route(web::delete().to(bans::delete)),
        );
}
