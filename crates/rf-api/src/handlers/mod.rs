//! # rf-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.
//! Each submodule owns one resource; the helpers here are shared by all of them.

pub mod auth;
pub mod bans;
pub mod complaints;
pub mod messages;
pub mod pages;
pub mod posts;
pub mod ratings;
pub mod sections;
pub mod topics;
pub mod users;

use actix_web::http::header::{ContentType, LOCATION};
use actix_web::HttpResponse;
use askama::Template;
use rf_core::traits::{AuthProvider, ForumRepo, MediaStore};
use rf_core::{policy, Actor, AppError, DiscussionRef, RateableKind, RateableRef};

use crate::error::ApiResult;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Box<dyn ForumRepo>,
    pub store: Box<dyn MediaStore>,
    pub auth: Box<dyn AuthProvider>,
}

/// `303 See Other`, the answer to every successful form submission.
pub(crate) fn redirect(to: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, to.as_ref()))
        .finish()
}

pub(crate) fn render(page: impl Template) -> ApiResult {
    let html = page
        .render()
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

pub(crate) fn discussion_url(discussion: DiscussionRef) -> String {
    match discussion {
        DiscussionRef::Topic(id) => format!("/topics/{id}"),
        DiscussionRef::Message(id) => format!("/messages/{id}"),
    }
}

/// Finds the page a rateable is shown on, refusing content the actor may not see.
pub(crate) async fn locate(state: &AppState, actor: &Actor, target: RateableRef) -> ApiResult<String> {
    let discussion = match target.kind {
        RateableKind::Topic => DiscussionRef::Topic(target.id),
        RateableKind::Message => DiscussionRef::Message(target.id),
        RateableKind::Post => {
            let post = state
                .repo
                .get_post(target.id)
                .await?
                .ok_or_else(|| AppError::not_found("Post", target.id))?;
            post.discussion
        }
    };
    if let DiscussionRef::Message(id) = discussion {
        let message = state
            .repo
            .get_message(id)
            .await?
            .ok_or_else(|| AppError::not_found("PrivateMessage", id))?;
        policy::authorize_participant(actor, &message)?;
    }
    Ok(discussion_url(discussion))
}

/// Resolves a bare rateable id to its kind, or 404.
pub(crate) async fn resolve_rateable(state: &AppState, id: uuid::Uuid) -> ApiResult<RateableRef> {
    state
        .repo
        .resolve_rateable(id)
        .await?
        .ok_or_else(|| AppError::not_found("Rateable", id).into())
}
