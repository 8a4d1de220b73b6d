//! Request extractors for the logged-in user and the page CSRF token.

use actix_web::cookie::{self, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use chrono::Utc;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use rf_core::{Actor, AppError, User};
use rf_ui::{Layout, Viewer};

use crate::error::ApiError;
use crate::handlers::AppState;

pub const SESSION_COOKIE: &str = "session-id";
const SESSION_COOKIE_DAYS: i64 = 30;

pub fn build_session_cookie(session_id: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id.to_owned())
        .path("/")
        .same_site(SameSite::Strict)
        .http_only(true)
        .max_age(cookie::time::Duration::days(SESSION_COOKIE_DAYS))
        .finish()
}

pub fn removal_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Form token for the current request, placed in extensions by `csrf_guard`.
#[derive(Debug, Clone, Default)]
pub struct CsrfToken(pub String);

impl FromRequest for CsrfToken {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(req.extensions().get::<CsrfToken>().cloned().unwrap_or_default()))
    }
}

fn app_state(req: &HttpRequest) -> Result<Data<AppState>, ApiError> {
    req.app_data::<Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state is not configured".into()).into())
}

/// Looks up the user behind a session cookie.
///
/// Sessions of deleted users are dropped silently. Sessions of banned users are
/// ended and the request fails with `Banned`, which redirects to the login page.
async fn session_user(state: &AppState, session_id: &str) -> Result<Option<User>, ApiError> {
    let Some(user_id) = state.auth.resolve_session(session_id) else {
        return Ok(None);
    };
    let user = match state.repo.get_user(user_id).await? {
        Some(user) if !user.is_deleted => user,
        _ => {
            state.auth.end_user_sessions(user_id);
            return Ok(None);
        }
    };
    if let Some(ban) = state.repo.get_ban_for_user(user.id).await? {
        if ban.is_active(Utc::now()) {
            log::info!("ending sessions of banned user {}", user.username);
            state.auth.end_user_sessions(user.id);
            return Err(AppError::Banned.into());
        }
    }
    Ok(Some(user))
}

/// An authenticated, non-banned user. Rejects with 401 otherwise.
pub struct CurrentUser {
    pub user: User,
    pub session_id: String,
}

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.user)
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let session_id = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
        Box::pin(async move {
            let state = state?;
            let session_id = session_id.ok_or(AppError::Unauthenticated)?;
            match session_user(&state, &session_id).await? {
                Some(user) => Ok(CurrentUser { user, session_id }),
                None => Err(AppError::Unauthenticated.into()),
            }
        })
    }
}

/// Everything a page needs to render its layout; the viewer is optional.
pub struct PageContext {
    pub user: Option<User>,
    pub csrf: String,
}

impl PageContext {
    pub fn actor(&self) -> Option<Actor> {
        self.user.as_ref().map(Actor::from)
    }

    pub fn layout(&self, title: impl Into<String>) -> Layout {
        Layout::new(title, self.user.as_ref().map(Viewer::from), self.csrf.clone())
    }
}

impl FromRequest for PageContext {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let session_id = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
        let csrf = req.extensions().get::<CsrfToken>().cloned().unwrap_or_default().0;
        Box::pin(async move {
            let state = state?;
            let user = match session_id {
                Some(id) => session_user(&state, &id).await?,
                None => None,
            };
            Ok(PageContext { user, csrf })
        })
    }
}
