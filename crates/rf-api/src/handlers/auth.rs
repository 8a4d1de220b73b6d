//! Registration, login and logout.

use actix_web::web::{Data, Form, Query};
use actix_web::HttpResponse;
use chrono::Utc;
use rf_core::{validation, AppError, User};
use rf_ui::{LoginTemplate, RegisterTemplate};
use serde::Deserialize;
use uuid::Uuid;

use super::{redirect, render, AppState};
use crate::error::ApiResult;
use crate::extract::{build_session_cookie, removal_session_cookie, CsrfToken, CurrentUser, PageContext};

#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    banned: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
    password_confirmation: String,
}

pub async fn login_page(csrf: CsrfToken, query: Query<LoginQuery>) -> ApiResult {
    let ctx = PageContext { user: None, csrf: csrf.0 };
    render(LoginTemplate {
        layout: ctx.layout("Log in"),
        banned: query.banned.is_some(),
        error: if query.error.is_some() {
            "Wrong user name or password".into()
        } else {
            String::new()
        },
    })
}

pub async fn register_page(ctx: PageContext) -> ApiResult {
    render(RegisterTemplate { layout: ctx.layout("Register") })
}

/// Creates the account, logs it in and returns to the index.
pub async fn register(data: Data<AppState>, Form(input): Form<RegisterForm>) -> ApiResult {
    let username = input.username.trim();
    let email = validation::normalize_email(&input.email);
    validation::registration(username, &email, &input.password, &input.password_confirmation)?;

    if data.repo.get_user_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("that user name is already taken".into()).into());
    }
    if data.repo.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("that email address is already registered".into()).into());
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::now_v7(),
        username: username.to_string(),
        email,
        password_hash: data.auth.hash_password(&input.password).await?,
        avatar: None,
        is_deleted: false,
        role: None,
        created_at: now,
        updated_at: now,
    };
    data.repo.create_user(&user).await?;
    log::info!("registered user {} ({})", user.username, user.id);

    let session_id = data.auth.create_session(user.id);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .cookie(build_session_cookie(&session_id))
        .finish())
}

pub async fn login(data: Data<AppState>, Form(input): Form<LoginForm>) -> ApiResult {
    let user = match data.repo.get_user_by_username(input.username.trim()).await? {
        Some(user) if !user.is_deleted => user,
        _ => {
            log::warn!("login failed: unknown user {:?}", input.username);
            return Ok(redirect("/login?error=1"));
        }
    };
    if !data.auth.verify_password(&input.password, &user.password_hash).await {
        log::warn!("login failed: wrong password for {}", user.username);
        return Ok(redirect("/login?error=1"));
    }
    if let Some(ban) = data.repo.get_ban_for_user(user.id).await? {
        if ban.is_active(Utc::now()) {
            log::warn!("login refused: {} is banned until {}", user.username, ban.expires_at);
            return Err(AppError::Banned.into());
        }
    }

    let session_id = data.auth.create_session(user.id);
    log::info!("user {} logged in", user.username);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .cookie(build_session_cookie(&session_id))
        .finish())
}

pub async fn logout(data: Data<AppState>, current: CurrentUser) -> ApiResult {
    data.auth.end_session(&current.session_id);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .cookie(removal_session_cookie())
        .finish())
}
