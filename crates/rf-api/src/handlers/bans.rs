//! Moderator-managed bans. A user has at most one ban; banning again replaces it.

use actix_web::web::{Data, Form, Path};
use chrono::Utc;
use rf_core::{policy, validation, AppError, Ban};
use rf_ui::{display_time, input_time, BanView, BansTemplate};
use serde::Deserialize;
use uuid::Uuid;

use super::{redirect, render, AppState};
use crate::error::ApiResult;
use crate::extract::{CsrfToken, CurrentUser, PageContext};
use crate::views::Authors;

#[derive(Deserialize)]
pub struct NewBanForm {
    username: String,
    reason: String,
    expires_at: String,
}

#[derive(Deserialize)]
pub struct BanForm {
    reason: String,
    expires_at: String,
}

async fn load_ban(data: &AppState, id: Uuid) -> ApiResult<Ban> {
    data.repo
        .get_ban(id)
        .await?
        .ok_or_else(|| AppError::not_found("Ban", id).into())
}

pub async fn index(data: Data<AppState>, current: CurrentUser, csrf: CsrfToken) -> ApiResult {
    policy::require_moderator(&current.actor())?;
    let bans = data.repo.list_bans().await?;
    let user_ids: Vec<Uuid> = bans.iter().map(|b| b.user_id).collect();
    let users = Authors::load(data.repo.as_ref(), &user_ids).await?;

    let now = Utc::now();
    let bans = bans
        .iter()
        .map(|b| BanView {
            id: b.id.to_string(),
            user_id: b.user_id.to_string(),
            username: users.name(b.user_id),
            reason: b.reason.clone(),
            expires: display_time(&b.expires_at),
            expires_input: input_time(&b.expires_at),
            is_active: b.is_active(now),
        })
        .collect();

    let ctx = PageContext { user: Some(current.user), csrf: csrf.0 };
    render(BansTemplate { layout: ctx.layout("Bans"), bans })
}

pub async fn create(data: Data<AppState>, current: CurrentUser, Form(input): Form<NewBanForm>) -> ApiResult {
    let actor = current.actor();
    policy::require_moderator(&actor)?;
    let user = data
        .repo
        .get_user_by_username(input.username.trim())
        .await?
        .ok_or_else(|| AppError::invalid(format!("Unknown user {}", input.username.trim())))?;
    policy::authorize_ban(&actor, user.id)?;

    let now = Utc::now();
    let expires_at = validation::parse_expiry(&input.expires_at)?;
    validation::ban(&input.reason, expires_at, now)?;

    match data.repo.get_ban_for_user(user.id).await? {
        Some(mut ban) => {
            ban.reason = input.reason.trim().to_string();
            ban.expires_at = expires_at;
            data.repo.update_ban(&ban).await?;
        }
        None => {
            let ban = Ban {
                id: Uuid::now_v7(),
                user_id: user.id,
                reason: input.reason.trim().to_string(),
                expires_at,
                created_at: now,
            };
            data.repo.create_ban(&ban).await?;
        }
    }
    data.auth.end_user_sessions(user.id);
    log::info!("{} banned {} until {expires_at}", current.user.username, user.username);
    Ok(redirect("/bans"))
}

pub async fn update(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<BanForm>,
) -> ApiResult {
    policy::require_moderator(&current.actor())?;
    let mut ban = load_ban(&data, path.into_inner()).await?;

    let now = Utc::now();
    let expires_at = validation::parse_expiry(&input.expires_at)?;
    validation::ban(&input.reason, expires_at, now)?;

    ban.reason = input.reason.trim().to_string();
    ban.expires_at = expires_at;
    data.repo.update_ban(&ban).await?;
    data.auth.end_user_sessions(ban.user_id);
    Ok(redirect("/bans"))
}

/// Lifts a ban.
pub async fn delete(data: Data<AppState>, current: CurrentUser, path: Path<Uuid>) -> ApiResult {
    policy::require_moderator(&current.actor())?;
    let ban = load_ban(&data, path.into_inner()).await?;
    data.repo.delete_ban(ban.id).await?;
    log::info!("{} lifted ban {} on user {}", current.user.username, ban.id, ban.user_id);
    Ok(redirect("/bans"))
}
