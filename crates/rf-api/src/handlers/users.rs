//! Profiles, account settings and account deletion.

use actix_multipart::Multipart;
use actix_web::web::{Data, Path};
use actix_web::HttpResponse;
use chrono::Utc;
use futures_util::TryStreamExt;
use rf_core::validation::{self, Violations, MAX_AVATAR_BYTES};
use rf_core::{policy, AppError, Role, User};
use rf_ui::{display_time, ProfileView, UserTemplate};
use uuid::Uuid;

use super::{redirect, render, AppState};
use crate::error::{ApiError, ApiResult};
use crate::extract::{removal_session_cookie, CurrentUser, PageContext};

async fn load_user(data: &AppState, id: Uuid) -> ApiResult<User> {
    data.repo
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id).into())
}

pub async fn show(data: Data<AppState>, ctx: PageContext, path: Path<Uuid>) -> ApiResult {
    let user = load_user(&data, path.into_inner()).await?;

    let ban_note = match data.repo.get_ban_for_user(user.id).await? {
        Some(ban) if ban.is_active(Utc::now()) => {
            format!("Banned until {}: {}", display_time(&ban.expires_at), ban.reason)
        }
        _ => String::new(),
    };
    let avatar_url = match &user.avatar {
        Some(media_id) => data.store.get_url(media_id).await,
        None => String::new(),
    };
    let can_edit = ctx
        .actor()
        .is_some_and(|actor| policy::authorize_owner(&actor, user.id).is_ok());

    render(UserTemplate {
        layout: ctx.layout(user.username.clone()),
        profile: ProfileView {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: if can_edit { user.email.clone() } else { String::new() },
            has_avatar: !avatar_url.is_empty(),
            avatar_url,
            is_moderator: user.is_moderator(),
            is_deleted: user.is_deleted,
            ban_note,
            joined: display_time(&user.created_at),
            can_edit,
        },
    })
}

/// The parts of the settings form that were actually sent.
#[derive(Default)]
struct SettingsForm {
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
    avatar: Option<(String, Vec<u8>)>,
}

fn bad_multipart(err: actix_multipart::MultipartError) -> ApiError {
    AppError::BadRequest(format!("malformed upload: {err}")).into()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

async fn read_settings(mut payload: Multipart) -> ApiResult<SettingsForm> {
    let mut form = SettingsForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let filename = disposition.get_filename().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            bytes.extend_from_slice(&chunk);
            if bytes.len() > MAX_AVATAR_BYTES {
                return Err(AppError::invalid("Avatar must be at most 2 MiB").into());
            }
        }

        match name.as_str() {
            "email" => form.email = Some(text(&bytes)),
            "password" => form.password = Some(text(&bytes)),
            "role" => form.role = Some(text(&bytes)),
            // Browsers send an empty file part when nothing was chosen
            "avatar" => match filename {
                Some(filename) if !filename.is_empty() => form.avatar = Some((filename, bytes)),
                _ => {}
            },
            _ => {}
        }
    }
    Ok(form)
}

/// Applies the settings form: email, password, avatar and (moderators only) role.
pub async fn update(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    payload: Multipart,
) -> ApiResult {
    let actor = current.actor();
    let mut user = load_user(&data, path.into_inner()).await?;
    if user.is_deleted {
        return Err(AppError::not_found("User", user.id).into());
    }
    policy::authorize_owner(&actor, user.id)?;

    let form = read_settings(payload).await?;
    let mut violations = Violations::new();

    let email = form
        .email
        .map(|raw| validation::normalize_email(&raw))
        .filter(|email| !email.is_empty() && *email != user.email);
    if let Some(email) = &email {
        validation::email(&mut violations, email);
    }
    let password = form.password.filter(|p| !p.is_empty());
    if let Some(password) = &password {
        validation::password(&mut violations, password);
    }
    let role = match form.role.as_deref().map(str::trim) {
        None => user.role,
        Some("") => None,
        Some(raw) => match Role::parse(raw) {
            Some(role) => Some(role),
            None => {
                violations.check(false, format!("Unknown role {raw}"));
                user.role
            }
        },
    };
    let avatar_ext = match &form.avatar {
        Some((filename, _)) => match validation::avatar_extension(filename) {
            Ok(ext) => Some(ext),
            Err(_) => {
                violations.check(false, "Avatar must be a .jpg, .jpeg or .png file");
                None
            }
        },
        None => None,
    };
    violations.finish()?;

    if role != user.role {
        policy::require_moderator(&actor)?;
    }
    if let Some(email) = &email {
        if data.repo.get_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("that email address is already registered".into()).into());
        }
    }

    if let Some(email) = email {
        user.email = email;
    }
    if let Some(password) = password {
        user.password_hash = data.auth.hash_password(&password).await?;
    }
    if role != user.role {
        log::info!("{} changed role of {} to {:?}", current.user.username, user.username, role);
        user.role = role;
    }
    let mut replaced_avatar = None;
    if let (Some((_, bytes)), Some(ext)) = (form.avatar, avatar_ext) {
        let media_id = data.store.save_avatar(bytes, ext).await?;
        replaced_avatar = user.avatar.replace(media_id);
    }
    user.updated_at = Utc::now();
    data.repo.update_user(&user).await?;

    if let Some(old) = replaced_avatar {
        if let Err(err) = data.store.remove(&old).await {
            log::warn!("could not remove old avatar {old}: {err:#}");
        }
    }
    Ok(redirect(format!("/users/{}", user.id)))
}

/// Soft delete: the row and its content stay, every session ends.
pub async fn delete(data: Data<AppState>, current: CurrentUser, path: Path<Uuid>) -> ApiResult {
    let actor = current.actor();
    let mut user = load_user(&data, path.into_inner()).await?;
    policy::authorize_owner(&actor, user.id)?;
    if user.is_deleted {
        return Err(AppError::not_found("User", user.id).into());
    }

    user.is_deleted = true;
    user.updated_at = Utc::now();
    data.repo.update_user(&user).await?;
    data.auth.end_user_sessions(user.id);
    log::info!("user {} deleted by {}", user.username, current.user.username);

    let mut res = HttpResponse::SeeOther();
    res.insert_header(("Location", "/"));
    if user.id == actor.id {
        res.cookie(removal_session_cookie());
    }
    Ok(res.finish())
}
