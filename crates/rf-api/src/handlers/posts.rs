use actix_web::web::{Data, Form, Path};
use chrono::Utc;
use rf_core::{policy, validation, AppError, Post};
use serde::Deserialize;
use uuid::Uuid;

use super::{discussion_url, redirect, AppState};
use crate::error::ApiResult;
use crate::extract::CurrentUser;

#[derive(Deserialize)]
pub struct PostForm {
    content: String,
}

async fn load_post(data: &AppState, id: Uuid) -> ApiResult<Post> {
    data.repo
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", id).into())
}

pub async fn update(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<PostForm>,
) -> ApiResult {
    let mut post = load_post(&data, path.into_inner()).await?;
    policy::authorize_owner(&current.actor(), post.author_id)?;
    validation::post(&input.content)?;

    post.content = input.content;
    post.updated_at = Utc::now();
    data.repo.update_post(&post).await?;
    Ok(redirect(format!("{}#post-{}", discussion_url(post.discussion), post.id)))
}

pub async fn delete(data: Data<AppState>, current: CurrentUser, path: Path<Uuid>) -> ApiResult {
    let post = load_post(&data, path.into_inner()).await?;
    policy::authorize_owner(&current.actor(), post.author_id)?;
    data.repo.delete_post(post.id).await?;
    Ok(redirect(discussion_url(post.discussion)))
}
