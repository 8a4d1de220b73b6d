//! Up/down votes. One rating per user and rateable.

use actix_web::web::{Data, Form, Path};
use chrono::Utc;
use rf_core::{policy, AppError, Rating, RatingValue};
use serde::Deserialize;
use uuid::Uuid;

use super::{locate, redirect, resolve_rateable, AppState};
use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;

#[derive(Deserialize)]
pub struct NewRatingForm {
    rateable_id: Uuid,
    value: i64,
}

#[derive(Deserialize)]
pub struct RatingForm {
    value: i64,
}

fn parse_value(raw: i64) -> ApiResult<RatingValue> {
    RatingValue::try_from(raw).map_err(|_| AppError::invalid("Rating must be 1 or -1").into())
}

fn already_rated() -> ApiError {
    AppError::Conflict("you have already rated this; change or remove your existing rating instead".into()).into()
}

async fn load_rating(data: &AppState, id: Uuid) -> ApiResult<Rating> {
    data.repo
        .get_rating(id)
        .await?
        .ok_or_else(|| AppError::not_found("Rating", id).into())
}

pub async fn create(data: Data<AppState>, current: CurrentUser, Form(input): Form<NewRatingForm>) -> ApiResult {
    let value = parse_value(input.value)?;
    let target = resolve_rateable(&data, input.rateable_id).await?;
    let back = locate(&data, &current.actor(), target).await?;
    if data.repo.find_rating(current.user.id, target.id).await?.is_some() {
        return Err(already_rated());
    }

    let rating = Rating {
        id: Uuid::now_v7(),
        owner_id: current.user.id,
        target,
        value,
        created_at: Utc::now(),
    };
    if !data.repo.create_rating(&rating).await? {
        // Lost a race with another request from the same user
        return Err(already_rated());
    }
    Ok(redirect(back))
}

pub async fn update(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<RatingForm>,
) -> ApiResult {
    let mut rating = load_rating(&data, path.into_inner()).await?;
    let actor = current.actor();
    policy::authorize_owner(&actor, rating.owner_id)?;
    rating.value = parse_value(input.value)?;
    data.repo.update_rating(&rating).await?;
    Ok(redirect(locate(&data, &actor, rating.target).await?))
}

pub async fn delete(data: Data<AppState>, current: CurrentUser, path: Path<Uuid>) -> ApiResult {
    let rating = load_rating(&data, path.into_inner()).await?;
    let actor = current.actor();
    policy::authorize_owner(&actor, rating.owner_id)?;
    data.repo.delete_rating(rating.id).await?;
    Ok(redirect(locate(&data, &actor, rating.target).await?))
}
