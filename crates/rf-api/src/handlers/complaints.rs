//! Content reports and the moderator queue.

use actix_web::web::{Data, Form, Path};
use chrono::Utc;
use rf_core::{policy, validation, AppError, Complaint};
use rf_ui::{display_time, ComplaintView, ComplaintsTemplate};
use serde::Deserialize;
use uuid::Uuid;

use super::{locate, redirect, render, resolve_rateable, AppState};
use crate::error::ApiResult;
use crate::extract::{CsrfToken, CurrentUser, PageContext};
use crate::views::Authors;

#[derive(Deserialize)]
pub struct ComplaintForm {
    reason: String,
}

pub async fn index(data: Data<AppState>, current: CurrentUser, csrf: CsrfToken) -> ApiResult {
    let actor = current.actor();
    policy::require_moderator(&actor)?;

    let complaints = data.repo.list_complaints().await?;
    let author_ids: Vec<Uuid> = complaints.iter().map(|c| c.author_id).collect();
    let authors = Authors::load(data.repo.as_ref(), &author_ids).await?;

    let mut views = Vec::with_capacity(complaints.len());
    for complaint in &complaints {
        let link = match locate(&data, &actor, complaint.target).await {
            Ok(url) => url,
            Err(err) => {
                log::warn!("complaint {} points at missing content: {err}", complaint.id);
                "#".into()
            }
        };
        views.push(ComplaintView {
            id: complaint.id.to_string(),
            author_name: authors.name(complaint.author_id),
            target_kind: complaint.target.kind.as_str().to_string(),
            target_link: link,
            reason: complaint.reason.clone(),
            created: display_time(&complaint.created_at),
        });
    }

    let ctx = PageContext { user: Some(current.user), csrf: csrf.0 };
    render(ComplaintsTemplate { layout: ctx.layout("Complaints"), complaints: views })
}

/// Reports a topic, post or private message the user can see.
pub async fn create(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<ComplaintForm>,
) -> ApiResult {
    let target = resolve_rateable(&data, path.into_inner()).await?;
    let back = locate(&data, &current.actor(), target).await?;
    validation::complaint(&input.reason)?;

    let complaint = Complaint {
        id: Uuid::now_v7(),
        author_id: current.user.id,
        target,
        reason: input.reason.trim().to_string(),
        created_at: Utc::now(),
    };
    data.repo.create_complaint(&complaint).await?;
    log::info!("{} reported {} {}", current.user.username, target.kind.as_str(), target.id);
    Ok(redirect(back))
}

/// Dismissal by a moderator, or withdrawal by the author.
pub async fn delete(data: Data<AppState>, current: CurrentUser, path: Path<Uuid>) -> ApiResult {
    let id = path.into_inner();
    let complaint = data
        .repo
        .get_complaint(id)
        .await?
        .ok_or_else(|| AppError::not_found("Complaint", id))?;
    let actor = current.actor();
    policy::authorize_owner(&actor, complaint.author_id)?;
    data.repo.delete_complaint(complaint.id).await?;
    Ok(redirect(if actor.is_moderator() { "/complaints" } else { "/" }))
}
