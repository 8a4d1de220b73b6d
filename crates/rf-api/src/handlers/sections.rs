//! Sections: public listing, moderator-only management.

use actix_web::web::{Data, Form, Path};
use chrono::Utc;
use rf_core::{policy, validation, AppError, Section};
use rf_ui::{display_time, SectionTemplate, TopicSummary};
use serde::Deserialize;
use uuid::Uuid;

use super::{redirect, render, AppState};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, PageContext};
use crate::views::{section_view, Authors};

#[derive(Deserialize)]
pub struct SectionForm {
    name: String,
    #[serde(default)]
    description: String,
}

async fn load_section(data: &AppState, id: Uuid) -> ApiResult<Section> {
    data.repo
        .get_section(id)
        .await?
        .ok_or_else(|| AppError::not_found("Section", id).into())
}

/// Section names are unique; `own_id` is the section being edited, if any.
async fn ensure_name_free(data: &AppState, name: &str, own_id: Option<Uuid>) -> ApiResult<()> {
    match data.repo.get_section_by_name(name).await? {
        Some(existing) if Some(existing.id) != own_id => {
            Err(AppError::Conflict(format!("a section named {name:?} already exists")).into())
        }
        _ => Ok(()),
    }
}

/// Renders a section with its topics, pinned first.
pub async fn show(data: Data<AppState>, ctx: PageContext, path: Path<Uuid>) -> ApiResult {
    let section = load_section(&data, path.into_inner()).await?;
    let topics = data.repo.list_topics(section.id).await?;
    let author_ids: Vec<Uuid> = topics.iter().map(|t| t.author_id).collect();
    let authors = Authors::load(data.repo.as_ref(), &author_ids).await?;

    let topics = topics
        .iter()
        .map(|t| TopicSummary {
            id: t.id.to_string(),
            title: t.title.clone(),
            author_name: authors.name(t.author_id),
            is_pinned: t.is_pinned,
            is_open: t.is_open,
            updated: display_time(&t.updated_at),
        })
        .collect();

    render(SectionTemplate {
        layout: ctx.layout(section.name.clone()),
        section: section_view(&section),
        topics,
    })
}

pub async fn create(data: Data<AppState>, current: CurrentUser, Form(input): Form<SectionForm>) -> ApiResult {
    policy::require_moderator(&current.actor())?;
    let name = input.name.trim();
    validation::section(name, &input.description)?;
    ensure_name_free(&data, name, None).await?;

    let now = Utc::now();
    let section = Section {
        id: Uuid::now_v7(),
        name: name.to_string(),
        description: input.description.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    data.repo.create_section(&section).await?;
    log::info!("section {:?} created by {}", section.name, current.user.username);
    Ok(redirect(format!("/sections/{}", section.id)))
}

pub async fn update(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<SectionForm>,
) -> ApiResult {
    policy::require_moderator(&current.actor())?;
    let mut section = load_section(&data, path.into_inner()).await?;
    let name = input.name.trim();
    validation::section(name, &input.description)?;
    ensure_name_free(&data, name, Some(section.id)).await?;

    section.name = name.to_string();
    section.description = input.description.trim().to_string();
    section.updated_at = Utc::now();
    data.repo.update_section(&section).await?;
    Ok(redirect(format!("/sections/{}", section.id)))
}

/// Removes the section with all of its topics, posts, ratings and complaints.
pub async fn delete(data: Data<AppState>, current: CurrentUser, path: Path<Uuid>) -> ApiResult {
    policy::require_moderator(&current.actor())?;
    let section = load_section(&data, path.into_inner()).await?;
    data.repo.delete_section(section.id).await?;
    log::info!("section {:?} and its topics deleted by {}", section.name, current.user.username);
    Ok(redirect("/"))
}
