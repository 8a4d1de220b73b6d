//! Topics and replies to them.

use actix_web::web::{Data, Form, Path};
use chrono::Utc;
use rf_core::{policy, validation, AppError, DiscussionRef, Post, Topic};
use rf_ui::TopicTemplate;
use serde::Deserialize;
use uuid::Uuid;

use super::{redirect, render, AppState};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, PageContext};
use crate::views::{entry_view, section_view, Authors, Entry, PageRatings};

#[derive(Deserialize)]
pub struct NewTopicForm {
    title: String,
    content: String,
}

/// Absent flags leave the topic as it is.
#[derive(Deserialize)]
pub struct EditTopicForm {
    title: String,
    content: String,
    is_pinned: Option<bool>,
    is_open: Option<bool>,
}

#[derive(Deserialize)]
pub struct ReplyForm {
    content: String,
}

pub(crate) async fn load_topic(data: &AppState, id: Uuid) -> ApiResult<Topic> {
    data.repo
        .get_topic(id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic", id).into())
}

pub async fn show(data: Data<AppState>, ctx: PageContext, path: Path<Uuid>) -> ApiResult {
    let topic = load_topic(&data, path.into_inner()).await?;
    let section = data
        .repo
        .get_section(topic.section_id)
        .await?
        .ok_or_else(|| AppError::not_found("Section", topic.section_id))?;
    let posts = data.repo.list_posts(DiscussionRef::Topic(topic.id)).await?;

    let actor = ctx.actor();
    let mut ids = vec![topic.id];
    ids.extend(posts.iter().map(|p| p.id));
    let mut author_ids = vec![topic.author_id];
    author_ids.extend(posts.iter().map(|p| p.author_id));
    let authors = Authors::load(data.repo.as_ref(), &author_ids).await?;
    let ratings = PageRatings::load(data.repo.as_ref(), actor.map(|a| a.id), &ids).await?;

    let topic_entry = entry_view(
        Entry {
            id: topic.id,
            title: &topic.title,
            author_id: topic.author_id,
            content: &topic.content,
            created_at: topic.created_at,
        },
        &authors,
        &ratings,
        actor.as_ref(),
    );
    let posts = posts
        .iter()
        .map(|p| {
            entry_view(
                Entry {
                    id: p.id,
                    title: "",
                    author_id: p.author_id,
                    content: &p.content,
                    created_at: p.created_at,
                },
                &authors,
                &ratings,
                actor.as_ref(),
            )
        })
        .collect();

    render(TopicTemplate {
        layout: ctx.layout(topic.title.clone()),
        section: section_view(&section),
        topic: topic_entry,
        is_pinned: topic.is_pinned,
        is_open: topic.is_open,
        posts,
    })
}

pub async fn create(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<NewTopicForm>,
) -> ApiResult {
    let section_id = path.into_inner();
    if data.repo.get_section(section_id).await?.is_none() {
        return Err(AppError::not_found("Section", section_id).into());
    }
    validation::discussion(&input.title, &input.content)?;

    let now = Utc::now();
    let topic = Topic {
        id: Uuid::now_v7(),
        section_id,
        author_id: current.user.id,
        title: input.title.trim().to_string(),
        content: input.content,
        is_pinned: false,
        is_open: true,
        created_at: now,
        updated_at: now,
    };
    data.repo.create_topic(&topic).await?;
    Ok(redirect(format!("/topics/{}", topic.id)))
}

/// Edits title and content; pinning and closing are moderator-only.
pub async fn update(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<EditTopicForm>,
) -> ApiResult {
    let actor = current.actor();
    let mut topic = load_topic(&data, path.into_inner()).await?;
    policy::authorize_owner(&actor, topic.author_id)?;

    let is_pinned = input.is_pinned.unwrap_or(topic.is_pinned);
    let is_open = input.is_open.unwrap_or(topic.is_open);
    policy::authorize_topic_flags(&actor, is_pinned != topic.is_pinned, is_open != topic.is_open)?;
    validation::discussion(&input.title, &input.content)?;

    topic.title = input.title.trim().to_string();
    topic.content = input.content;
    topic.is_pinned = is_pinned;
    topic.is_open = is_open;
    topic.updated_at = Utc::now();
    data.repo.update_topic(&topic).await?;
    Ok(redirect(format!("/topics/{}", topic.id)))
}

pub async fn delete(data: Data<AppState>, current: CurrentUser, path: Path<Uuid>) -> ApiResult {
    let topic = load_topic(&data, path.into_inner()).await?;
    policy::authorize_owner(&current.actor(), topic.author_id)?;
    data.repo.delete_topic(topic.id).await?;
    log::info!("topic {} deleted by {}", topic.id, current.user.username);
    Ok(redirect(format!("/sections/{}", topic.section_id)))
}

/// Adds a post to an open topic.
pub async fn reply(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<ReplyForm>,
) -> ApiResult {
    let topic = load_topic(&data, path.into_inner()).await?;
    if !topic.is_open {
        return Err(AppError::Conflict("this topic is closed".into()).into());
    }
    validation::post(&input.content)?;

    let now = Utc::now();
    let post = Post {
        id: Uuid::now_v7(),
        discussion: DiscussionRef::Topic(topic.id),
        author_id: current.user.id,
        content: input.content,
        created_at: now,
        updated_at: now,
    };
    data.repo.create_post(&post).await?;
    Ok(redirect(format!("/topics/{}#post-{}", topic.id, post.id)))
}
