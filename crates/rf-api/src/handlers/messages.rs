//! Private messages. Outsiders get 404 for every message route.

use actix_web::web::{Data, Form, Path};
use chrono::Utc;
use rf_core::validation::{self, Violations};
use rf_core::{policy, AppError, DiscussionRef, Post, PrivateMessage};
use rf_ui::{display_time, MessageSummary, MessageTemplate, MessagesTemplate};
use serde::Deserialize;
use uuid::Uuid;

use super::{redirect, render, AppState};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, CsrfToken, PageContext};
use crate::views::{entry_view, Authors, Entry, PageRatings};

#[derive(Deserialize)]
pub struct NewMessageForm {
    recipients: String,
    title: String,
    content: String,
}

#[derive(Deserialize)]
pub struct EditMessageForm {
    title: String,
    content: String,
}

#[derive(Deserialize)]
pub struct ReplyForm {
    content: String,
}

/// Loads a message the user is allowed to see.
async fn load_visible(data: &AppState, current: &CurrentUser, id: Uuid) -> ApiResult<PrivateMessage> {
    let message = data
        .repo
        .get_message(id)
        .await?
        .ok_or_else(|| AppError::not_found("PrivateMessage", id))?;
    policy::authorize_participant(&current.actor(), &message)?;
    Ok(message)
}

fn page(current: CurrentUser, csrf: CsrfToken) -> PageContext {
    PageContext { user: Some(current.user), csrf: csrf.0 }
}

pub async fn index(data: Data<AppState>, current: CurrentUser, csrf: CsrfToken) -> ApiResult {
    let messages = data.repo.list_messages_for(current.user.id).await?;
    let participant_ids: Vec<Uuid> = messages.iter().flat_map(|m| m.participants.clone()).collect();
    let authors = Authors::load(data.repo.as_ref(), &participant_ids).await?;

    let messages = messages
        .iter()
        .map(|m| MessageSummary {
            id: m.id.to_string(),
            title: m.title.clone(),
            participants: m
                .participants
                .iter()
                .map(|id| authors.name(*id))
                .collect::<Vec<_>>()
                .join(", "),
            updated: display_time(&m.updated_at),
        })
        .collect();

    let ctx = page(current, csrf);
    render(MessagesTemplate { layout: ctx.layout("Private messages"), messages })
}

pub async fn show(data: Data<AppState>, current: CurrentUser, csrf: CsrfToken, path: Path<Uuid>) -> ApiResult {
    let message = load_visible(&data, &current, path.into_inner()).await?;
    let posts = data.repo.list_posts(DiscussionRef::Message(message.id)).await?;

    let actor = current.actor();
    let mut ids = vec![message.id];
    ids.extend(posts.iter().map(|p| p.id));
    let mut author_ids = message.participants.clone();
    author_ids.extend(posts.iter().map(|p| p.author_id));
    let authors = Authors::load(data.repo.as_ref(), &author_ids).await?;
    let ratings = PageRatings::load(data.repo.as_ref(), Some(actor.id), &ids).await?;

    let message_entry = entry_view(
        Entry {
            id: message.id,
            title: &message.title,
            author_id: message.author_id,
            content: &message.content,
            created_at: message.created_at,
        },
        &authors,
        &ratings,
        Some(&actor),
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
                Some(&actor),
            )
        })
        .collect();
    let participants = message
        .participants
        .iter()
        .map(|id| authors.name(*id))
        .collect::<Vec<_>>()
        .join(", ");

    let ctx = page(current, csrf);
    render(MessageTemplate {
        layout: ctx.layout(message.title.clone()),
        message: message_entry,
        participants,
        posts,
    })
}

/// Starts a conversation between the author and the named recipients.
pub async fn create(data: Data<AppState>, current: CurrentUser, Form(input): Form<NewMessageForm>) -> ApiResult {
    validation::discussion(&input.title, &input.content)?;
    let names = validation::recipients(&input.recipients)?;

    let mut violations = Violations::new();
    let mut participants = vec![current.user.id];
    for name in &names {
        match data.repo.get_user_by_username(name).await? {
            Some(user) if !user.is_deleted => {
                if !participants.contains(&user.id) {
                    participants.push(user.id);
                }
            }
            _ => {
                violations.check(false, format!("Unknown user {name}"));
            }
        }
    }
    if violations.is_empty() {
        violations.check(participants.len() > 1, "A message needs at least one other participant");
    }
    violations.finish()?;

    let now = Utc::now();
    let message = PrivateMessage {
        id: Uuid::now_v7(),
        author_id: current.user.id,
        title: input.title.trim().to_string(),
        content: input.content,
        participants,
        created_at: now,
        updated_at: now,
    };
    data.repo.create_message(&message).await?;
    Ok(redirect(format!("/messages/{}", message.id)))
}

/// Only the author (or a moderator) may edit; the recipients are fixed.
pub async fn update(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<EditMessageForm>,
) -> ApiResult {
    let mut message = load_visible(&data, &current, path.into_inner()).await?;
    policy::authorize_owner(&current.actor(), message.author_id)?;
    validation::discussion(&input.title, &input.content)?;

    message.title = input.title.trim().to_string();
    message.content = input.content;
    message.updated_at = Utc::now();
    data.repo.update_message(&message).await?;
    Ok(redirect(format!("/messages/{}", message.id)))
}

pub async fn reply(
    data: Data<AppState>,
    current: CurrentUser,
    path: Path<Uuid>,
    Form(input): Form<ReplyForm>,
) -> ApiResult {
    let message = load_visible(&data, &current, path.into_inner()).await?;
    validation::post(&input.content)?;

    let now = Utc::now();
    let post = Post {
        id: Uuid::now_v7(),
        discussion: DiscussionRef::Message(message.id),
        author_id: current.user.id,
        content: input.content,
        created_at: now,
        updated_at: now,
    };
    data.repo.create_post(&post).await?;
    Ok(redirect(format!("/messages/{}#post-{}", message.id, post.id)))
}
