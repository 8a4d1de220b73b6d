//! Mapping between SQLite rows and `rf-core` domain models.

use anyhow::{anyhow, bail};
use rf_core::error::AppError;
use rf_core::models::{
    Ban, Complaint, DiscussionRef, Post, PrivateMessage, RateableKind, RateableRef, Rating,
    RatingValue, Role, Section, Topic, User,
};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

// Helpers for UUID conversion
pub(crate) fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub(crate) fn uuid_col(row: &SqliteRow, column: &str) -> anyhow::Result<Uuid> {
    let blob: Vec<u8> = row.try_get(column)?;
    Ok(Uuid::from_slice(&blob)?)
}

/// Turns a UNIQUE violation into `AppError::Conflict`; other errors pass through.
pub(crate) fn unique_conflict(err: sqlx::Error) -> anyhow::Error {
    // "UNIQUE constraint failed: users.username"
    let column = match err.as_database_error() {
        Some(db) if db.is_unique_violation() => db
            .message()
            .rsplit('.')
            .next()
            .filter(|c| !c.contains(' '))
            .map(str::to_string)
            .or_else(|| Some("value".to_string())),
        _ => None,
    };
    match column {
        Some(column) => AppError::Conflict(format!("{column} is already taken")).into(),
        None => err.into(),
    }
}

fn opt_uuid_col(row: &SqliteRow, column: &str) -> anyhow::Result<Option<Uuid>> {
    let blob: Option<Vec<u8>> = row.try_get(column)?;
    blob.map(|b| Uuid::from_slice(&b).map_err(Into::into)).transpose()
}

fn target(row: &SqliteRow) -> anyhow::Result<RateableRef> {
    let kind: String = row.try_get("target_kind")?;
    let kind = RateableKind::parse(&kind).ok_or_else(|| anyhow!("unknown target kind {kind}"))?;
    Ok(RateableRef::new(kind, uuid_col(row, "target_id")?))
}

pub(crate) fn user(row: &SqliteRow) -> anyhow::Result<User> {
    let role: Option<String> = row.try_get("role")?;
    Ok(User {
        id: uuid_col(row, "id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        avatar: row.try_get("avatar")?,
        is_deleted: row.try_get("is_deleted")?,
        role: role.as_deref().and_then(Role::parse),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn section(row: &SqliteRow) -> anyhow::Result<Section> {
    Ok(Section {
        id: uuid_col(row, "id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn topic(row: &SqliteRow) -> anyhow::Result<Topic> {
    Ok(Topic {
        id: uuid_col(row, "id")?,
        section_id: uuid_col(row, "section_id")?,
        author_id: uuid_col(row, "author_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        is_pinned: row.try_get("is_pinned")?,
        is_open: row.try_get("is_open")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Participants are stored separately and filled in by the caller.
pub(crate) fn message(row: &SqliteRow) -> anyhow::Result<PrivateMessage> {
    Ok(PrivateMessage {
        id: uuid_col(row, "id")?,
        author_id: uuid_col(row, "author_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        participants: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn post(row: &SqliteRow) -> anyhow::Result<Post> {
    let id = uuid_col(row, "id")?;
    let discussion = match (opt_uuid_col(row, "topic_id")?, opt_uuid_col(row, "message_id")?) {
        (Some(topic_id), None) => DiscussionRef::Topic(topic_id),
        (None, Some(message_id)) => DiscussionRef::Message(message_id),
        _ => bail!("post {id} must belong to exactly one discussion"),
    };
    Ok(Post {
        id,
        discussion,
        author_id: uuid_col(row, "author_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn rating(row: &SqliteRow) -> anyhow::Result<Rating> {
    let value: i64 = row.try_get("value")?;
    Ok(Rating {
        id: uuid_col(row, "id")?,
        owner_id: uuid_col(row, "owner_id")?,
        target: target(row)?,
        value: RatingValue::try_from(value).map_err(|v| anyhow!("invalid rating value {v}"))?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn complaint(row: &SqliteRow) -> anyhow::Result<Complaint> {
    Ok(Complaint {
        id: uuid_col(row, "id")?,
        author_id: uuid_col(row, "author_id")?,
        target: target(row)?,
        reason: row.try_get("reason")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn ban(row: &SqliteRow) -> anyhow::Result<Ban> {
    Ok(Ban {
        id: uuid_col(row, "id")?,
        user_id: uuid_col(row, "user_id")?,
        reason: row.try_get("reason")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}
