//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Forum.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! Content that can be rated or reported (topics, posts, private messages) is
//! addressed through [`RateableRef`], and the container a post lives in through
//! [`DiscussionRef`]. Both are plain tagged ids resolved by the repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Elevated privileges a user may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Moderator => "Moderator",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "Moderator" => Some(Role::Moderator),
            _ => None,
        }
    }
}

/// A registered account. Deleted accounts keep their row and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Always stored lowercase
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Media id handled by MediaStore
    pub avatar: Option<String>,
    pub is_deleted: bool,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_moderator(&self) -> bool {
        self.role == Some(Role::Moderator)
    }
}

/// A top-level forum category (e.g., "General", "Announcements").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A public discussion inside a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub section_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    /// Closed topics reject new posts
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    pub fn rateable(&self) -> RateableRef {
        RateableRef::new(RateableKind::Topic, self.id)
    }
}

/// A discussion visible only to its participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateMessage {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    /// Includes the author
    pub participants: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrivateMessage {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }
}

/// The discussion a post belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DiscussionRef {
    Topic(Uuid),
    Message(Uuid),
}

impl DiscussionRef {
    pub fn id(&self) -> Uuid {
        match self {
            DiscussionRef::Topic(id) | DiscussionRef::Message(id) => *id,
        }
    }
}

/// A reply inside a topic or private message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub discussion: DiscussionRef,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn rateable(&self) -> RateableRef {
        RateableRef::new(RateableKind::Post, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateableKind {
    Topic,
    Post,
    Message,
}

impl RateableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateableKind::Topic => "topic",
            RateableKind::Post => "post",
            RateableKind::Message => "message",
        }
    }

    pub fn parse(raw: &str) -> Option<RateableKind> {
        match raw {
            "topic" => Some(RateableKind::Topic),
            "post" => Some(RateableKind::Post),
            "message" => Some(RateableKind::Message),
            _ => None,
        }
    }
}

/// Anything that can receive ratings and complaints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateableRef {
    pub kind: RateableKind,
    pub id: Uuid,
}

impl RateableRef {
    pub fn new(kind: RateableKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// Up or down vote. Stored as 1 / -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingValue {
    Up,
    Down,
}

impl RatingValue {
    pub fn as_i64(&self) -> i64 {
        match self {
            RatingValue::Up => 1,
            RatingValue::Down => -1,
        }
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = i64;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(RatingValue::Up),
            -1 => Ok(RatingValue::Down),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub target: RateableRef,
    pub value: RatingValue,
    pub created_at: DateTime<Utc>,
}

/// A user report about a piece of content, queued for moderators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub author_id: Uuid,
    pub target: RateableRef,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a moderation action against a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ban {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Ban {
    /// A ban is in force until its expiry instant (exclusive).
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
