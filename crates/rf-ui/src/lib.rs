//! # rf-ui
//!
//! Askama templates and the flat view models they render. Handlers in
//! `rf-api` build the views; templates never see domain types directly.

use askama::Template;
use chrono::{DateTime, Utc};
use rf_core::models::User;

/// Shared by every page: title, navigation and the CSRF form token.
pub struct Layout {
    pub title: String,
    pub viewer: Option<Viewer>,
    pub csrf: String,
}

impl Layout {
    pub fn new(title: impl Into<String>, viewer: Option<Viewer>, csrf: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            viewer,
            csrf: csrf.into(),
        }
    }

    pub fn logged_in(&self) -> bool {
        self.viewer.is_some()
    }

    pub fn is_moderator(&self) -> bool {
        self.viewer.as_ref().is_some_and(|v| v.is_moderator)
    }

    pub fn username(&self) -> &str {
        self.viewer.as_ref().map_or("", |v| v.username.as_str())
    }

    pub fn user_id(&self) -> &str {
        self.viewer.as_ref().map_or("", |v| v.id.as_str())
    }
}

pub struct Viewer {
    pub id: String,
    pub username: String,
    pub is_moderator: bool,
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            is_moderator: user.is_moderator(),
        }
    }
}

pub struct SectionView {
    pub id: String,
    pub name: String,
    pub description: String,
}

pub struct TopicSummary {
    pub id: String,
    pub title: String,
    pub author_name: String,
    pub is_pinned: bool,
    pub is_open: bool,
    pub updated: String,
}

/// A rateable item as shown on a page (topic body, post, or message body).
pub struct EntryView {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub author_name: String,
    pub content_html: String,
    /// Raw text for edit forms
    pub content_raw: String,
    pub created: String,
    pub score: i64,
    pub can_edit: bool,
    pub has_my_rating: bool,
    pub my_rating_id: String,
    pub my_rating_value: i64,
}

impl EntryView {
    /// The opposite of the viewer's current vote.
    pub fn flipped_rating(&self) -> i64 {
        -self.my_rating_value
    }
}

pub struct MessageSummary {
    pub id: String,
    pub title: String,
    pub participants: String,
    pub updated: String,
}

pub struct ProfileView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub has_avatar: bool,
    pub is_moderator: bool,
    pub is_deleted: bool,
    pub ban_note: String,
    pub joined: String,
    pub can_edit: bool,
}

pub struct ComplaintView {
    pub id: String,
    pub author_name: String,
    pub target_kind: String,
    pub target_link: String,
    pub reason: String,
    pub created: String,
}

pub struct BanView {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub reason: String,
    pub expires: String,
    pub expires_input: String,
    pub is_active: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionView>,
}

#[derive(Template)]
#[template(path = "section.html")]
pub struct SectionTemplate {
    pub layout: Layout,
    pub section: SectionView,
    pub topics: Vec<TopicSummary>,
}

#[derive(Template)]
#[template(path = "topic.html")]
pub struct TopicTemplate {
    pub layout: Layout,
    pub section: SectionView,
    pub topic: EntryView,
    pub is_pinned: bool,
    pub is_open: bool,
    pub posts: Vec<EntryView>,
}

impl TopicTemplate {
    pub fn topic_entry(&self) -> &[EntryView] {
        std::slice::from_ref(&self.topic)
    }
}

#[derive(Template)]
#[template(path = "user.html")]
pub struct UserTemplate {
    pub layout: Layout,
    pub profile: ProfileView,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub banned: bool,
    pub error: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "messages.html")]
pub struct MessagesTemplate {
    pub layout: Layout,
    pub messages: Vec<MessageSummary>,
}

#[derive(Template)]
#[template(path = "message.html")]
pub struct MessageTemplate {
    pub layout: Layout,
    pub message: EntryView,
    pub participants: String,
    pub posts: Vec<EntryView>,
}

impl MessageTemplate {
    pub fn message_entry(&self) -> &[EntryView] {
        std::slice::from_ref(&self.message)
    }
}

#[derive(Template)]
#[template(path = "complaints.html")]
pub struct ComplaintsTemplate {
    pub layout: Layout,
    pub complaints: Vec<ComplaintView>,
}

#[derive(Template)]
#[template(path = "bans.html")]
pub struct BansTemplate {
    pub layout: Layout,
    pub bans: Vec<BanView>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub layout: Layout,
    pub status: u16,
    pub messages: Vec<String>,
}

pub fn display_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Value for an `<input type="datetime-local">`.
pub fn input_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M").to_string()
}

/// Escapes user text and keeps its line structure.
/// Lines starting with '>' are rendered as quotes.
pub fn render_content(raw: &str) -> String {
    // Escape HTML to prevent XSS
    let escaped = html_escape::encode_safe(raw).to_string();

    escaped
        .lines()
        .map(|line| {
            if line.starts_with("&gt;") {
                format!("<span class=\"quote\">{}</span>", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("<br />")
}
