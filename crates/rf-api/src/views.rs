//! Builds the flat view models `rf-ui` renders from domain types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rf_core::traits::ForumRepo;
use rf_core::{Actor, Rating, Section, User};
use rf_ui::{display_time, render_content, EntryView, SectionView};
use uuid::Uuid;

pub(crate) fn section_view(section: &Section) -> SectionView {
    SectionView {
        id: section.id.to_string(),
        name: section.name.clone(),
        description: section.description.clone(),
    }
}

/// Authors referenced on a page, loaded in one query.
pub(crate) struct Authors(HashMap<Uuid, User>);

impl Authors {
    pub async fn load(repo: &dyn ForumRepo, ids: &[Uuid]) -> anyhow::Result<Self> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        let users = repo.list_users(&ids).await?;
        Ok(Self(users.into_iter().map(|u| (u.id, u)).collect()))
    }

    pub fn name(&self, id: Uuid) -> String {
        match self.0.get(&id) {
            Some(user) if user.is_deleted => format!("{} (deleted)", user.username),
            Some(user) => user.username.clone(),
            None => "unknown".into(),
        }
    }
}

/// Scores of the rateables on a page plus the viewer's own ratings of them.
pub(crate) struct PageRatings {
    scores: HashMap<Uuid, i64>,
    mine: HashMap<Uuid, Rating>,
}

impl PageRatings {
    pub async fn load(repo: &dyn ForumRepo, viewer: Option<Uuid>, ids: &[Uuid]) -> anyhow::Result<Self> {
        let scores = repo.scores(ids).await?;
        let mine = match viewer {
            Some(owner) => repo
                .list_ratings_by(owner, ids)
                .await?
                .into_iter()
                .map(|r| (r.target.id, r))
                .collect(),
            None => HashMap::new(),
        };
        Ok(Self { scores, mine })
    }
}

/// The common fields of a topic body, message body or post.
pub(crate) struct Entry<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub author_id: Uuid,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn entry_view(
    entry: Entry<'_>,
    authors: &Authors,
    ratings: &PageRatings,
    viewer: Option<&Actor>,
) -> EntryView {
    let mine = ratings.mine.get(&entry.id);
    EntryView {
        id: entry.id.to_string(),
        title: entry.title.to_string(),
        author_id: entry.author_id.to_string(),
        author_name: authors.name(entry.author_id),
        content_html: render_content(entry.content),
        content_raw: entry.content.to_string(),
        created: display_time(&entry.created_at),
        score: ratings.scores.get(&entry.id).copied().unwrap_or(0),
        can_edit: viewer.is_some_and(|a| a.id == entry.author_id || a.is_moderator()),
        has_my_rating: mine.is_some(),
        my_rating_id: mine.map(|r| r.id.to_string()).unwrap_or_default(),
        my_rating_value: mine.map(|r| r.value.as_i64()).unwrap_or(0),
    }
}
