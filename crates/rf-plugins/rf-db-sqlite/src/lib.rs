//! # rf-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `rf-core` domain models.

mod rows;
mod schema;

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use rf_core::models::{
    Ban, Complaint, DiscussionRef, Post, PrivateMessage, RateableKind, RateableRef, Rating,
    Section, Topic, User,
};
use rf_core::traits::ForumRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use rows::{unique_conflict, uuid_col, uuid_to_blob};

pub struct SqliteForumRepo {
    pool: SqlitePool,
}

impl SqliteForumRepo {
    /// Connects and applies the schema. `sqlite::memory:` gives a private
    /// database held by a single pooled connection.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options)
                .await?
        };

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        log::info!("database schema ready ({} statements)", schema::STATEMENTS.len());
        Ok(())
    }

    async fn participants(&self, message_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        sqlx::query("SELECT user_id FROM message_participants WHERE message_id = ? ORDER BY rowid")
            .bind(uuid_to_blob(message_id))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| uuid_col(row, "user_id"))
            .collect()
    }

    async fn with_participants(&self, mut message: PrivateMessage) -> anyhow::Result<PrivateMessage> {
        message.participants = self.participants(message.id).await?;
        Ok(message)
    }
}

// Ratings and complaints pointing at posts or topics beneath a section / topic.
// Both take the same id bound twice.
const PURGE_SECTION_TARGETS: &str = "target_id IN (SELECT id FROM topics WHERE section_id = ?)
     OR target_id IN (SELECT p.id FROM posts p JOIN topics t ON p.topic_id = t.id WHERE t.section_id = ?)";
const PURGE_TOPIC_TARGETS: &str =
    "target_id = ? OR target_id IN (SELECT id FROM posts WHERE topic_id = ?)";

#[async_trait]
impl ForumRepo for SqliteForumRepo {
    async fn create_user(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO users (id, username, email, password_hash, avatar, is_deleted, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(user.id))
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.avatar)
            .bind(user.is_deleted)
            .bind(user.role.map(|r| r.as_str()))
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(unique_conflict)?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::user(&row))
            .transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::user(&row))
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::user(&row))
            .transpose()
    }

    async fn list_users(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(uuid_to_blob(*id));
        }
        separated.push_unseparated(") ORDER BY username");
        qb.build()
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::user)
            .collect()
    }

    async fn update_user(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET email = ?, password_hash = ?, avatar = ?, is_deleted = ?, role = ?, updated_at = ? WHERE id = ?")
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.avatar)
            .bind(user.is_deleted)
            .bind(user.role.map(|r| r.as_str()))
            .bind(user.updated_at)
            .bind(uuid_to_blob(user.id))
            .execute(&self.pool)
            .await
            .map_err(unique_conflict)?;
        Ok(())
    }

    async fn create_section(&self, section: &Section) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO sections (id, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(section.id))
            .bind(&section.name)
            .bind(&section.description)
            .bind(section.created_at)
            .bind(section.updated_at)
            .execute(&self.pool)
            .await
            .map_err(unique_conflict)?;
        Ok(())
    }

    async fn get_section(&self, id: Uuid) -> anyhow::Result<Option<Section>> {
        sqlx::query("SELECT * FROM sections WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::section(&row))
            .transpose()
    }

    async fn get_section_by_name(&self, name: &str) -> anyhow::Result<Option<Section>> {
        sqlx::query("SELECT * FROM sections WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::section(&row))
            .transpose()
    }

    async fn list_sections(&self) -> anyhow::Result<Vec<Section>> {
        sqlx::query("SELECT * FROM sections ORDER BY name")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::section)
            .collect()
    }

    async fn update_section(&self, section: &Section) -> anyhow::Result<()> {
        sqlx::query("UPDATE sections SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&section.name)
            .bind(&section.description)
            .bind(section.updated_at)
            .bind(uuid_to_blob(section.id))
            .execute(&self.pool)
            .await
            .map_err(unique_conflict)?;
        Ok(())
    }

    /// Removes the section, its topics, their posts and every rating or
    /// complaint aimed at them.
    ///
    /// # Developer Note
    /// Using a Transaction (tx) ensures a failure half-way never leaves
    /// orphaned posts behind a deleted topic.
    async fn delete_section(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let id = uuid_to_blob(id);

        for table in ["ratings", "complaints"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE {PURGE_SECTION_TARGETS}"))
                .bind(&id)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
        }
        let posts = sqlx::query("DELETE FROM posts WHERE topic_id IN (SELECT id FROM topics WHERE section_id = ?)")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let topics = sqlx::query("DELETE FROM topics WHERE section_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM sections WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        if deleted > 0 {
            log::info!("section deleted with {topics} topics and {posts} posts");
        }
        Ok(deleted > 0)
    }

    async fn create_topic(&self, topic: &Topic) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO topics (id, section_id, author_id, title, content, is_pinned, is_open, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(topic.id))
            .bind(uuid_to_blob(topic.section_id))
            .bind(uuid_to_blob(topic.author_id))
            .bind(&topic.title)
            .bind(&topic.content)
            .bind(topic.is_pinned)
            .bind(topic.is_open)
            .bind(topic.created_at)
            .bind(topic.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_topic(&self, id: Uuid) -> anyhow::Result<Option<Topic>> {
        sqlx::query("SELECT * FROM topics WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::topic(&row))
            .transpose()
    }

    async fn list_topics(&self, section_id: Uuid) -> anyhow::Result<Vec<Topic>> {
        sqlx::query("SELECT * FROM topics WHERE section_id = ? ORDER BY is_pinned DESC, updated_at DESC, id DESC")
            .bind(uuid_to_blob(section_id))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::topic)
            .collect()
    }

    async fn update_topic(&self, topic: &Topic) -> anyhow::Result<()> {
        sqlx::query("UPDATE topics SET title = ?, content = ?, is_pinned = ?, is_open = ?, updated_at = ? WHERE id = ?")
            .bind(&topic.title)
            .bind(&topic.content)
            .bind(topic.is_pinned)
            .bind(topic.is_open)
            .bind(topic.updated_at)
            .bind(uuid_to_blob(topic.id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_topic(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let id = uuid_to_blob(id);

        for table in ["ratings", "complaints"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE {PURGE_TOPIC_TARGETS}"))
                .bind(&id)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM posts WHERE topic_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn create_post(&self, post: &Post) -> anyhow::Result<()> {
        let (topic_id, message_id) = match post.discussion {
            DiscussionRef::Topic(id) => (Some(uuid_to_blob(id)), None),
            DiscussionRef::Message(id) => (None, Some(uuid_to_blob(id))),
        };
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO posts (id, topic_id, message_id, author_id, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(post.id))
            .bind(&topic_id)
            .bind(&message_id)
            .bind(uuid_to_blob(post.author_id))
            .bind(&post.content)
            .bind(post.created_at)
            .bind(post.updated_at)
            .execute(&mut *tx)
            .await?;

        // Replies bump their discussion
        let bump = match post.discussion {
            DiscussionRef::Topic(_) => "UPDATE topics SET updated_at = ? WHERE id = ?",
            DiscussionRef::Message(_) => "UPDATE private_messages SET updated_at = ? WHERE id = ?",
        };
        sqlx::query(bump)
            .bind(post.created_at)
            .bind(uuid_to_blob(post.discussion.id()))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::post(&row))
            .transpose()
    }

    async fn list_posts(&self, discussion: DiscussionRef) -> anyhow::Result<Vec<Post>> {
        let sql = match discussion {
            DiscussionRef::Topic(_) => "SELECT * FROM posts WHERE topic_id = ? ORDER BY created_at ASC, id ASC",
            DiscussionRef::Message(_) => "SELECT * FROM posts WHERE message_id = ? ORDER BY created_at ASC, id ASC",
        };
        sqlx::query(sql)
            .bind(uuid_to_blob(discussion.id()))
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::post)
            .collect()
    }

    async fn update_post(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query("UPDATE posts SET content = ?, updated_at = ? WHERE id = ?")
            .bind(&post.content)
            .bind(post.updated_at)
            .bind(uuid_to_blob(post.id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let id = uuid_to_blob(id);

        for sql in [
            "DELETE FROM ratings WHERE target_id = ?",
            "DELETE FROM complaints WHERE target_id = ?",
        ] {
            sqlx::query(sql).bind(&id).execute(&mut *tx).await?;
        }
        let deleted = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn create_message(&self, message: &PrivateMessage) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO private_messages (id, author_id, title, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(message.id))
            .bind(uuid_to_blob(message.author_id))
            .bind(&message.title)
            .bind(&message.content)
            .bind(message.created_at)
            .bind(message.updated_at)
            .execute(&mut *tx)
            .await?;

        for user_id in &message.participants {
            sqlx::query("INSERT OR IGNORE INTO message_participants (message_id, user_id) VALUES (?, ?)")
                .bind(uuid_to_blob(message.id))
                .bind(uuid_to_blob(*user_id))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_message(&self, id: Uuid) -> anyhow::Result<Option<PrivateMessage>> {
        let row = sqlx::query("SELECT * FROM private_messages WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.with_participants(rows::message(&row)?).await?)),
            None => Ok(None),
        }
    }

    async fn list_messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<PrivateMessage>> {
        let found = sqlx::query(
            "SELECT m.* FROM private_messages m
             JOIN message_participants mp ON mp.message_id = m.id
             WHERE mp.user_id = ?
             ORDER BY m.updated_at DESC, m.id DESC",
        )
        .bind(uuid_to_blob(user_id))
        .fetch_all(&self.pool)
        .await?;

        let mut messages = Vec::with_capacity(found.len());
        for row in &found {
            messages.push(self.with_participants(rows::message(row)?).await?);
        }
        Ok(messages)
    }

    async fn update_message(&self, message: &PrivateMessage) -> anyhow::Result<()> {
        sqlx::query("UPDATE private_messages SET title = ?, content = ?, updated_at = ? WHERE id = ?")
            .bind(&message.title)
            .bind(&message.content)
            .bind(message.updated_at)
            .bind(uuid_to_blob(message.id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn resolve_rateable(&self, id: Uuid) -> anyhow::Result<Option<RateableRef>> {
        let blob = uuid_to_blob(id);
        let row = sqlx::query(
            "SELECT 'topic' AS kind FROM topics WHERE id = ?
             UNION ALL SELECT 'post' FROM posts WHERE id = ?
             UNION ALL SELECT 'message' FROM private_messages WHERE id = ?
             LIMIT 1",
        )
        .bind(&blob)
        .bind(&blob)
        .bind(&blob)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|row| row.try_get::<String, _>("kind"))
            .transpose()?
            .and_then(|kind| RateableKind::parse(&kind))
            .map(|kind| RateableRef::new(kind, id)))
    }

    async fn scores(&self, target_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, i64>> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT target_id, SUM(value) AS score FROM ratings WHERE target_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in target_ids {
            separated.push_bind(uuid_to_blob(*id));
        }
        separated.push_unseparated(") GROUP BY target_id");

        let mut scores = HashMap::new();
        for row in qb.build().fetch_all(&self.pool).await? {
            scores.insert(uuid_col(&row, "target_id")?, row.try_get::<i64, _>("score")?);
        }
        Ok(scores)
    }

    async fn create_rating(&self, rating: &Rating) -> anyhow::Result<bool> {
        // Conditional insert: one rating per (owner, target)
        let inserted = sqlx::query(
            "INSERT INTO ratings (id, owner_id, target_kind, target_id, value, created_at)
             SELECT ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (SELECT 1 FROM ratings WHERE owner_id = ? AND target_id = ?)",
        )
        .bind(uuid_to_blob(rating.id))
        .bind(uuid_to_blob(rating.owner_id))
        .bind(rating.target.kind.as_str())
        .bind(uuid_to_blob(rating.target.id))
        .bind(rating.value.as_i64())
        .bind(rating.created_at)
        .bind(uuid_to_blob(rating.owner_id))
        .bind(uuid_to_blob(rating.target.id))
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(inserted == 1)
    }

    async fn get_rating(&self, id: Uuid) -> anyhow::Result<Option<Rating>> {
        sqlx::query("SELECT * FROM ratings WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::rating(&row))
            .transpose()
    }

    async fn find_rating(&self, owner_id: Uuid, target_id: Uuid) -> anyhow::Result<Option<Rating>> {
        sqlx::query("SELECT * FROM ratings WHERE owner_id = ? AND target_id = ?")
            .bind(uuid_to_blob(owner_id))
            .bind(uuid_to_blob(target_id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::rating(&row))
            .transpose()
    }

    async fn list_ratings_by(&self, owner_id: Uuid, target_ids: &[Uuid]) -> anyhow::Result<Vec<Rating>> {
        if target_ids.is_empty() {
            return Ok(vec![]);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM ratings WHERE owner_id = ");
        qb.push_bind(uuid_to_blob(owner_id));
        qb.push(" AND target_id IN (");
        let mut separated = qb.separated(", ");
        for id in target_ids {
            separated.push_bind(uuid_to_blob(*id));
        }
        separated.push_unseparated(")");
        qb.build()
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::rating)
            .collect()
    }

    async fn update_rating(&self, rating: &Rating) -> anyhow::Result<()> {
        sqlx::query("UPDATE ratings SET value = ? WHERE id = ?")
            .bind(rating.value.as_i64())
            .bind(uuid_to_blob(rating.id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_rating(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM ratings WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn create_complaint(&self, complaint: &Complaint) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO complaints (id, author_id, target_kind, target_id, reason, created_at) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(complaint.id))
            .bind(uuid_to_blob(complaint.author_id))
            .bind(complaint.target.kind.as_str())
            .bind(uuid_to_blob(complaint.target.id))
            .bind(&complaint.reason)
            .bind(complaint.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_complaint(&self, id: Uuid) -> anyhow::Result<Option<Complaint>> {
        sqlx::query("SELECT * FROM complaints WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::complaint(&row))
            .transpose()
    }

    async fn list_complaints(&self) -> anyhow::Result<Vec<Complaint>> {
        sqlx::query("SELECT * FROM complaints ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::complaint)
            .collect()
    }

    async fn delete_complaint(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM complaints WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn create_ban(&self, ban: &Ban) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO bans (id, user_id, reason, expires_at, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(ban.id))
            .bind(uuid_to_blob(ban.user_id))
            .bind(&ban.reason)
            .bind(ban.expires_at)
            .bind(ban.created_at)
            .execute(&self.pool)
            .await
            .map_err(unique_conflict)?;
        Ok(())
    }

    async fn get_ban(&self, id: Uuid) -> anyhow::Result<Option<Ban>> {
        sqlx::query("SELECT * FROM bans WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::ban(&row))
            .transpose()
    }

    async fn get_ban_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<Ban>> {
        sqlx::query("SELECT * FROM bans WHERE user_id = ?")
            .bind(uuid_to_blob(user_id))
            .fetch_optional(&self.pool)
            .await?
            .map(|row| rows::ban(&row))
            .transpose()
    }

    async fn list_bans(&self) -> anyhow::Result<Vec<Ban>> {
        sqlx::query("SELECT * FROM bans ORDER BY expires_at DESC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(rows::ban)
            .collect()
    }

    async fn update_ban(&self, ban: &Ban) -> anyhow::Result<()> {
        sqlx::query("UPDATE bans SET reason = ?, expires_at = ? WHERE id = ?")
            .bind(&ban.reason)
            .bind(ban.expires_at)
            .bind(uuid_to_blob(ban.id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_ban(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM bans WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
