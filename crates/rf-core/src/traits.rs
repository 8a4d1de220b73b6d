//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Ban, Complaint, DiscussionRef, Post, PrivateMessage, RateableRef, Rating, Section, Topic, User,
};

/// Data persistence contract for every forum entity.
///
/// Deletes return `false` when the row did not exist. Deleting a section or
/// topic removes everything beneath it in a single transaction.
#[async_trait]
pub trait ForumRepo: Send + Sync {
    // User Operations
    async fn create_user(&self, user: &User) -> anyhow::Result<()>;
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn list_users(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;
    async fn update_user(&self, user: &User) -> anyhow::Result<()>;

    // Section Operations
    async fn create_section(&self, section: &Section) -> anyhow::Result<()>;
    async fn get_section(&self, id: Uuid) -> anyhow::Result<Option<Section>>;
    async fn get_section_by_name(&self, name: &str) -> anyhow::Result<Option<Section>>;
    async fn list_sections(&self) -> anyhow::Result<Vec<Section>>;
    async fn update_section(&self, section: &Section) -> anyhow::Result<()>;
    async fn delete_section(&self, id: Uuid) -> anyhow::Result<bool>;

    // Topic Operations
    async fn create_topic(&self, topic: &Topic) -> anyhow::Result<()>;
    async fn get_topic(&self, id: Uuid) -> anyhow::Result<Option<Topic>>;
    /// Pinned topics first, then most recently updated.
    async fn list_topics(&self, section_id: Uuid) -> anyhow::Result<Vec<Topic>>;
    async fn update_topic(&self, topic: &Topic) -> anyhow::Result<()>;
    async fn delete_topic(&self, id: Uuid) -> anyhow::Result<bool>;

    // Post Operations
    async fn create_post(&self, post: &Post) -> anyhow::Result<()>;
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    /// Oldest first.
    async fn list_posts(&self, discussion: DiscussionRef) -> anyhow::Result<Vec<Post>>;
    async fn update_post(&self, post: &Post) -> anyhow::Result<()>;
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool>;

    // Private Message Operations
    async fn create_message(&self, message: &PrivateMessage) -> anyhow::Result<()>;
    async fn get_message(&self, id: Uuid) -> anyhow::Result<Option<PrivateMessage>>;
    async fn list_messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<PrivateMessage>>;
    /// Updates title and content; participants are fixed at creation.
    async fn update_message(&self, message: &PrivateMessage) -> anyhow::Result<()>;

    // Rateable Operations
    /// Finds which kind of content an id belongs to.
    async fn resolve_rateable(&self, id: Uuid) -> anyhow::Result<Option<RateableRef>>;
    /// Sum of rating values per target id. Targets without ratings are absent.
    async fn scores(&self, target_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, i64>>;

    // Rating Operations
    /// Inserts unless the owner already rated the target. Returns whether a row was written.
    async fn create_rating(&self, rating: &Rating) -> anyhow::Result<bool>;
    async fn get_rating(&self, id: Uuid) -> anyhow::Result<Option<Rating>>;
    async fn find_rating(&self, owner_id: Uuid, target_id: Uuid) -> anyhow::Result<Option<Rating>>;
    async fn list_ratings_by(&self, owner_id: Uuid, target_ids: &[Uuid]) -> anyhow::Result<Vec<Rating>>;
    async fn update_rating(&self, rating: &Rating) -> anyhow::Result<()>;
    async fn delete_rating(&self, id: Uuid) -> anyhow::Result<bool>;

    // Complaint Operations
    async fn create_complaint(&self, complaint: &Complaint) -> anyhow::Result<()>;
    async fn get_complaint(&self, id: Uuid) -> anyhow::Result<Option<Complaint>>;
    async fn list_complaints(&self) -> anyhow::Result<Vec<Complaint>>;
    async fn delete_complaint(&self, id: Uuid) -> anyhow::Result<bool>;

    // Ban Operations
    async fn create_ban(&self, ban: &Ban) -> anyhow::Result<()>;
    async fn get_ban(&self, id: Uuid) -> anyhow::Result<Option<Ban>>;
    async fn get_ban_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<Ban>>;
    async fn list_bans(&self) -> anyhow::Result<Vec<Ban>>;
    async fn update_ban(&self, ban: &Ban) -> anyhow::Result<()>;
    async fn delete_ban(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Media storage contract for handling avatar uploads.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes under a generated name and returns the media_id for the User model.
    async fn save_avatar(&self, data: Vec<u8>, extension: &str) -> anyhow::Result<String>;
    /// Returns the public URL of the stored file.
    async fn get_url(&self, media_id: &str) -> String;
    /// Deletes a stored file. Missing files are not an error.
    async fn remove(&self, media_id: &str) -> anyhow::Result<()>;
}

/// Identity contract: passwords, sessions and CSRF tokens.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Produces a PHC-formatted hash for storage.
    async fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies a password against a stored hash. Malformed hashes never match.
    async fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Starts a session and returns its opaque id.
    fn create_session(&self, user_id: Uuid) -> String;

    /// Returns the user behind a live session.
    fn resolve_session(&self, session_id: &str) -> Option<Uuid>;

    fn end_session(&self, session_id: &str);

    /// Ends every session of a user (deletion, ban).
    fn end_user_sessions(&self, user_id: Uuid);

    /// Fresh random seed for the CSRF cookie.
    fn issue_csrf_seed(&self) -> String;

    /// The form token bound to a CSRF seed.
    fn csrf_token(&self, seed: &str) -> String;

    fn verify_csrf(&self, seed: &str, token: &str) -> bool;
}
