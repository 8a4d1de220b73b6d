//! # Authorization rules
//!
//! Ownership checks with a moderator override. Handlers call these after
//! loading the resource, so a missing resource is always a 404 first.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{PrivateMessage, Role, User};

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Option<Role>,
}

impl Actor {
    pub fn is_moderator(&self) -> bool {
        self.role == Some(Role::Moderator)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// Owners may act on their own resources; moderators on anything.
pub fn authorize_owner(actor: &Actor, owner_id: Uuid) -> Result<()> {
    if actor.id == owner_id || actor.is_moderator() {
        Ok(())
    } else {
        Err(AppError::Forbidden("you do not own this resource".into()))
    }
}

pub fn require_moderator(actor: &Actor) -> Result<()> {
    if actor.is_moderator() {
        Ok(())
    } else {
        Err(AppError::Forbidden("moderator role required".into()))
    }
}

/// Private messages are reported as missing to outsiders.
pub fn authorize_participant(actor: &Actor, message: &PrivateMessage) -> Result<()> {
    if message.is_participant(actor.id) || actor.is_moderator() {
        Ok(())
    } else {
        Err(AppError::not_found("PrivateMessage", message.id))
    }
}

/// Only moderators may pin or close topics.
pub fn authorize_topic_flags(actor: &Actor, pinned_changed: bool, open_changed: bool) -> Result<()> {
    if (pinned_changed || open_changed) && !actor.is_moderator() {
        return Err(AppError::Forbidden(
            "only moderators may pin or close topics".into(),
        ));
    }
    Ok(())
}

/// Moderators may ban anyone but themselves.
pub fn authorize_ban(actor: &Actor, target_user_id: Uuid) -> Result<()> {
    require_moderator(actor)?;
    if actor.id == target_user_id {
        return Err(AppError::invalid("you cannot ban yourself"));
    }
    Ok(())
}
