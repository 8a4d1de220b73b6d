//! # rf-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`.
//! Handles password hashing, in-memory sessions and HMAC-signed CSRF tokens.

use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use rf_core::traits::AuthProvider;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

struct Session {
    user_id: Uuid,
    last_seen: DateTime<Utc>,
}

pub struct SimpleAuthProvider {
    /// Keyed with the server secret; cloned per token
    csrf_mac: HmacSha256,
    /// Idle sessions older than this are dropped on lookup
    session_ttl: Duration,
    sessions: DashMap<String, Session>,
    hasher: Argon2<'static>,
}

impl SimpleAuthProvider {
    /// Accepts the server secret (e.g., from an environment variable).
    pub fn new(secret: &[u8], session_ttl: Duration) -> anyhow::Result<Self> {
        let csrf_mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| anyhow!("invalid CSRF secret: {e}"))?;
        Ok(Self {
            csrf_mac,
            session_ttl,
            sessions: DashMap::new(),
            hasher: Argon2::default(),
        })
    }

    /// Overrides the Argon2id cost parameters used for new hashes.
    pub fn with_cost(mut self, m_cost_kib: u32, t_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost_kib, t_cost, 1, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
        self.hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(self)
    }

    fn random_token() -> String {
        let mut buf = [0u8; 32];
        OsRng.fill_bytes(&mut buf);
        URL_SAFE_NO_PAD.encode(buf)
    }

    fn mac_for(&self, seed: &str) -> HmacSha256 {
        let mut mac = self.csrf_mac.clone();
        mac.update(seed.as_bytes());
        mac
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    async fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        // Argon2 is deliberately slow; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow!("password hashing failed: {e}"))
        })
        .await?
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed_hash = match PasswordHash::new(&hash) {
                Ok(p) => p,
                Err(_) => return false,
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        })
        .await
        .unwrap_or(false)
    }

    /// Also sweeps idle sessions whose cookie never came back.
    fn create_session(&self, user_id: Uuid) -> String {
        let now = Utc::now();
        self.sessions.retain(|_, session| now - session.last_seen <= self.session_ttl);

        let session_id = Self::random_token();
        self.sessions.insert(
            session_id.clone(),
            Session {
                user_id,
                last_seen: now,
            },
        );
        session_id
    }

    fn resolve_session(&self, session_id: &str) -> Option<Uuid> {
        let now = Utc::now();
        let user_id = {
            let mut session = self.sessions.get_mut(session_id)?;
            if now - session.last_seen > self.session_ttl {
                None
            } else {
                session.last_seen = now;
                Some(session.user_id)
            }
        };
        if user_id.is_none() {
            log::debug!("dropping idle session");
            self.sessions.remove(session_id);
        }
        user_id
    }

    fn end_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    fn end_user_sessions(&self, user_id: Uuid) {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.user_id != user_id);
        log::debug!("ended {} sessions of user {user_id}", before.saturating_sub(self.sessions.len()));
    }

    fn issue_csrf_seed(&self) -> String {
        Self::random_token()
    }

    fn csrf_token(&self, seed: &str) -> String {
        hex::encode(self.mac_for(seed).finalize().into_bytes())
    }

    fn verify_csrf(&self, seed: &str, token: &str) -> bool {
        match hex::decode(token) {
            Ok(raw) => self.mac_for(seed).verify_slice(&raw).is_ok(),
            Err(_) => false,
        }
    }
}
