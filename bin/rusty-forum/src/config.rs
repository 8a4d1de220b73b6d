//! Runtime settings, read from `FORUM_*` environment variables (and `.env`).

use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Address the HTTP server binds to (e.g., "127.0.0.1:8080")
    pub bind_addr: String,
    /// sqlx connection string
    pub database_url: String,
    /// Directory avatars are written to and served from under `/uploads`
    pub content_root: String,
    /// Keys the CSRF tokens. Required in release builds.
    pub session_secret: Option<SecretString>,
    pub session_ttl_days: i64,
    /// User promoted to Moderator at start-up, if it exists
    pub bootstrap_moderator: Option<String>,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .set_default("bind_addr", "127.0.0.1:8080")?
            .set_default("database_url", "sqlite:rusty_forum.db")?
            .set_default("content_root", "./data/uploads")?
            .set_default("session_ttl_days", 30)?
            .add_source(config::Environment::with_prefix("FORUM"))
            .build()?
            .try_deserialize::<Settings>()?;

        if settings.session_ttl_days <= 0 {
            anyhow::bail!("FORUM_SESSION_TTL_DAYS must be positive");
        }
        Ok(settings)
    }
}
