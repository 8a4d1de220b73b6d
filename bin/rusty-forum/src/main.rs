//! # Rusty-Forum Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod config;

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use rf_api::handlers::{pages, AppState};
use rf_api::middleware::{csrf_guard, standard_middleware};
use rf_core::traits::ForumRepo;
use rf_core::Role;
use secrecy::ExposeSecret;

// Feature-gated imports: each port is compiled in from its plugin crate
#[cfg(feature = "db-sqlite")]
use rf_db_sqlite::SqliteForumRepo;

#[cfg(feature = "storage-local")]
use rf_storage_local::LocalMediaStore;

#[cfg(feature = "auth-simple")]
use rf_auth_simple::SimpleAuthProvider;

use crate::config::Settings;

/// Development fallback when `FORUM_SESSION_SECRET` is not set.
const DEV_SECRET: &str = "rusty-forum-development-secret";

/// Gives the configured user the Moderator role so a fresh install can be administered.
async fn promote_bootstrap_moderator(repo: &dyn ForumRepo, username: &str) -> anyhow::Result<()> {
    match repo.get_user_by_username(username).await? {
        Some(mut user) if !user.is_moderator() => {
            user.role = Some(Role::Moderator);
            user.updated_at = chrono::Utc::now();
            repo.update_user(&user).await?;
            log::info!("promoted {username} to Moderator");
        }
        Some(_) => {}
        None => log::warn!("bootstrap moderator {username} is not registered yet"),
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("invalid configuration")?;
    let secret = match &settings.session_secret {
        Some(secret) => secret.expose_secret().as_bytes().to_vec(),
        None if cfg!(debug_assertions) => {
            log::warn!("FORUM_SESSION_SECRET is not set; using the development secret");
            DEV_SECRET.as_bytes().to_vec()
        }
        None => anyhow::bail!("FORUM_SESSION_SECRET must be set"),
    };

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteForumRepo::new(&settings.database_url)
        .await
        .context("failed to open the database")?;

    // 2. Initialize Storage Implementation
    #[cfg(feature = "storage-local")]
    let store = LocalMediaStore::new(settings.content_root.clone().into(), "/uploads".into());

    // 3. Initialize Auth Implementation
    #[cfg(feature = "auth-simple")]
    let auth = SimpleAuthProvider::new(&secret, chrono::Duration::days(settings.session_ttl_days))?;

    if let Some(username) = &settings.bootstrap_moderator {
        promote_bootstrap_moderator(&repo, username).await?;
    }

    // 4. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        store: Box::new(store),
        auth: Box::new(auth),
    });

    std::fs::create_dir_all(&settings.content_root)
        .with_context(|| format!("cannot create {}", settings.content_root))?;
    let content_root = settings.content_root.clone();

    log::info!("Rusty-Forum starting on http://{}", settings.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(csrf_guard))
            .wrap(standard_middleware())
            .service(actix_files::Files::new("/uploads", &content_root))
            .configure(rf_api::configure_routes)
            .default_service(web::to(pages::not_found))
    })
    .bind(&settings.bind_addr)?
    .run()
    .await?;

    Ok(())
}
