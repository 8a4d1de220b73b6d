//! Idempotent schema, applied statement by statement on start-up.
//!
//! Ratings and complaints address their target by `(target_kind, target_id)`
//! without a foreign key, so cascades for them are done explicitly by the repo.

pub(crate) const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id              BLOB PRIMARY KEY,
        username        TEXT NOT NULL UNIQUE,
        email           TEXT NOT NULL UNIQUE,
        password_hash   TEXT NOT NULL,
        avatar          TEXT,
        is_deleted      INTEGER NOT NULL DEFAULT 0,
        role            TEXT,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sections (
        id              BLOB PRIMARY KEY,
        name            TEXT NOT NULL UNIQUE,
        description     TEXT NOT NULL DEFAULT '',
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS topics (
        id              BLOB PRIMARY KEY,
        section_id      BLOB NOT NULL REFERENCES sections(id),
        author_id       BLOB NOT NULL REFERENCES users(id),
        title           TEXT NOT NULL,
        content         TEXT NOT NULL,
        is_pinned       INTEGER NOT NULL DEFAULT 0,
        is_open         INTEGER NOT NULL DEFAULT 1,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_topics_section ON topics(section_id)",
    "CREATE TABLE IF NOT EXISTS private_messages (
        id              BLOB PRIMARY KEY,
        author_id       BLOB NOT NULL REFERENCES users(id),
        title           TEXT NOT NULL,
        content         TEXT NOT NULL,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS message_participants (
        message_id      BLOB NOT NULL REFERENCES private_messages(id),
        user_id         BLOB NOT NULL REFERENCES users(id),
        PRIMARY KEY (message_id, user_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_participants_user ON message_participants(user_id)",
    "CREATE TABLE IF NOT EXISTS posts (
        id              BLOB PRIMARY KEY,
        topic_id        BLOB REFERENCES topics(id),
        message_id      BLOB REFERENCES private_messages(id),
        author_id       BLOB NOT NULL REFERENCES users(id),
        content         TEXT NOT NULL,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL,
        CHECK ((topic_id IS NULL) <> (message_id IS NULL))
    )",
    "CREATE INDEX IF NOT EXISTS idx_posts_topic ON posts(topic_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_posts_message ON posts(message_id, created_at)",
    "CREATE TABLE IF NOT EXISTS ratings (
        id              BLOB PRIMARY KEY,
        owner_id        BLOB NOT NULL REFERENCES users(id),
        target_kind     TEXT NOT NULL,
        target_id       BLOB NOT NULL,
        value           INTEGER NOT NULL CHECK (value IN (1, -1)),
        created_at      TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_ratings_target ON ratings(target_id, owner_id)",
    "CREATE TABLE IF NOT EXISTS complaints (
        id              BLOB PRIMARY KEY,
        author_id       BLOB NOT NULL REFERENCES users(id),
        target_kind     TEXT NOT NULL,
        target_id       BLOB NOT NULL,
        reason          TEXT NOT NULL,
        created_at      TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_complaints_target ON complaints(target_id)",
    "CREATE TABLE IF NOT EXISTS bans (
        id              BLOB PRIMARY KEY,
        user_id         BLOB NOT NULL UNIQUE REFERENCES users(id),
        reason          TEXT NOT NULL,
        expires_at      TEXT NOT NULL,
        created_at      TEXT NOT NULL
    )",
];
