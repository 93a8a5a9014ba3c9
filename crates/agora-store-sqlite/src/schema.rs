//! SQL schema for the Agora SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT    NOT NULL UNIQUE,
    password_hash TEXT,               -- argon2 PHC string; NULL disables login
    is_superuser  INTEGER NOT NULL DEFAULT 0,
    date_joined   TEXT    NOT NULL    -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS content_types (
    content_type_id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_label       TEXT NOT NULL,
    model           TEXT NOT NULL,
    UNIQUE (app_label, model)
);

CREATE TABLE IF NOT EXISTS projects (
    project_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    organisation_id INTEGER NOT NULL,
    name            TEXT    NOT NULL,
    is_public       INTEGER NOT NULL,
    is_draft        INTEGER NOT NULL,
    comments_open   INTEGER NOT NULL,
    created         TEXT    NOT NULL,
    modified        TEXT
);

CREATE TABLE IF NOT EXISTS project_participants (
    project_id INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    user_id    INTEGER NOT NULL REFERENCES users(user_id)       ON DELETE CASCADE,
    PRIMARY KEY (project_id, user_id)
);

CREATE TABLE IF NOT EXISTS project_moderators (
    project_id INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    user_id    INTEGER NOT NULL REFERENCES users(user_id)       ON DELETE CASCADE,
    PRIMARY KEY (project_id, user_id)
);

CREATE TABLE IF NOT EXISTS organisation_initiators (
    organisation_id INTEGER NOT NULL,
    user_id         INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    PRIMARY KEY (organisation_id, user_id)
);

-- User-generated content: removed together with its creator.
CREATE TABLE IF NOT EXISTS items (
    item_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content_type_id INTEGER NOT NULL REFERENCES content_types(content_type_id),
    project_id      INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    name            TEXT    NOT NULL,
    creator_id      INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created         TEXT    NOT NULL,
    modified        TEXT
);

CREATE INDEX IF NOT EXISTS items_creator_idx ON items(creator_id);
CREATE INDEX IF NOT EXISTS items_project_idx ON items(project_id);

PRAGMA user_version = 1;
";
