//! [`SqliteStore`] — the SQLite implementation of [`PlatformStore`].

use std::{collections::BTreeSet, path::Path};

use agora_core::{
  content_type::ContentType,
  identity::{Memberships, User},
  project::{Item, Project, Subject},
  store::PlatformStore,
  timestamps::{SaveOptions, TimeStamped},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{ITEM_COLUMNS, RawItem, RawProject, RawUser, encode_dt},
  schema::SCHEMA,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

const USER_COLUMNS: &str =
  "user_id, username, password_hash, is_superuser, date_joined";

fn raw_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:       row.get(0)?,
    username:      row.get(1)?,
    password_hash: row.get(2)?,
    is_superuser:  row.get(3)?,
    date_joined:   row.get(4)?,
  })
}

fn id_set(
  conn: &rusqlite::Connection,
  sql: &str,
  user_id: i64,
) -> rusqlite::Result<BTreeSet<i64>> {
  let mut stmt = conn.prepare(sql)?;
  let ids = stmt
    .query_map(rusqlite::params![user_id], |r| r.get(0))?
    .collect::<rusqlite::Result<BTreeSet<i64>>>()?;
  Ok(ids)
}

fn memberships(
  conn: &rusqlite::Connection,
  user_id: i64,
) -> rusqlite::Result<Memberships> {
  Ok(Memberships {
    participant_of: id_set(
      conn,
      "SELECT project_id FROM project_participants WHERE user_id = ?1",
      user_id,
    )?,
    moderator_of:   id_set(
      conn,
      "SELECT project_id FROM project_moderators WHERE user_id = ?1",
      user_id,
    )?,
    initiator_of:   id_set(
      conn,
      "SELECT organisation_id FROM organisation_initiators WHERE user_id = ?1",
      user_id,
    )?,
  })
}

/// Fetch one user row matching `filter` (a `WHERE` clause using `?1`) along
/// with its memberships.
fn find_user(
  conn: &rusqlite::Connection,
  filter: &str,
  param: impl rusqlite::ToSql,
) -> rusqlite::Result<Option<(RawUser, Memberships)>> {
  let raw = conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE {filter}"),
      rusqlite::params![param],
      raw_user,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let m = memberships(conn, raw.user_id)?;
      Ok(Some((raw, m)))
    }
    None => Ok(None),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Agora store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a membership row; repeated grants are no-ops.
  async fn grant(&self, sql: &'static str, scope_id: i64, user_id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params![scope_id, user_id])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PlatformStore impl ──────────────────────────────────────────────────────

impl PlatformStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(
    &self,
    username:      String,
    password_hash: Option<String>,
    is_superuser:  bool,
  ) -> Result<User> {
    let date_joined = Utc::now();
    let at_str      = encode_dt(date_joined);
    let name        = username.clone();
    let hash        = password_hash.clone();

    let user_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, password_hash, is_superuser, date_joined)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name, hash, is_superuser, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(user_id, %username, "created user");

    Ok(User {
      id: user_id,
      username,
      is_superuser,
      password_hash,
      date_joined,
      memberships: Memberships::default(),
    })
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let found = self
      .conn
      .call(move |conn| Ok(find_user(conn, "user_id = ?1", id)?))
      .await?;

    found.map(|(raw, m)| raw.into_user(m)).transpose()
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    let found = self
      .conn
      .call(move |conn| Ok(find_user(conn, "username = ?1", name)?))
      .await?;

    found.map(|(raw, m)| raw.into_user(m)).transpose()
  }

  async fn delete_user(&self, id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![id])?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::UserNotFound(id));
    }
    tracing::debug!(user_id = id, "deleted user and owned content");
    Ok(())
  }

  // ── Memberships ───────────────────────────────────────────────────────────

  async fn add_participant(&self, project_id: i64, user_id: i64) -> Result<()> {
    self
      .grant(
        "INSERT OR IGNORE INTO project_participants (project_id, user_id) VALUES (?1, ?2)",
        project_id,
        user_id,
      )
      .await
  }

  async fn add_moderator(&self, project_id: i64, user_id: i64) -> Result<()> {
    self
      .grant(
        "INSERT OR IGNORE INTO project_moderators (project_id, user_id) VALUES (?1, ?2)",
        project_id,
        user_id,
      )
      .await
  }

  async fn add_initiator(&self, organisation_id: i64, user_id: i64) -> Result<()> {
    self
      .grant(
        "INSERT OR IGNORE INTO organisation_initiators (organisation_id, user_id) VALUES (?1, ?2)",
        organisation_id,
        user_id,
      )
      .await
  }

  // ── Content types ─────────────────────────────────────────────────────────

  async fn content_type_for(&self, app_label: &str, model: &str) -> Result<ContentType> {
    let app_label = app_label.to_owned();
    let model     = model.to_lowercase();

    let ct = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO content_types (app_label, model) VALUES (?1, ?2)",
          rusqlite::params![app_label, model],
        )?;
        let id: i64 = conn.query_row(
          "SELECT content_type_id FROM content_types WHERE app_label = ?1 AND model = ?2",
          rusqlite::params![app_label, model],
          |r| r.get(0),
        )?;
        Ok(ContentType { id, app_label, model })
      })
      .await?;

    Ok(ct)
  }

  async fn get_content_type(&self, id: i64) -> Result<Option<ContentType>> {
    let ct = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT content_type_id, app_label, model FROM content_types
             WHERE content_type_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(ContentType {
                id:        row.get(0)?,
                app_label: row.get(1)?,
                model:     row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    Ok(ct)
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn save_project(&self, project: &mut Project, opts: SaveOptions) -> Result<()> {
    project.pre_save(opts);

    let organisation_id = project.organisation_id;
    let name            = project.name.clone();
    let is_public       = project.is_public;
    let is_draft        = project.is_draft;
    let comments_open   = project.comments_open;
    let created_str     = encode_dt(project.timestamps.created);
    let modified_str    = project.timestamps.modified.map(encode_dt);

    match project.id {
      None => {
        let id: i64 = self
          .conn
          .call(move |conn| {
            conn.execute(
              "INSERT INTO projects (
                 organisation_id, name, is_public, is_draft, comments_open,
                 created, modified
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
              rusqlite::params![
                organisation_id,
                name,
                is_public,
                is_draft,
                comments_open,
                created_str,
                modified_str,
              ],
            )?;
            Ok(conn.last_insert_rowid())
          })
          .await?;
        project.id = Some(id);
      }
      Some(id) => {
        let updated = self
          .conn
          .call(move |conn| {
            Ok(conn.execute(
              "UPDATE projects SET
                 organisation_id = ?1, name = ?2, is_public = ?3, is_draft = ?4,
                 comments_open = ?5, modified = ?6
               WHERE project_id = ?7",
              rusqlite::params![
                organisation_id,
                name,
                is_public,
                is_draft,
                comments_open,
                modified_str,
                id,
              ],
            )?)
          })
          .await?;
        if updated == 0 {
          return Err(Error::ProjectNotFound(id));
        }
      }
    }

    Ok(())
  }

  async fn get_project(&self, id: i64) -> Result<Option<Project>> {
    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT project_id, organisation_id, name, is_public, is_draft,
                    comments_open, created, modified
             FROM projects WHERE project_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawProject {
                project_id:      row.get(0)?,
                organisation_id: row.get(1)?,
                name:            row.get(2)?,
                is_public:       row.get(3)?,
                is_draft:        row.get(4)?,
                comments_open:   row.get(5)?,
                created:         row.get(6)?,
                modified:        row.get(7)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProject::into_project).transpose()
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn save_item(&self, item: &mut Item, opts: SaveOptions) -> Result<()> {
    item.pre_save(opts);

    let content_type_id = item.content_type.id;
    let project_id      = item.project_id;
    let name            = item.name.clone();
    let creator_id      = item.creator;
    let created_str     = encode_dt(item.timestamps.created);
    let modified_str    = item.timestamps.modified.map(encode_dt);

    match item.id {
      None => {
        let id: i64 = self
          .conn
          .call(move |conn| {
            conn.execute(
              "INSERT INTO items (
                 content_type_id, project_id, name, creator_id, created, modified
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
              rusqlite::params![
                content_type_id,
                project_id,
                name,
                creator_id,
                created_str,
                modified_str,
              ],
            )?;
            Ok(conn.last_insert_rowid())
          })
          .await?;
        item.id = Some(id);
      }
      Some(id) => {
        let updated = self
          .conn
          .call(move |conn| {
            Ok(conn.execute(
              "UPDATE items SET
                 content_type_id = ?1, project_id = ?2, name = ?3,
                 creator_id = ?4, modified = ?5
               WHERE item_id = ?6",
              rusqlite::params![
                content_type_id,
                project_id,
                name,
                creator_id,
                modified_str,
                id,
              ],
            )?)
          })
          .await?;
        if updated == 0 {
          return Err(Error::ItemNotFound(id));
        }
      }
    }

    Ok(())
  }

  async fn get_item(&self, id: i64) -> Result<Option<Item>> {
    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {ITEM_COLUMNS}
               FROM items i JOIN content_types c ON c.content_type_id = i.content_type_id
               WHERE i.item_id = ?1"
            ),
            rusqlite::params![id],
            RawItem::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn items_by_creator(&self, user_id: i64) -> Result<Vec<Item>> {
    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS}
           FROM items i JOIN content_types c ON c.content_type_id = i.content_type_id
           WHERE i.creator_id = ?1
           ORDER BY i.item_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn load_subject(
    &self,
    content_type_id: i64,
    object_id:       i64,
  ) -> Result<Option<Subject>> {
    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {ITEM_COLUMNS}
               FROM items i JOIN content_types c ON c.content_type_id = i.content_type_id
               WHERE i.item_id = ?1 AND i.content_type_id = ?2"
            ),
            rusqlite::params![object_id, content_type_id],
            RawItem::from_row,
          )
          .optional()?)
      })
      .await?;

    let Some(item) = raw.map(RawItem::into_item).transpose()? else {
      return Ok(None);
    };
    let Some(project) = self.get_project(item.project_id).await? else {
      return Ok(None);
    };

    Ok(Some(Subject::new(item, project)?))
  }
}
