//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Booleans use SQLite's
//! integer affinity via rusqlite's native `bool` mapping.

use agora_core::{
  content_type::ContentType,
  identity::{Memberships, User},
  project::{Item, Project},
  timestamps::Timestamps,
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_timestamps(created: &str, modified: Option<&str>) -> Result<Timestamps> {
  Ok(Timestamps {
    created:  decode_dt(created)?,
    modified: modified.map(decode_dt).transpose()?,
  })
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Raw column values from the `users` table. Memberships are loaded by
/// separate queries.
pub struct RawUser {
  pub user_id:       i64,
  pub username:      String,
  pub password_hash: Option<String>,
  pub is_superuser:  bool,
  pub date_joined:   String,
}

impl RawUser {
  pub fn into_user(self, memberships: Memberships) -> Result<User> {
    Ok(User {
      id: self.user_id,
      username: self.username,
      is_superuser: self.is_superuser,
      password_hash: self.password_hash,
      date_joined: decode_dt(&self.date_joined)?,
      memberships,
    })
  }
}

pub struct RawProject {
  pub project_id:      i64,
  pub organisation_id: i64,
  pub name:            String,
  pub is_public:       bool,
  pub is_draft:        bool,
  pub comments_open:   bool,
  pub created:         String,
  pub modified:        Option<String>,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      id:              Some(self.project_id),
      organisation_id: self.organisation_id,
      name:            self.name,
      is_public:       self.is_public,
      is_draft:        self.is_draft,
      comments_open:   self.comments_open,
      timestamps:      decode_timestamps(&self.created, self.modified.as_deref())?,
    })
  }
}

/// An `items` row joined with its `content_types` row.
pub struct RawItem {
  pub item_id:         i64,
  pub content_type_id: i64,
  pub app_label:       String,
  pub model:           String,
  pub project_id:      i64,
  pub name:            String,
  pub creator_id:      i64,
  pub created:         String,
  pub modified:        Option<String>,
}

impl RawItem {
  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      id:           Some(self.item_id),
      content_type: ContentType {
        id:        self.content_type_id,
        app_label: self.app_label,
        model:     self.model,
      },
      project_id:   self.project_id,
      name:         self.name,
      creator:      self.creator_id,
      timestamps:   decode_timestamps(&self.created, self.modified.as_deref())?,
    })
  }
}

/// Column list matching [`RawItem::from_row`].
pub const ITEM_COLUMNS: &str = "i.item_id, i.content_type_id, c.app_label, c.model,
  i.project_id, i.name, i.creator_id, i.created, i.modified";

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawItem {
      item_id:         row.get(0)?,
      content_type_id: row.get(1)?,
      app_label:       row.get(2)?,
      model:           row.get(3)?,
      project_id:      row.get(4)?,
      name:            row.get(5)?,
      creator_id:      row.get(6)?,
      created:         row.get(7)?,
      modified:        row.get(8)?,
    })
  }
}
