//! Projects, items and the commentable subject view.
//!
//! A project is the permission context: whether it is public, still a draft,
//! and whether its active phase accepts comments. Items are user-generated
//! entities living inside a project; a [`Subject`] bundles a saved item with
//! its project so permission rules can be evaluated without further lookups.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  content_type::ContentType,
  timestamps::{TimeStamped, Timestamps, UserGenerated},
};

// ─── Project ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id:              Option<i64>,
  pub organisation_id: i64,
  pub name:            String,
  /// Anyone may take part, not only invited participants.
  pub is_public:       bool,
  /// Unpublished; only moderators and initiators may act.
  pub is_draft:        bool,
  /// The currently active phase allows commenting.
  pub comments_open:   bool,
  #[serde(flatten)]
  pub timestamps:      Timestamps,
}

impl Project {
  /// A new, unsaved draft project.
  pub fn new(organisation_id: i64, name: impl Into<String>) -> Self {
    Self {
      id: None,
      organisation_id,
      name: name.into(),
      is_public: true,
      is_draft: true,
      comments_open: false,
      timestamps: Timestamps::default(),
    }
  }
}

impl TimeStamped for Project {
  fn pk(&self) -> Option<i64> { self.id }
  fn timestamps(&self) -> &Timestamps { &self.timestamps }
  fn timestamps_mut(&mut self) -> &mut Timestamps { &mut self.timestamps }
}

// ─── Item ────────────────────────────────────────────────────────────────────

/// A user-generated entity inside a project (an idea, a proposal, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub id:           Option<i64>,
  pub content_type: ContentType,
  pub project_id:   i64,
  pub name:         String,
  pub creator:      i64,
  #[serde(flatten)]
  pub timestamps:   Timestamps,
}

impl Item {
  pub fn new(
    content_type: ContentType,
    project_id: i64,
    creator: i64,
    name: impl Into<String>,
  ) -> Self {
    Self {
      id: None,
      content_type,
      project_id,
      name: name.into(),
      creator,
      timestamps: Timestamps::default(),
    }
  }
}

impl TimeStamped for Item {
  fn pk(&self) -> Option<i64> { self.id }
  fn timestamps(&self) -> &Timestamps { &self.timestamps }
  fn timestamps_mut(&mut self) -> &mut Timestamps { &mut self.timestamps }
}

impl UserGenerated for Item {
  fn creator(&self) -> i64 { self.creator }
}

// ─── Commentable ─────────────────────────────────────────────────────────────

/// Something comments can be attached to.
pub trait Commentable {
  fn content_type(&self) -> &ContentType;

  fn object_id(&self) -> i64;

  /// The project whose settings and memberships govern commenting.
  fn project(&self) -> &Project;
}

/// A saved item together with its project.
#[derive(Debug, Clone)]
pub struct Subject {
  object_id:   i64,
  pub item:    Item,
  pub project: Project,
}

impl Subject {
  /// Fails if the item has never been saved.
  pub fn new(item: Item, project: Project) -> Result<Self> {
    let object_id = item.id.ok_or(Error::Unsaved("item"))?;
    Ok(Self { object_id, item, project })
  }
}

impl Commentable for Subject {
  fn content_type(&self) -> &ContentType { &self.item.content_type }

  fn object_id(&self) -> i64 { self.object_id }

  fn project(&self) -> &Project { &self.project }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ct() -> ContentType {
    ContentType {
      id:        2,
      app_label: "agora".into(),
      model:     "item".into(),
    }
  }

  #[test]
  fn subject_requires_saved_item() {
    let item = Item::new(ct(), 1, 1, "unsaved");
    let err = Subject::new(item, Project::new(1, "p")).unwrap_err();
    assert!(matches!(err, Error::Unsaved("item")));
  }

  #[test]
  fn subject_exposes_item_identity() {
    let mut item = Item::new(ct(), 1, 1, "saved");
    item.id = Some(42);
    let subject = Subject::new(item, Project::new(1, "p")).unwrap();
    assert_eq!(subject.object_id(), 42);
    assert_eq!(subject.content_type().id, 2);
  }

  #[test]
  fn new_project_is_draft_and_closed() {
    let p = Project::new(9, "Park redesign");
    assert!(p.is_draft);
    assert!(!p.comments_open);
    assert!(p.modified().is_none());
  }
}
