//! The attribute bag handed to the client-side comment widget.
//!
//! [`resolve_attributes`] decides, for one viewer and one subject, whether the
//! widget is read-only, which categories it offers, which comment to scroll
//! to, and whether the viewer counts as inside the subject's context.

use std::{collections::HashMap, fmt};

use agora_core::{
  Result,
  identity::{Agent, NormalUser, Viewer},
  project::Commentable,
};
use serde::{
  Deserialize, Deserializer, Serialize, Serializer,
  de::{MapAccess, Visitor},
};

use crate::settings::CommentSettings;

// ─── Request context ─────────────────────────────────────────────────────────

/// The parts of an incoming request the widget cares about.
#[derive(Debug, Clone)]
pub struct RequestContext {
  pub viewer: Viewer,
  pub query:  HashMap<String, String>,
}

impl RequestContext {
  pub fn new(viewer: Viewer) -> Self {
    Self {
      viewer,
      query: HashMap::new(),
    }
  }

  pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.query.insert(key.into(), value.into());
    self
  }

  /// The `comment` query parameter, verbatim; empty when absent.
  pub fn anchored_comment_id(&self) -> &str {
    self.query.get("comment").map(String::as_str).unwrap_or("")
  }
}

// ─── Category choices ────────────────────────────────────────────────────────

/// Category key → display label, in configuration order.
///
/// Serialises as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChoices(Vec<(String, String)>);

impl CategoryChoices {
  /// Insert or relabel `key`. A relabelled key keeps its position.
  pub fn insert(&mut self, key: String, label: String) {
    match self.0.iter_mut().find(|(k, _)| *k == key) {
      Some((_, existing)) => *existing = label,
      None => self.0.push((key, label)),
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, label)| label.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, l)| (k.as_str(), l.as_str()))
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }
}

impl Serialize for CategoryChoices {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(self.iter())
  }
}

impl<'de> Deserialize<'de> for CategoryChoices {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    struct ChoicesVisitor;

    impl<'de> Visitor<'de> for ChoicesVisitor {
      type Value = CategoryChoices;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of category keys to labels")
      }

      fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> std::result::Result<Self::Value, M::Error> {
        let mut choices = CategoryChoices::default();
        while let Some((key, label)) = map.next_entry::<String, String>()? {
          choices.insert(key, label);
        }
        Ok(choices)
      }
    }

    deserializer.deserialize_map(ChoicesVisitor)
  }
}

// ─── Attribute bag ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAttributes {
  /// Content type id of the subject.
  pub subject_type:             i64,
  pub subject_id:               i64,
  /// Nobody without a special role could comment here: neither the viewer
  /// nor an ordinary member holds the comment permission.
  pub is_read_only:             bool,
  pub comment_category_choices: CategoryChoices,
  pub anchored_comment_id:      String,
  pub with_categories:          bool,
  /// The viewer, or an ordinary member in their place, is inside the
  /// subject's context.
  pub is_context_member:        bool,
}

/// Compute the widget attributes for `viewer` looking at `subject`.
///
/// Fails only when `with_categories` is requested and `settings` carries no
/// categories. `settings` is not consulted otherwise.
pub fn resolve_attributes(
  viewer: &dyn Agent,
  subject: &dyn Commentable,
  anchored_comment_id: &str,
  with_categories: bool,
  settings: &CommentSettings,
) -> Result<CommentAttributes> {
  let content_type = subject.content_type();
  let permission = content_type.comment_permission();

  let has_comment_permission = viewer.has_perm(&permission, subject);
  let would_have_comment_permission = NormalUser.has_perm(&permission, subject);

  let comment_category_choices = if with_categories {
    settings.category_choices()?
  } else {
    CategoryChoices::default()
  };

  let is_context_member =
    viewer.is_context_member(subject) || NormalUser.is_context_member(subject);

  Ok(CommentAttributes {
    subject_type: content_type.id,
    subject_id: subject.object_id(),
    is_read_only: !has_comment_permission && !would_have_comment_permission,
    comment_category_choices,
    anchored_comment_id: anchored_comment_id.to_owned(),
    with_categories,
    is_context_member,
  })
}

#[cfg(test)]
mod tests {
  use agora_core::{
    Error,
    content_type::ContentType,
    identity::{Memberships, User},
    project::{Item, Project, Subject},
  };
  use chrono::Utc;

  use super::*;

  fn proposal_42(configure: impl FnOnce(&mut Project)) -> Subject {
    let ct = ContentType {
      id:        7,
      app_label: "ideas".into(),
      model:     "proposal".into(),
    };
    let mut project = Project::new(3, "Riverside");
    project.id = Some(1);
    project.is_public = false;
    project.is_draft = false;
    project.comments_open = true;
    configure(&mut project);
    let mut item = Item::new(ct, 1, 99, "More benches");
    item.id = Some(42);
    Subject::new(item, project).unwrap()
  }

  fn participant() -> Viewer {
    let mut memberships = Memberships::default();
    memberships.participant_of.insert(1);
    Viewer::User(User {
      id: 5,
      username: "ada".into(),
      is_superuser: false,
      password_hash: None,
      date_joined: Utc::now(),
      memberships,
    })
  }

  fn resolve(viewer: &Viewer, subject: &Subject, with_categories: bool) -> Result<CommentAttributes> {
    resolve_attributes(viewer, subject, "", with_categories, &CommentSettings::default())
  }

  #[test]
  fn no_permission_anywhere_is_read_only() {
    let attrs = resolve(&Viewer::Anonymous, &proposal_42(|_| {}), false).unwrap();
    assert!(attrs.is_read_only);
    assert!(!attrs.is_context_member);
  }

  #[test]
  fn direct_permission_is_never_read_only() {
    let attrs = resolve(&participant(), &proposal_42(|_| {}), false).unwrap();
    assert!(!attrs.is_read_only);
    assert!(attrs.is_context_member);
  }

  #[test]
  fn normal_member_permission_makes_anonymous_view_writable() {
    let subject = proposal_42(|p| p.is_public = true);
    let attrs = resolve(&Viewer::Anonymous, &subject, false).unwrap();
    assert!(!attrs.is_read_only);
    assert!(attrs.is_context_member);
  }

  #[test]
  fn draft_project_is_read_only_even_when_public() {
    let subject = proposal_42(|p| {
      p.is_public = true;
      p.is_draft = true;
    });
    let attrs = resolve(&participant(), &subject, false).unwrap();
    assert!(attrs.is_read_only);
    assert!(attrs.is_context_member);
  }

  #[test]
  fn categories_without_configuration_fail_every_time() {
    let subject = proposal_42(|_| {});
    for _ in 0..3 {
      let err = resolve(&Viewer::Anonymous, &subject, true).unwrap_err();
      assert!(matches!(err, Error::ImproperlyConfigured(_)));
    }
  }

  #[test]
  fn categories_off_ignores_configuration() {
    let settings = CommentSettings::with_categories([("question", "Question")]);
    let attrs = resolve_attributes(
      &Viewer::Anonymous,
      &proposal_42(|_| {}),
      "",
      false,
      &settings,
    )
    .unwrap();
    assert!(attrs.comment_category_choices.is_empty());
    assert!(!attrs.with_categories);
  }

  #[test]
  fn anchor_and_categories_are_carried_through() {
    let settings =
      CommentSettings::with_categories([("question", "Question"), ("idea", "Idea")]);
    let ctx = RequestContext::new(Viewer::Anonymous).with_query("comment", "17");
    let attrs = resolve_attributes(
      &ctx.viewer,
      &proposal_42(|_| {}),
      ctx.anchored_comment_id(),
      true,
      &settings,
    )
    .unwrap();

    assert_eq!(attrs.anchored_comment_id, "17");
    assert!(attrs.with_categories);
    assert_eq!(attrs.comment_category_choices.len(), 2);
    assert_eq!(attrs.comment_category_choices.get("idea"), Some("Idea"));
  }

  #[test]
  fn serialises_the_seven_documented_fields() {
    let attrs = resolve(&Viewer::Anonymous, &proposal_42(|_| {}), false).unwrap();
    let json = serde_json::to_string(&attrs).unwrap();
    assert_eq!(
      json,
      r#"{"subjectType":7,"subjectId":42,"isReadOnly":true,"commentCategoryChoices":{},"anchoredCommentId":"","withCategories":false,"isContextMember":false}"#
    );

    let parsed: CommentAttributes = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, attrs);
  }

  #[test]
  fn category_choices_keep_configuration_order_in_json() {
    let mut choices = CategoryChoices::default();
    choices.insert("question".into(), "Question".into());
    choices.insert("idea".into(), "Idea".into());
    let json = serde_json::to_string(&choices).unwrap();
    assert_eq!(json, r#"{"question":"Question","idea":"Idea"}"#);

    let back: CategoryChoices = serde_json::from_str(&json).unwrap();
    assert_eq!(back, choices);
  }

  #[test]
  fn missing_anchor_is_empty() {
    let ctx = RequestContext::new(Viewer::Anonymous).with_query("page", "2");
    assert_eq!(ctx.anchored_comment_id(), "");
  }
}
