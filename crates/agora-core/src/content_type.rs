//! Content types — the stable identity of an entity's kind.

use serde::{Deserialize, Serialize};

/// A registered entity kind, e.g. `ideas.proposal`.
///
/// `id` is what the comment widget receives as `subjectType`; the
/// `(app_label, model)` pair is unique per store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentType {
  pub id:        i64,
  pub app_label: String,
  pub model:     String,
}

impl ContentType {
  /// The permission key for `action` on objects of this kind, in the form
  /// `"{app_label}.{action}_{model}"`.
  pub fn permission(&self, action: &str) -> String {
    format!("{}.{action}_{}", self.app_label, self.model.to_lowercase())
  }

  pub fn comment_permission(&self) -> String { self.permission("comment") }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn proposal() -> ContentType {
    ContentType {
      id:        7,
      app_label: "ideas".into(),
      model:     "proposal".into(),
    }
  }

  #[test]
  fn comment_permission_combines_app_label_and_model() {
    assert_eq!(proposal().comment_permission(), "ideas.comment_proposal");
  }

  #[test]
  fn permission_lowercases_model() {
    let ct = ContentType { model: "MapIdea".into(), ..proposal() };
    assert_eq!(ct.permission("rate"), "ideas.rate_mapidea");
  }
}
