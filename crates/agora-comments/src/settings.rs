//! Read-only comment settings injected into the attribute resolver.

use agora_core::{Error, Result};
use serde::Deserialize;

use crate::attributes::CategoryChoices;

/// Process-wide comment configuration.
///
/// `comment_categories` is a list of `[key, label]` pairs, e.g.
///
/// ```toml
/// comment_categories = [["question", "Question"], ["idea", "Idea"]]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentSettings {
  #[serde(default)]
  pub comment_categories: Option<Vec<(String, String)>>,
}

impl CommentSettings {
  pub fn with_categories<K, L>(pairs: impl IntoIterator<Item = (K, L)>) -> Self
  where
    K: Into<String>,
    L: Into<String>,
  {
    Self {
      comment_categories: Some(
        pairs.into_iter().map(|(k, l)| (k.into(), l.into())).collect(),
      ),
    }
  }

  /// The configured categories as a key → label mapping.
  ///
  /// Absent or empty configuration is a deployment mistake, not a user
  /// error, and is reported as [`Error::ImproperlyConfigured`].
  pub fn category_choices(&self) -> Result<CategoryChoices> {
    match self.comment_categories.as_deref() {
      Some(pairs) if !pairs.is_empty() => {
        let mut choices = CategoryChoices::default();
        for (key, label) in pairs {
          choices.insert(key.clone(), label.clone());
        }
        Ok(choices)
      }
      _ => Err(Error::ImproperlyConfigured(
        "set comment_categories in settings".into(),
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_categories_is_improperly_configured() {
    let err = CommentSettings::default().category_choices().unwrap_err();
    assert!(matches!(err, Error::ImproperlyConfigured(_)));
  }

  #[test]
  fn empty_categories_is_improperly_configured() {
    let settings = CommentSettings { comment_categories: Some(vec![]) };
    assert!(matches!(
      settings.category_choices(),
      Err(Error::ImproperlyConfigured(_))
    ));
  }

  #[test]
  fn later_duplicate_replaces_label_in_place() {
    let settings = CommentSettings::with_categories([
      ("question", "Question"),
      ("idea", "Idea"),
      ("question", "Query"),
    ]);
    let choices = settings.category_choices().unwrap();
    let pairs: Vec<_> = choices.iter().collect();
    assert_eq!(pairs, vec![("question", "Query"), ("idea", "Idea")]);
  }
}
